use crate::{error::AppError, state::AppState};
use actix_web::{web, HttpResponse};
use serde_json::json;

/// `GET /api/v1/config` — the configuration the service is running with.
pub async fn get_config(state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
    let config = serde_json::to_value(state.config.as_ref())
        .map_err(|e| AppError::Internal(e.to_string()))?;

    Ok(HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "config": config
    })))
}

#[cfg(test)]
mod tests {
    use crate::state::tests::state_with_root;
    use actix_web::{test, web, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_get_config() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state_with_root(std::path::Path::new("."))))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/v1/config").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["config"]["server"]["port"], 8080);
        assert_eq!(body["config"]["object_store"]["backend"], "filesystem");
        assert_eq!(
            body["config"]["operator"]["error_metadata_key"],
            "TranslateError"
        );
    }
}
