use crate::state::AppState;
use actix_web::{web, HttpResponse};
use serde_json::json;

pub async fn health_check(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let config = &state.config;

    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": state.get_uptime_seconds(),
        "service": {
            "name": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
            "host": config.server.host,
            "port": config.server.port
        },
        "metrics": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "operator_invocations": metrics.operator.invocations,
            "operator_failures": metrics.operator.failed
        },
        "memory": get_memory_info(),
        "collaborators": {
            "object_store": config.object_store.backend,
            "dataplane": config.dataplane.endpoint
        }
    }))
}

pub async fn detailed_metrics(state: web::Data<AppState>) -> HttpResponse {
    let metrics = state.get_metrics_snapshot();
    let uptime_seconds = state.get_uptime_seconds();

    let endpoint_stats: Vec<_> = metrics
        .endpoint_metrics
        .iter()
        .map(|(endpoint, metric)| {
            json!({
                "endpoint": endpoint,
                "request_count": metric.request_count,
                "error_count": metric.error_count,
                "error_rate": metric.error_rate(),
                "average_duration_ms": metric.average_duration_ms(),
                "total_duration_ms": metric.total_duration_ms
            })
        })
        .collect();

    let operator = &metrics.operator;

    HttpResponse::Ok().json(json!({
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "uptime_seconds": uptime_seconds,
        "overall": {
            "total_requests": metrics.request_count,
            "total_errors": metrics.error_count,
            "requests_per_second": if uptime_seconds > 0 {
                metrics.request_count as f64 / uptime_seconds as f64
            } else {
                0.0
            }
        },
        "operator": {
            "invocations": operator.invocations,
            "completed": operator.completed,
            "failed": operator.failed,
            "success_rate": operator.success_rate(),
            "failures_by_kind": operator.failures_by_kind,
            "words_counted": operator.words_counted,
            "average_duration_ms": operator.average_duration_ms()
        },
        "endpoints": endpoint_stats,
        "memory": get_memory_info()
    }))
}

/// Resident set size from /proc; unavailable elsewhere.
fn get_memory_info() -> serde_json::Value {
    #[cfg(target_os = "linux")]
    {
        let path = format!("/proc/{}/status", std::process::id());
        if let Ok(status) = std::fs::read_to_string(path) {
            let resident_kb = status
                .lines()
                .find(|line| line.starts_with("VmRSS:"))
                .and_then(|line| line.split_whitespace().nth(1))
                .and_then(|kb| kb.parse::<u64>().ok())
                .unwrap_or(0);

            return json!({
                "resident_memory_bytes": resident_kb * 1024,
                "available": true
            });
        }
    }

    json!({
        "resident_memory_bytes": 0,
        "available": false
    })
}

#[cfg(test)]
mod tests {
    use crate::state::tests::state_with_root;
    use actix_web::{test, web, App};
    use serde_json::Value;

    #[actix_web::test]
    async fn test_health_endpoints() {
        let state = state_with_root(std::path::Path::new("."));
        state.record_operator_failure("input_error", 2);

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state))
                .configure(crate::handlers::configure),
        )
        .await;

        let req = test::TestRequest::get().uri("/health").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["metrics"]["operator_failures"], 1);
        assert_eq!(body["collaborators"]["object_store"], "filesystem");

        let req = test::TestRequest::get().uri("/api/v1/metrics").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["operator"]["failures_by_kind"]["input_error"], 1);
        assert_eq!(body["operator"]["success_rate"], 0.0);
    }
}
