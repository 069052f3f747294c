//! # Operator Invocation Handler
//!
//! `POST /api/v1/operators/word-frequency`
//!
//! The request body is the operator event. On success the response is the
//! output object (`"Status": "Complete"`); on failure it is a 500 whose body
//! embeds the output object (`"Status": "Error"`) next to the error details.

use crate::{error::AppError, operator::OperatorEvent, state::AppState};
use actix_web::{web, HttpResponse};
use serde_json::Value;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

pub async fn run_word_frequency(
    state: web::Data<AppState>,
    body: web::Json<Value>,
) -> Result<HttpResponse, AppError> {
    let event: OperatorEvent = serde_json::from_value(body.into_inner())?;

    let span = tracing::info_span!(
        "word_frequency",
        invocation_id = %Uuid::new_v4(),
        workflow_id = event.workflow_execution_id.as_deref().unwrap_or(""),
    );

    let started = Instant::now();
    let result = state.step.execute(event).instrument(span).await;
    let duration_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(outcome) => {
            state.record_operator_success(outcome.distribution.total(), duration_ms);
            Ok(HttpResponse::Ok().json(outcome.output_object))
        }
        Err(err) => {
            state.record_operator_failure(err.cause.kind(), duration_ms);
            Err(err.into())
        }
    }
}
