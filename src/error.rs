//! # Error Handling
//!
//! Service-level error type and how it is rendered as an HTTP response.
//!
//! Operator failures travel as [`ExecutionError`] and are wrapped in
//! `AppError::Execution`; their response additionally carries the operator's
//! output object so the orchestrator can read the workflow status from it.
//!
//! ## JSON Response Format:
//! ```json
//! {
//!   "error": {
//!     "type": "fetch_error",
//!     "message": "Unable to read transcription from object store: ...",
//!     "timestamp": "2025-01-01T12:00:00Z"
//!   },
//!   "output_object": { "Status": "Error", "MetaData": { ... } }
//! }
//! ```

use crate::operator::ExecutionError;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use std::fmt;

/// Custom error types for the service.
///
/// ## Error Categories:
/// - **Internal**: Server-side problems (500)
/// - **BadRequest**: The request body is not an operator event (400)
/// - **Execution**: The operator ran and failed (500, with output object)
#[derive(Debug)]
pub enum AppError {
    /// Internal server errors
    Internal(String),

    /// Client sent invalid or malformed data
    BadRequest(String),

    /// The operator failed; carries the updated output object
    Execution(ExecutionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Internal(msg) => write!(f, "Internal error: {}", msg),
            AppError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            AppError::Execution(err) => write!(f, "Operator execution failed: {}", err),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Internal(_) | AppError::Execution(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let (error_type, message) = match self {
            AppError::Internal(msg) => ("internal_error", msg.clone()),
            AppError::BadRequest(msg) => ("bad_request", msg.clone()),
            AppError::Execution(err) => (err.cause.kind(), err.to_string()),
        };

        let mut body = json!({
            "error": {
                "type": error_type,
                "message": message,
                "timestamp": chrono::Utc::now().to_rfc3339()
            }
        });

        if let AppError::Execution(err) = self {
            body["output_object"] = err.output_object.clone();
        }

        HttpResponse::build(self.status_code()).json(body)
    }
}

impl From<ExecutionError> for AppError {
    fn from(err: ExecutionError) -> Self {
        AppError::Execution(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err.to_string())
    }
}

/// JSON that parsed but does not describe an operator event is the caller's fault.
impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::BadRequest(format!("Invalid operator event: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operator::OperatorError;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            AppError::BadRequest("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::from(anyhow::anyhow!("boom")).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_execution_error_conversion() {
        let err: AppError = ExecutionError {
            output_object: json!({"Status": "Error"}),
            cause: OperatorError::Input("'S3Bucket'".to_string()),
        }
        .into();

        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            err.to_string(),
            "Operator execution failed: No valid inputs 'S3Bucket'"
        );
    }
}
