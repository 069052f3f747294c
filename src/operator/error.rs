//! # Operator Errors
//!
//! Failure taxonomy for the word-frequency step. Every variant is terminal for
//! the invocation: the step records the message, marks the workflow as failed
//! and hands back an [`ExecutionError`] that carries the output object.

use serde_json::Value;
use thiserror::Error;

/// Why a single invocation of the operator failed.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OperatorError {
    /// Required input fields (`S3Bucket`, `S3Key`) are missing or empty
    #[error("No valid inputs {0}")]
    Input(String),

    /// Workflow identity (execution id) is missing from the event
    #[error("Missing a required metadata key {0}")]
    Metadata(String),

    /// The transcript document could not be fetched or parsed
    #[error("Unable to read transcription from object store: {0}")]
    Fetch(String),

    /// The metadata store failed or did not report success
    #[error("Unable to upload metadata for asset: {0}")]
    Store(String),
}

impl OperatorError {
    /// Short machine-readable name, used in logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            OperatorError::Input(_) => "input_error",
            OperatorError::Metadata(_) => "metadata_error",
            OperatorError::Fetch(_) => "fetch_error",
            OperatorError::Store(_) => "store_error",
        }
    }
}

/// Structured error signal returned to the orchestrator.
///
/// The orchestrator reads the workflow status and diagnostics from
/// `output_object`, so it is always the fully updated output document.
#[derive(Error, Debug)]
#[error("{cause}")]
pub struct ExecutionError {
    pub output_object: Value,
    #[source]
    pub cause: OperatorError,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_error_messages() {
        let err = OperatorError::Input("'S3Key'".to_string());
        assert_eq!(err.to_string(), "No valid inputs 'S3Key'");
        assert_eq!(err.kind(), "input_error");

        let err = OperatorError::Store("asset-1".to_string());
        assert_eq!(err.to_string(), "Unable to upload metadata for asset: asset-1");
    }

    #[test]
    fn test_execution_error_displays_cause() {
        let err = ExecutionError {
            output_object: json!({"Status": "Error"}),
            cause: OperatorError::Fetch("not found".to_string()),
        };
        assert_eq!(
            err.to_string(),
            "Unable to read transcription from object store: not found"
        );
        assert_eq!(err.output_object["Status"], "Error");
    }
}
