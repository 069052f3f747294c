//! # Word-Frequency Step
//!
//! The I/O shell around [`compute_word_frequency`]:
//!
//! ```text
//! event → input/identity → fetch → parse → tokenize → count → store → output
//! ```
//!
//! ## Failure Handling:
//! Every failure is terminal. The step marks the workflow status `Error`,
//! records the description in the output object's `MetaData` and returns an
//! [`ExecutionError`] carrying that object. Nothing is retried and nothing is
//! swallowed; the only non-fatal gap is a missing asset id, which becomes `""`.

use crate::dataplane::MetadataStore;
use crate::operator::error::{ExecutionError, OperatorError};
use crate::operator::event::{OperationHelper, OperatorEvent, OperatorStatus, WorkflowInput};
use crate::operator::tokenizer::{compute_word_frequency, FrequencyDistribution};
use crate::storage::ObjectStore;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Transcription document as produced by the speech-to-text service.
/// Only the first transcript alternative is read.
#[derive(Debug, Deserialize)]
struct TranscriptionDocument {
    results: TranscriptionResults,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResults {
    transcripts: Vec<TranscriptEntry>,
}

#[derive(Debug, Deserialize)]
struct TranscriptEntry {
    transcript: String,
}

/// Extract `results.transcripts[0].transcript` from a raw document.
pub fn parse_transcript(body: &[u8]) -> Result<String, OperatorError> {
    let text = std::str::from_utf8(body)
        .map_err(|e| OperatorError::Fetch(format!("document is not UTF-8: {}", e)))?;
    let document: TranscriptionDocument =
        serde_json::from_str(text).map_err(|e| OperatorError::Fetch(e.to_string()))?;
    document
        .results
        .transcripts
        .into_iter()
        .next()
        .map(|entry| entry.transcript)
        .ok_or_else(|| OperatorError::Fetch("'results.transcripts' is empty".to_string()))
}

/// Behaviour knobs that come from configuration rather than the event.
#[derive(Debug, Clone)]
pub struct StepSettings {
    /// Operator name used when the event does not carry one
    pub default_operator_name: String,
    /// `MetaData` key under which failure descriptions are recorded
    pub error_metadata_key: String,
}

impl Default for StepSettings {
    fn default() -> Self {
        Self {
            default_operator_name: "WordFrequency".to_string(),
            error_metadata_key: "TranslateError".to_string(),
        }
    }
}

/// Result of a successful run, for callers that want more than the output object.
#[derive(Debug, Clone)]
pub struct StepOutcome {
    pub output_object: Value,
    pub distribution: FrequencyDistribution,
}

/// The transcript word-frequency operator.
pub struct WordFrequencyStep {
    object_store: Arc<dyn ObjectStore>,
    metadata_store: Arc<dyn MetadataStore>,
    settings: StepSettings,
}

impl WordFrequencyStep {
    pub fn new(
        object_store: Arc<dyn ObjectStore>,
        metadata_store: Arc<dyn MetadataStore>,
        settings: StepSettings,
    ) -> Self {
        Self {
            object_store,
            metadata_store,
            settings,
        }
    }

    /// Run the operator on one event and return the updated output object.
    pub async fn run(&self, event: OperatorEvent) -> Result<Value, ExecutionError> {
        self.execute(event).await.map(|outcome| outcome.output_object)
    }

    /// Like [`run`](Self::run), but also hands back the computed distribution.
    pub async fn execute(&self, event: OperatorEvent) -> Result<StepOutcome, ExecutionError> {
        let mut operation = OperationHelper::new(event);
        debug!(
            operator = operation.name(),
            status = ?operation.status(),
            input = %operation.input(),
            "Received operator event"
        );

        match self.process(&operation).await {
            Ok(distribution) => {
                operation.update_workflow_status(OperatorStatus::Complete);
                Ok(StepOutcome {
                    output_object: operation.return_output_object(),
                    distribution,
                })
            }
            Err(cause) => {
                error!(kind = cause.kind(), "{}", cause);
                operation.update_workflow_status(OperatorStatus::Error);
                operation.add_workflow_metadata(
                    self.settings.error_metadata_key.clone(),
                    cause.to_string(),
                );
                Err(ExecutionError {
                    output_object: operation.return_output_object(),
                    cause,
                })
            }
        }
    }

    fn workflow_input(&self, operation: &OperationHelper) -> Result<WorkflowInput, OperatorError> {
        let location = operation.text_location()?;
        let workflow_execution_id = operation.workflow_execution_id()?.to_string();
        let asset_id = match operation.asset_id() {
            Some(asset_id) => asset_id.to_string(),
            None => {
                warn!("No asset id for this workflow");
                String::new()
            }
        };

        Ok(WorkflowInput {
            location,
            workflow_execution_id,
            asset_id,
        })
    }

    async fn process(
        &self,
        operation: &OperationHelper,
    ) -> Result<FrequencyDistribution, OperatorError> {
        let input = self.workflow_input(operation)?;

        let body = self
            .object_store
            .get(&input.location.bucket, &input.location.key)
            .await
            .map_err(|e| OperatorError::Fetch(format!("{:#}", e)))?;
        let transcript = parse_transcript(&body)?;

        let distribution = compute_word_frequency(&transcript);
        info!(
            workflow_id = %input.workflow_execution_id,
            asset_id = %input.asset_id,
            text_length = transcript.chars().count(),
            word_count = distribution.total(),
            distinct_words = distribution.len(),
            "Computed word frequency"
        );
        debug!(top_words = ?distribution.most_common(10), "Most common words");

        let payload = json!({ "Results": distribution });
        let operator_name = if operation.name().is_empty() {
            self.settings.default_operator_name.as_str()
        } else {
            operation.name()
        };

        let response = self
            .metadata_store
            .store_asset_metadata(
                &input.asset_id,
                operator_name,
                &input.workflow_execution_id,
                &payload,
            )
            .await
            .map_err(|e| {
                let reason = format!("{:#}", e);
                error!(error = %reason, "Metadata store request failed");
                OperatorError::Store(input.asset_id.clone())
            })?;

        match response.get("Status").and_then(Value::as_str) {
            Some("Success") => Ok(distribution),
            other => {
                warn!(status = ?other, "Metadata store did not report success");
                Err(OperatorError::Store(input.asset_id.clone()))
            }
        }
    }
}
