//! # Operator Event & Workflow Helper
//!
//! The orchestrator invokes an operator with a single JSON document describing
//! the workflow execution, the asset being processed and the operator's input.
//! The operator mutates the status and metadata of that document and hands it
//! back as its output object, whether it succeeded or failed.
//!
//! ## Event Shape:
//! ```json
//! {
//!   "Name": "WordFrequency",
//!   "AssetId": "a1",
//!   "WorkflowExecutionId": "w1",
//!   "Input": {"Media": {"Text": {"S3Bucket": "bucket", "S3Key": "key.json"}}},
//!   "Configuration": {},
//!   "Status": "Started",
//!   "MetaData": {},
//!   "Media": {}
//! }
//! ```
//!
//! Every field is optional on the wire; missing pieces are reported by the
//! accessors so the step can decide which ones are fatal.

use crate::operator::error::OperatorError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Workflow status values this operator writes back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorStatus {
    Complete,
    Error,
}

impl OperatorStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OperatorStatus::Complete => "Complete",
            OperatorStatus::Error => "Error",
        }
    }
}

impl fmt::Display for OperatorStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The operator event document as sent by the orchestrator.
///
/// Unknown `Status` values (e.g. `"Started"`) are kept verbatim until the
/// step overwrites them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct OperatorEvent {
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub asset_id: Option<String>,

    #[serde(default)]
    pub workflow_execution_id: Option<String>,

    #[serde(default)]
    pub input: Value,

    #[serde(default)]
    pub configuration: Value,

    #[serde(default)]
    pub status: Option<String>,

    #[serde(default, rename = "MetaData")]
    pub metadata: Map<String, Value>,

    #[serde(default)]
    pub media: Map<String, Value>,
}

/// Location of the text artifact in the object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextLocation {
    pub bucket: String,
    pub key: String,
}

/// Everything the step needs to know about one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkflowInput {
    pub location: TextLocation,
    pub workflow_execution_id: String,
    /// Empty when the event carries no asset id
    pub asset_id: String,
}

/// Wraps an [`OperatorEvent`] and exposes the operations the step performs
/// on it: reading input and identity, updating status, attaching metadata
/// and producing the output object.
#[derive(Debug, Clone)]
pub struct OperationHelper {
    event: OperatorEvent,
}

impl OperationHelper {
    pub fn new(event: OperatorEvent) -> Self {
        Self { event }
    }

    /// Operator name as given by the orchestrator (may be empty).
    pub fn name(&self) -> &str {
        &self.event.name
    }

    /// Raw `Input` document.
    pub fn input(&self) -> &Value {
        &self.event.input
    }

    /// Current workflow status, if any has been set.
    pub fn status(&self) -> Option<&str> {
        self.event.status.as_deref()
    }

    /// The owning workflow execution id.
    ///
    /// ## Errors:
    /// `OperatorError::Metadata` when the event has no `WorkflowExecutionId`.
    pub fn workflow_execution_id(&self) -> Result<&str, OperatorError> {
        self.event
            .workflow_execution_id
            .as_deref()
            .ok_or_else(|| OperatorError::Metadata("'WorkflowExecutionId'".to_string()))
    }

    pub fn asset_id(&self) -> Option<&str> {
        self.event.asset_id.as_deref()
    }

    /// Location of the text artifact at `Input.Media.Text.{S3Bucket,S3Key}`.
    ///
    /// Both values must be present, be strings and be non-empty.
    pub fn text_location(&self) -> Result<TextLocation, OperatorError> {
        let text = self
            .input()
            .get("Media")
            .and_then(|media| media.get("Text"))
            .ok_or_else(|| OperatorError::Input("'Media.Text'".to_string()))?;

        let field = |name: &str| -> Result<String, OperatorError> {
            match text.get(name).and_then(Value::as_str) {
                Some(value) if !value.is_empty() => Ok(value.to_string()),
                Some(_) => Err(OperatorError::Input(format!("'{}' is empty", name))),
                None => Err(OperatorError::Input(format!("'{}'", name))),
            }
        };

        Ok(TextLocation {
            bucket: field("S3Bucket")?,
            key: field("S3Key")?,
        })
    }

    pub fn update_workflow_status(&mut self, status: OperatorStatus) {
        self.event.status = Some(status.to_string());
    }

    pub fn add_workflow_metadata(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        self.event.metadata.insert(key.into(), value.into());
    }

    /// Snapshot of the event with all updates applied.
    pub fn return_output_object(&self) -> Value {
        // Serializing a struct of strings, maps and Values cannot fail.
        serde_json::to_value(&self.event).unwrap_or(Value::Null)
    }
}
