//! # Word-Frequency Operator
//!
//! One step of the media-processing workflow: read a transcript from the
//! object store, count how often each word occurs and persist the result as
//! asset metadata.
//!
//! ## Key Components:
//! - **event**: The operator event document and the helper that updates it
//! - **tokenizer**: Pure text processing (sentences, words, counts)
//! - **step**: The fetch → parse → count → store pipeline
//! - **error**: Failure taxonomy and the structured execution error

pub mod error;
pub mod event;
pub mod step;
pub mod tokenizer;

pub use error::{ExecutionError, OperatorError};
pub use event::OperatorEvent;
pub use step::{StepSettings, WordFrequencyStep};
