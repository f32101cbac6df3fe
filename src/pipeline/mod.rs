//! The document-to-report pipeline.
//!
//! Stages run in a fixed order: extraction fans out per document,
//! aggregation assembles the category-grouped corpus, prompt building is
//! pure templating, the model call wraps retries around one network
//! round-trip, and parse/normalize turn untrusted model text into a typed
//! report. Each stage lives in its own module with its own error type;
//! `PipelineError` is the rollup surfaced to callers.

pub mod aggregate;
pub mod extraction;
pub mod model;
pub mod normalize;
pub mod parser;
pub mod prompt;
pub mod report;

use thiserror::Error;

use model::ModelError;

/// Failures that abort a report generation. Per-document extraction
/// failures never appear here; they degrade into placeholder text inside
/// the corpus instead.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("extracted corpus is empty; nothing to analyze")]
    EmptyCorpus,

    #[error("model request failed: {0}")]
    Model(#[from] ModelError),

    #[error("model response is not recoverable JSON")]
    UnparsableResponse,

    #[error("normalized response does not match the report schema: {0}")]
    SchemaMismatch(#[from] serde_json::Error),

    #[error("extraction worker panicked: {0}")]
    WorkerPanic(#[from] tokio::task::JoinError),
}
