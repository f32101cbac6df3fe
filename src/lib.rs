pub mod config;
pub mod models;
pub mod pipeline;

use tracing_subscriber::EnvFilter;

pub use config::{PipelineConfig, RetryPolicy};
pub use models::document::{FileFormat, SourceDocument};
pub use models::report::AnalysisReport;
pub use pipeline::extraction::{DocumentExtractor, OcrEngine};
pub use pipeline::model::{AnalysisModel, GeminiClient, MockModel, ModelError};
pub use pipeline::prompt::{AnalysisContext, EntityProfile};
pub use pipeline::report::ReportPipeline;
pub use pipeline::PipelineError;

/// Initialize tracing for binaries and integration harnesses embedding the
/// pipeline. Honors `RUST_LOG`; defaults to `info` for this crate.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("diligence_core=info")),
        )
        .init();
}
