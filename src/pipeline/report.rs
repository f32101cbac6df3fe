//! End-to-end report generation.
//!
//! Ties the stages together: corpus assembly, prompt build, retried model
//! call, resilient parse, normalization, typed bind. Generic over the
//! model seam so tests run against canned responses.

use tracing::{info, instrument};

use crate::config::{PipelineConfig, RetryPolicy};
use crate::models::document::SourceDocument;
use crate::models::report::AnalysisReport;
use crate::pipeline::aggregate::ContentAggregator;
use crate::pipeline::extraction::{DocumentExtractor, GeminiVisionOcr};
use crate::pipeline::model::{call_with_retry, AnalysisModel, GeminiClient, ModelError};
use crate::pipeline::normalize::normalize_report;
use crate::pipeline::parser::parse_resilient;
use crate::pipeline::prompt::{build_analysis_prompt, AnalysisContext};
use crate::pipeline::PipelineError;

pub struct ReportPipeline<M: AnalysisModel> {
    aggregator: ContentAggregator,
    model: M,
    retry: RetryPolicy,
}

impl ReportPipeline<GeminiClient> {
    /// Fully wired production pipeline: Gemini for analysis, Gemini vision
    /// for image OCR.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, PipelineError> {
        let ocr = GeminiVisionOcr::new(
            &config.base_url,
            &config.ocr_model,
            config.api_key.clone(),
            config.request_timeout(),
        )
        .map_err(|e| PipelineError::Model(ModelError::Transport(e.to_string())))?;
        let extractor = DocumentExtractor::with_ocr(std::sync::Arc::new(ocr));
        let model = GeminiClient::new(config)?;
        Ok(Self::new(extractor, model, config.retry))
    }
}

impl<M: AnalysisModel> ReportPipeline<M> {
    pub fn new(extractor: DocumentExtractor, model: M, retry: RetryPolicy) -> Self {
        Self {
            aggregator: ContentAggregator::new(extractor),
            model,
            retry,
        }
    }

    /// Runs the full pipeline for one entity. Per-document extraction
    /// failures degrade to placeholders inside the corpus; everything after
    /// aggregation either produces a typed report or a `PipelineError`.
    #[instrument(skip_all, fields(company = %context.company.company_name, documents = documents.len()))]
    pub async fn generate(
        &self,
        context: &AnalysisContext,
        documents: &[SourceDocument],
    ) -> Result<AnalysisReport, PipelineError> {
        let corpus = self.aggregator.build_corpus(documents).await?;
        if corpus.trim().is_empty() {
            return Err(PipelineError::EmptyCorpus);
        }

        let prompt = build_analysis_prompt(context, &corpus);
        let raw = call_with_retry(&self.model, &prompt, &self.retry).await?;

        let mut value = parse_resilient(&raw).ok_or(PipelineError::UnparsableResponse)?;
        normalize_report(&mut value);

        let mut report: AnalysisReport = serde_json::from_value(value)?;
        if report.company_name.is_empty() {
            report.company_name = context.company.company_name.clone();
        }

        info!(
            report_calculated = report.report_calculated,
            risk_factors = report.risk_factors.len(),
            compliance_items = report.compliance_items.len(),
            "report generated"
        );
        Ok(report)
    }
}
