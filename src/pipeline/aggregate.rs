//! Corpus assembly: concurrent extraction plus category grouping.
//!
//! Every supplied document appears in the corpus exactly once. A document
//! whose extraction fails keeps its metadata header and gets placeholder
//! text as its body, so the analysis prompt always reflects the full
//! upload set and the model can comment on what was unreadable.

use std::collections::BTreeMap;

use tracing::{info, instrument, warn};

use crate::models::document::{
    category_rank, format_category_title, FileFormat, SourceDocument,
};
use crate::pipeline::extraction::{placeholder_text, DocumentExtractor};
use crate::pipeline::PipelineError;

struct ExtractedDocument {
    document: SourceDocument,
    text: String,
    failed: bool,
}

/// Fans extraction out over blocking workers and stitches the results into
/// one model-ready corpus string.
#[derive(Clone)]
pub struct ContentAggregator {
    extractor: DocumentExtractor,
}

impl ContentAggregator {
    pub fn new(extractor: DocumentExtractor) -> Self {
        Self { extractor }
    }

    /// Extracts every document concurrently and renders the grouped corpus.
    /// Only worker panics abort; extraction failures degrade in place and an
    /// empty input set yields an empty corpus.
    #[instrument(skip_all, fields(documents = documents.len()))]
    pub async fn build_corpus(
        &self,
        documents: &[SourceDocument],
    ) -> Result<String, PipelineError> {
        let mut handles = Vec::with_capacity(documents.len());
        for document in documents {
            let extractor = self.extractor.clone();
            let document = document.clone();
            handles.push(tokio::task::spawn_blocking(move || {
                let format = FileFormat::from_path(&document.path);
                let (text, failed) = match extractor.extract(&document.path) {
                    Ok(text) => (text, false),
                    Err(err) => {
                        warn!(
                            document_id = %document.id,
                            name = %document.original_name,
                            error = %err,
                            "extraction failed; substituting placeholder"
                        );
                        (placeholder_text(format, &err), true)
                    }
                };
                ExtractedDocument {
                    document,
                    text,
                    failed,
                }
            }));
        }

        // Await in submission order so the corpus is deterministic for a
        // given input order regardless of worker scheduling.
        let mut extracted = Vec::with_capacity(handles.len());
        for handle in handles {
            extracted.push(handle.await?);
        }

        let failures = extracted.iter().filter(|e| e.failed).count();
        info!(
            documents = extracted.len(),
            failures, "extraction batch complete"
        );

        Ok(render_corpus(&extracted))
    }
}

fn render_corpus(extracted: &[ExtractedDocument]) -> String {
    // Bucket by category tag, keyed for deterministic emit order: known
    // categories in canonical order, then unknown tags by first appearance.
    let mut buckets: BTreeMap<(usize, usize), (&str, Vec<&ExtractedDocument>)> = BTreeMap::new();
    let mut seen = Vec::new();
    for doc in extracted {
        // Key on the prefix-stripped tag so "financial_cash_flow" and
        // "cash_flow" land in one bucket instead of two identical titles.
        let tag = doc.document.document_type.as_str();
        let tag = tag.strip_prefix("financial_").unwrap_or(tag);
        let appearance = match seen.iter().position(|t| *t == tag) {
            Some(i) => i,
            None => {
                seen.push(tag);
                seen.len() - 1
            }
        };
        buckets
            .entry((category_rank(tag), appearance))
            .or_insert_with(|| (tag, Vec::new()))
            .1
            .push(doc);
    }

    let mut corpus = String::new();
    for (tag, docs) in buckets.values() {
        if !corpus.is_empty() {
            corpus.push('\n');
        }
        corpus.push_str(&format!("=== {} ===\n", format_category_title(tag)));
        for doc in docs {
            corpus.push('\n');
            corpus.push_str(&render_document(doc));
        }
    }
    corpus
}

// Optional metadata renders as explicit "Not specified"/"Unknown" lines so
// the model never has to guess whether a field was omitted or empty.
fn render_document(extracted: &ExtractedDocument) -> String {
    let doc = &extracted.document;
    let mut out = format!("--- Document: {} ---\n", doc.original_name);
    out.push_str(&format!(
        "Type: {}\n",
        format_category_title(&doc.document_type)
    ));
    out.push_str(&format!(
        "Description: {}\n",
        doc.description.as_deref().unwrap_or("No description provided")
    ));
    out.push_str(&format!(
        "Time Period: {}\n",
        doc.time_period.as_deref().unwrap_or("Not specified")
    ));
    out.push_str(&format!(
        "File Type: {}\n",
        doc.file_type.as_deref().unwrap_or("Unknown")
    ));
    match doc.file_size {
        Some(size) => out.push_str(&format!(
            "File Size: {:.2} MB\n",
            size as f64 / (1024.0 * 1024.0)
        )),
        None => out.push_str("File Size: Unknown\n"),
    }
    match doc.created_at {
        Some(created) => {
            out.push_str(&format!("Created: {}\n", created.format("%B %d, %Y")))
        }
        None => out.push_str("Created: Unknown\n"),
    }
    out.push_str("--- Document Content ---\n");
    out.push_str(extracted.text.trim_end());
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn text_doc(content: &str, name: &str, category: &str) -> (NamedTempFile, SourceDocument) {
        let mut file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        write!(file, "{content}").unwrap();
        let doc = SourceDocument::new(file.path(), category, name);
        (file, doc)
    }

    #[tokio::test]
    async fn empty_input_yields_empty_corpus() {
        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator.build_corpus(&[]).await.unwrap();
        assert!(corpus.is_empty());
    }

    #[tokio::test]
    async fn every_document_appears_in_the_corpus() {
        let (_f1, d1) = text_doc("assets: 10", "bs.txt", "balance_sheet");
        let (_f2, d2) = text_doc("revenue: 20", "pl.txt", "income_statement");
        let missing = SourceDocument::new("/nope/gst_return.pdf", "tax_filings", "gst_return.pdf");

        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator
            .build_corpus(&[d1, d2, missing])
            .await
            .unwrap();

        assert!(corpus.contains("--- Document: bs.txt ---"));
        assert!(corpus.contains("--- Document: pl.txt ---"));
        assert!(corpus.contains("--- Document: gst_return.pdf ---"));
        assert!(corpus.contains("[File not found: /nope/gst_return.pdf]"));
    }

    #[tokio::test]
    async fn known_categories_emit_in_canonical_order() {
        let (_f1, d1) = text_doc("tds", "tds.txt", "tax_filings");
        let (_f2, d2) = text_doc("assets", "bs.txt", "balance_sheet");
        let (_f3, d3) = text_doc("misc", "note.txt", "board_minutes");

        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator.build_corpus(&[d1, d2, d3]).await.unwrap();

        let balance = corpus.find("=== Balance Sheet ===").unwrap();
        let tax = corpus.find("=== Tax Filings ===").unwrap();
        let minutes = corpus.find("=== Board Minutes ===").unwrap();
        assert!(balance < tax, "known categories follow canonical order");
        assert!(tax < minutes, "unknown tags trail the known set");
    }

    #[tokio::test]
    async fn financial_prefix_is_stripped_from_titles() {
        let (_f, d) = text_doc("flows", "cf.txt", "financial_cash_flow");
        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator.build_corpus(&[d]).await.unwrap();
        assert!(corpus.contains("=== Cash Flow ==="));
    }

    #[tokio::test]
    async fn prefixed_and_bare_tags_share_one_bucket() {
        let (_f1, d1) = text_doc("q1 flows", "q1.txt", "cash_flow");
        let (_f2, d2) = text_doc("q2 flows", "q2.txt", "financial_cash_flow");
        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator.build_corpus(&[d1, d2]).await.unwrap();
        assert_eq!(corpus.matches("=== Cash Flow ===").count(), 1);
        assert!(corpus.contains("--- Document: q1.txt ---"));
        assert!(corpus.contains("--- Document: q2.txt ---"));
    }

    #[tokio::test]
    async fn metadata_header_renders_present_and_absent_fields() {
        let (_f, mut d) = text_doc("balance", "bs.txt", "balance_sheet");
        d.description = Some("Audited statement".to_string());
        d.time_period = Some("FY 2023-24".to_string());
        d.file_size = Some(2_621_440);

        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let corpus = aggregator.build_corpus(&[d]).await.unwrap();
        assert!(corpus.contains("Description: Audited statement"));
        assert!(corpus.contains("Time Period: FY 2023-24"));
        assert!(corpus.contains("File Size: 2.50 MB"));
        assert!(corpus.contains("File Type: Unknown"));
        assert!(corpus.contains("Created: Unknown"));
        assert!(corpus.contains("--- Document Content ---"));
    }

    #[tokio::test]
    async fn corpus_is_deterministic_across_runs() {
        let (_f1, d1) = text_doc("a", "a.txt", "other");
        let (_f2, d2) = text_doc("b", "b.txt", "balance_sheet");
        let docs = vec![d1, d2];

        let aggregator = ContentAggregator::new(DocumentExtractor::new());
        let first = aggregator.build_corpus(&docs).await.unwrap();
        let second = aggregator.build_corpus(&docs).await.unwrap();
        assert_eq!(first, second);
    }
}
