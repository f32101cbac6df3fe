//! PDF text extraction via `lopdf`.
//!
//! Works on the embedded text layer only. Scanned PDFs with no text layer
//! come back as `EmptyExtraction`, which the aggregation boundary turns
//! into a placeholder rather than an abort.

use std::path::Path;

use lopdf::Document;
use tracing::debug;

use super::ExtractionError;

pub fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let doc = Document::load(path)
        .map_err(|e| ExtractionError::PdfParsing(e.to_string()))?;

    let mut pages_text = Vec::new();
    for (page_number, _) in doc.get_pages() {
        match doc.extract_text(&[page_number]) {
            Ok(text) if !text.trim().is_empty() => pages_text.push(text),
            Ok(_) => {}
            Err(e) => {
                // A single damaged page should not discard the rest.
                debug!(page = page_number, error = %e, "skipping unreadable PDF page");
            }
        }
    }

    let combined = pages_text.join("\n\n");
    if combined.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    debug!(pages = pages_text.len(), chars = combined.len(), "extracted PDF text");
    Ok(combined)
}
