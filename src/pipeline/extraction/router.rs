//! Format dispatch for a single document.

use std::path::Path;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::models::document::FileFormat;

use super::{delimited, image, pdf, spreadsheet, text, word, ExtractionError, OcrEngine};

/// Routes one file to the extractor for its format. Cloneable so every
/// blocking worker can carry its own handle.
#[derive(Clone)]
pub struct DocumentExtractor {
    ocr: Option<Arc<dyn OcrEngine>>,
}

impl DocumentExtractor {
    /// An extractor with no OCR engine; image documents fail with an OCR
    /// error and degrade to placeholders downstream.
    pub fn new() -> Self {
        Self { ocr: None }
    }

    pub fn with_ocr(ocr: Arc<dyn OcrEngine>) -> Self {
        Self { ocr: Some(ocr) }
    }

    /// Extracts plain text from the file at `path`. Never panics; every
    /// failure mode is an `ExtractionError` the caller renders inline.
    pub fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        if !path.exists() {
            warn!(path = %path.display(), "document file missing on disk");
            return Err(ExtractionError::FileNotFound(path.to_path_buf()));
        }

        let format = FileFormat::from_path(path).ok_or_else(|| {
            let ext = path
                .extension()
                .and_then(|e| e.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            ExtractionError::UnsupportedFormat(ext)
        })?;

        debug!(path = %path.display(), format = format.label(), "extracting document");
        match format {
            FileFormat::Pdf => pdf::extract_pdf(path),
            FileFormat::Spreadsheet => spreadsheet::extract_spreadsheet(path),
            FileFormat::Delimited => delimited::extract_delimited(path),
            FileFormat::Word => word::extract_word(path),
            FileFormat::PlainText => text::extract_text(path),
            FileFormat::Image => match &self.ocr {
                Some(engine) => image::extract_image(path, engine.as_ref()),
                None => Err(ExtractionError::Ocr(
                    "no OCR engine configured".to_string(),
                )),
            },
        }
    }
}

impl Default for DocumentExtractor {
    fn default() -> Self {
        Self::new()
    }
}
