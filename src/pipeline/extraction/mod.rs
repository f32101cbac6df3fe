//! Per-format text extraction.
//!
//! Each extractor turns one on-disk file into plain text. Extractors
//! return `ExtractionError` for anything that goes wrong; the aggregation
//! boundary converts those errors into inline placeholder text so that a
//! corrupt or missing file can never sink the whole batch.

pub mod delimited;
pub mod image;
pub mod pdf;
pub mod router;
pub mod spreadsheet;
pub mod text;
pub mod word;

pub use image::{GeminiVisionOcr, MockOcr, OcrEngine};
pub use router::DocumentExtractor;

use std::path::PathBuf;

use thiserror::Error;

use crate::models::document::FileFormat;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("unsupported file extension: {0}")]
    UnsupportedFormat(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("spreadsheet parsing failed: {0}")]
    SpreadsheetParsing(String),

    #[error("CSV parsing failed: {0}")]
    DelimitedParsing(String),

    #[error("Word document parsing failed: {0}")]
    WordParsing(String),

    #[error("OCR request failed: {0}")]
    Ocr(String),

    #[error("extracted no text from document")]
    EmptyExtraction,
}

/// Renders the inline placeholder that stands in for a document whose
/// extraction failed. The corpus keeps its metadata header either way, so
/// the analysis still knows the document existed.
pub fn placeholder_text(format: Option<FileFormat>, err: &ExtractionError) -> String {
    match err {
        ExtractionError::FileNotFound(path) => {
            format!("[File not found: {}]", path.display())
        }
        ExtractionError::UnsupportedFormat(ext) => {
            format!("[Unsupported file type: .{ext}]")
        }
        ExtractionError::EmptyExtraction => match format {
            Some(f) => format!("[No text could be extracted from this {}]", f.label()),
            None => "[No text could be extracted from this document]".to_string(),
        },
        other => match format {
            Some(f) => format!("[Error processing {}: {other}]", f.label()),
            None => format!("[Error processing document: {other}]"),
        },
    }
}
