use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An uploaded artifact handed to the pipeline. Immutable once created; the
/// pipeline only reads it — storage and upload policing belong to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceDocument {
    pub id: Uuid,
    pub path: PathBuf,
    /// Open string tag classifying the document's financial role,
    /// e.g. `"balance_sheet"` or `"financial_cash_flow"`.
    pub document_type: String,
    pub original_name: String,
    pub description: Option<String>,
    /// Human label like "FY 2023" or "Q1 2024".
    pub time_period: Option<String>,
    /// Declared format hint from the upload layer; extraction trusts the
    /// extension on disk, this only feeds the metadata header.
    pub file_type: Option<String>,
    pub file_size: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl SourceDocument {
    pub fn new(
        path: impl Into<PathBuf>,
        document_type: impl Into<String>,
        original_name: impl Into<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            path: path.into(),
            document_type: document_type.into(),
            original_name: original_name.into(),
            description: None,
            time_period: None,
            file_type: None,
            file_size: None,
            created_at: None,
        }
    }
}

/// File formats the extraction layer understands. Unknown extensions are not
/// a variant — they surface as an `Unsupported` extraction error instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileFormat {
    Pdf,
    Spreadsheet,
    Delimited,
    Word,
    Image,
    PlainText,
}

impl FileFormat {
    /// Resolve a format from a lowercase file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "pdf" => Some(Self::Pdf),
            "xls" | "xlsx" => Some(Self::Spreadsheet),
            "csv" | "tsv" => Some(Self::Delimited),
            "doc" | "docx" => Some(Self::Word),
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" => Some(Self::Image),
            "txt" | "md" | "json" | "xml" => Some(Self::PlainText),
            _ => None,
        }
    }

    /// Resolve a format from a path's extension.
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        Self::from_extension(&ext)
    }

    /// Human label used in placeholders and metadata headers.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pdf => "PDF",
            Self::Spreadsheet => "spreadsheet",
            Self::Delimited => "CSV",
            Self::Word => "Word document",
            Self::Image => "image",
            Self::PlainText => "text file",
        }
    }
}

/// Category tags with first-class treatment in the corpus: these emit in
/// canonical order before any unknown tags the caller invents.
pub const KNOWN_CATEGORIES: &[&str] = &[
    "balance_sheet",
    "income_statement",
    "cash_flow",
    "tax_filings",
    "bank_statements",
    "projections",
    "audit_reports",
    "cap_table",
    "other",
];

/// Format a category tag as a section title: strip the `financial_` prefix
/// that the upload layer attaches, then capitalize each underscore-separated
/// word. Unknown tags pass through the same rule verbatim.
pub fn format_category_title(tag: &str) -> String {
    let tag = tag.strip_prefix("financial_").unwrap_or(tag);
    tag.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical bucket rank for a category tag: known categories order first,
/// unknown tags sort after them (callers break ties by first appearance).
pub fn category_rank(tag: &str) -> usize {
    let bare = tag.strip_prefix("financial_").unwrap_or(tag);
    KNOWN_CATEGORIES
        .iter()
        .position(|k| *k == bare)
        .unwrap_or(KNOWN_CATEGORIES.len())
}
