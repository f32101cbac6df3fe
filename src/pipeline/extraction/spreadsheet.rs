//! Excel workbook extraction via `calamine`.
//!
//! Every sheet is rendered to tab-separated rows under a `Sheet:` header,
//! which keeps column alignment legible enough for the analysis model.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use super::ExtractionError;

pub fn extract_spreadsheet(path: &Path) -> Result<String, ExtractionError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|e| ExtractionError::SpreadsheetParsing(e.to_string()))?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut out = String::new();

    for name in &sheet_names {
        let range = match workbook.worksheet_range(name) {
            Ok(range) => range,
            Err(e) => {
                debug!(sheet = %name, error = %e, "skipping unreadable sheet");
                continue;
            }
        };
        if range.is_empty() {
            continue;
        }

        if !out.is_empty() {
            out.push('\n');
        }
        out.push_str(&format!("Sheet: {name}\n"));
        for row in range.rows() {
            let cells: Vec<String> = row.iter().map(render_cell).collect();
            out.push_str(&cells.join("\t"));
            out.push('\n');
        }
    }

    if out.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(out)
}

fn render_cell(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        // Trim float noise on whole numbers (123.0 -> 123).
        Data::Float(f) if f.fract() == 0.0 && f.abs() < 1e15 => {
            format!("{}", *f as i64)
        }
        other => other.to_string(),
    }
}
