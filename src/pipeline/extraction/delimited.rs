//! CSV/TSV extraction.
//!
//! Rows are re-rendered as comma-joined lines. Ragged rows are accepted;
//! exported accounting software is rarely strict about column counts.

use std::path::Path;

use super::ExtractionError;

pub fn extract_delimited(path: &Path) -> Result<String, ExtractionError> {
    let delimiter = match path.extension().and_then(|e| e.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => b'\t',
        _ => b',',
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_path(path)
        .map_err(|e| match e.into_kind() {
            csv::ErrorKind::Io(io) => ExtractionError::Io(io),
            other => ExtractionError::DelimitedParsing(format!("{other:?}")),
        })?;

    let mut out = String::new();
    for record in reader.records() {
        let record = record.map_err(|e| ExtractionError::DelimitedParsing(e.to_string()))?;
        let line: Vec<&str> = record.iter().collect();
        out.push_str(&line.join(", "));
        out.push('\n');
    }

    if out.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn joins_fields_with_comma_space() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "date,amount\n2024-01-01,5000\n").unwrap();
        let text = extract_delimited(file.path()).unwrap();
        assert_eq!(text, "date, amount\n2024-01-01, 5000\n");
    }

    #[test]
    fn accepts_ragged_rows() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        write!(file, "a,b,c\n1,2\n").unwrap();
        let text = extract_delimited(file.path()).unwrap();
        assert!(text.contains("1, 2"));
    }

    #[test]
    fn tsv_extension_switches_delimiter() {
        let mut file = tempfile::Builder::new().suffix(".tsv").tempfile().unwrap();
        write!(file, "q1\t100\nq2\t200\n").unwrap();
        let text = extract_delimited(file.path()).unwrap();
        assert_eq!(text, "q1, 100\nq2, 200\n");
    }
}
