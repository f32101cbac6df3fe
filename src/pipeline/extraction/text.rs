//! Plain-text passthrough for .txt, .md and similar formats.

use std::path::Path;

use super::ExtractionError;

/// Reads the file as UTF-8, falling back to a lossy conversion for files
/// with stray non-UTF-8 bytes (common in exported bank statements).
pub fn extract_text(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let text = String::from_utf8_lossy(&bytes).into_owned();
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn reads_utf8_content() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "Revenue grew 14% year over year.").unwrap();
        let text = extract_text(file.path()).unwrap();
        assert_eq!(text, "Revenue grew 14% year over year.");
    }

    #[test]
    fn tolerates_invalid_utf8() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(b"total: \xff 5000").unwrap();
        let text = extract_text(file.path()).unwrap();
        assert!(text.contains("total:"));
        assert!(text.contains("5000"));
    }

    #[test]
    fn empty_file_is_an_error() {
        let file = tempfile::NamedTempFile::new().unwrap();
        assert!(matches!(
            extract_text(file.path()),
            Err(ExtractionError::EmptyExtraction)
        ));
    }
}
