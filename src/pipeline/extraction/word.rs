//! Word (.docx) extraction.
//!
//! A .docx file is a zip archive; the body lives in `word/document.xml`.
//! We stream the XML and keep only what affects plain text: `w:t` runs,
//! paragraph breaks, tabs and line breaks. Legacy binary .doc files are
//! not parseable this way and surface as a parsing error.

use std::io::Read;
use std::path::Path;

use quick_xml::events::Event;
use quick_xml::Reader;

use super::ExtractionError;

pub fn extract_word(path: &Path) -> Result<String, ExtractionError> {
    let file = std::fs::File::open(path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| ExtractionError::WordParsing(e.to_string()))?;

    let mut xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| ExtractionError::WordParsing(e.to_string()))?
        .read_to_string(&mut xml)
        .map_err(|e| ExtractionError::WordParsing(e.to_string()))?;

    let text = document_xml_to_text(&xml)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(text)
}

fn document_xml_to_text(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut out = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                b"w:p" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"w:tab" => out.push('\t'),
                b"w:br" => out.push('\n'),
                _ => {}
            },
            Ok(Event::Text(t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| ExtractionError::WordParsing(e.to_string()))?;
                out.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => return Err(ExtractionError::WordParsing(e.to_string())),
        }
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flattens_paragraphs_and_tabs() {
        let xml = r#"<w:document xmlns:w="ns">
            <w:body>
                <w:p><w:r><w:t>Share Purchase Agreement</w:t></w:r></w:p>
                <w:p><w:r><w:t>Buyer:</w:t><w:tab/><w:t>Acme Holdings</w:t></w:r></w:p>
            </w:body>
        </w:document>"#;
        let text = document_xml_to_text(xml).unwrap();
        assert_eq!(text, "Share Purchase Agreement\nBuyer:\tAcme Holdings\n");
    }

    #[test]
    fn ignores_non_run_text() {
        let xml = r#"<w:document><w:p><w:instrText>PAGEREF</w:instrText><w:r><w:t>kept</w:t></w:r></w:p></w:document>"#;
        let text = document_xml_to_text(xml).unwrap();
        assert_eq!(text, "kept\n");
    }

    #[test]
    fn non_zip_file_is_a_parse_error() {
        let mut file = tempfile::Builder::new().suffix(".docx").tempfile().unwrap();
        use std::io::Write;
        write!(file, "plain text, not a zip").unwrap();
        assert!(matches!(
            extract_word(file.path()),
            Err(ExtractionError::WordParsing(_))
        ));
    }
}
