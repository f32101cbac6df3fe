//! Image OCR through a vision-capable model.
//!
//! Images carry no text layer, so extraction delegates to a remote vision
//! endpoint. The `OcrEngine` trait keeps that seam swappable; tests use
//! `MockOcr` and never touch the network. Engines are synchronous because
//! extraction runs on blocking worker threads.

use std::path::Path;
use std::time::Duration;

use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ExtractionError;

const OCR_PROMPT: &str = "Extract all text visible in this image. \
Preserve the reading order and any tabular alignment you can. \
Return only the extracted text, with no commentary.";

/// Turns image bytes into text. Implementations must be cheap to share
/// across extraction workers.
pub trait OcrEngine: Send + Sync {
    fn recognize(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractionError>;
}

pub fn extract_image(path: &Path, engine: &dyn OcrEngine) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    let mime = mime_type_for(path);
    let text = engine.recognize(&bytes, mime)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::EmptyExtraction);
    }
    Ok(text)
}

fn mime_type_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("bmp") => "image/bmp",
        Some("webp") => "image/webp",
        _ => "image/jpeg",
    }
}

// Request/response shapes for the generateContent vision call.

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VisionRequest {
    contents: Vec<VisionContent>,
}

#[derive(Serialize)]
struct VisionContent {
    parts: Vec<VisionPart>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
enum VisionPart {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "inlineData")]
    InlineData(InlineData),
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Deserialize)]
struct VisionResponse {
    #[serde(default)]
    candidates: Vec<VisionCandidate>,
}

#[derive(Deserialize)]
struct VisionCandidate {
    content: VisionCandidateContent,
}

#[derive(Deserialize)]
struct VisionCandidateContent {
    #[serde(default)]
    parts: Vec<VisionTextPart>,
}

#[derive(Deserialize)]
struct VisionTextPart {
    #[serde(default)]
    text: String,
}

/// OCR engine backed by the Gemini generateContent endpoint.
pub struct GeminiVisionOcr {
    client: reqwest::blocking::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiVisionOcr {
    pub fn new(
        base_url: &str,
        model: &str,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, ExtractionError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!("{base_url}/v1beta/models/{model}:generateContent"),
            api_key: api_key.into(),
        })
    }
}

impl OcrEngine for GeminiVisionOcr {
    fn recognize(&self, image: &[u8], mime_type: &str) -> Result<String, ExtractionError> {
        let request = VisionRequest {
            contents: vec![VisionContent {
                parts: vec![
                    VisionPart::Text(OCR_PROMPT.to_string()),
                    VisionPart::InlineData(InlineData {
                        mime_type: mime_type.to_string(),
                        data: BASE64_STANDARD.encode(image),
                    }),
                ],
            }],
        };

        debug!(bytes = image.len(), mime = mime_type, "sending image for OCR");
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(ExtractionError::Ocr(format!("HTTP {status}: {body}")));
        }

        let parsed: VisionResponse = response
            .json()
            .map_err(|e| ExtractionError::Ocr(e.to_string()))?;
        let text = parsed
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();
        Ok(text)
    }
}

/// Fixed-output engine for tests.
pub struct MockOcr {
    pub text: String,
}

impl MockOcr {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl OcrEngine for MockOcr {
    fn recognize(&self, _image: &[u8], _mime_type: &str) -> Result<String, ExtractionError> {
        Ok(self.text.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn mime_type_follows_extension() {
        assert_eq!(mime_type_for(Path::new("scan.png")), "image/png");
        assert_eq!(mime_type_for(Path::new("scan.JPG")), "image/jpeg");
        assert_eq!(mime_type_for(Path::new("scan.webp")), "image/webp");
    }

    #[test]
    fn mock_engine_feeds_extraction() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89, 0x50, 0x4e, 0x47]).unwrap();
        let engine = MockOcr::new("Invoice #42\nTotal: 5,000");
        let text = extract_image(file.path(), &engine).unwrap();
        assert!(text.contains("Invoice #42"));
    }

    #[test]
    fn blank_ocr_output_is_empty_extraction() {
        let mut file = tempfile::Builder::new().suffix(".png").tempfile().unwrap();
        file.write_all(&[0x89]).unwrap();
        let engine = MockOcr::new("   ");
        assert!(matches!(
            extract_image(file.path(), &engine),
            Err(ExtractionError::EmptyExtraction)
        ));
    }

    #[test]
    fn vision_request_serializes_camel_case() {
        let req = VisionRequest {
            contents: vec![VisionContent {
                parts: vec![
                    VisionPart::Text("read this".to_string()),
                    VisionPart::InlineData(InlineData {
                        mime_type: "image/png".to_string(),
                        data: "AAAA".to_string(),
                    }),
                ],
            }],
        };
        let json = serde_json::to_value(&req).unwrap();
        let part = &json["contents"][0]["parts"][1]["inlineData"];
        assert_eq!(part["mimeType"], "image/png");
        assert_eq!(part["data"], "AAAA");
    }
}
