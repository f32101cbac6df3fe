//! Gemini `generateContent` client for the analysis call.

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::config::PipelineConfig;

use super::{parse_retry_delay, AnalysisModel, ModelError};

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<TextPart>,
}

#[derive(Serialize, Deserialize)]
struct TextPart {
    #[serde(default)]
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<TextPart>,
}

/// Async HTTP client for the generateContent endpoint. Cheap to clone.
#[derive(Clone)]
pub struct GeminiClient {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GeminiClient {
    pub fn new(config: &PipelineConfig) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ModelError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: format!(
                "{}/v1beta/models/{}:generateContent",
                config.base_url, config.analysis_model
            ),
            api_key: config.api_key.clone(),
        })
    }

    fn classify_http_error(status: reqwest::StatusCode, body: String) -> ModelError {
        if status.as_u16() == 429 {
            let retry_after = parse_retry_delay(&body);
            return ModelError::RateLimited {
                message: body,
                retry_after,
            };
        }
        if status.is_server_error() {
            return ModelError::Server {
                status: status.as_u16(),
                message: body,
            };
        }
        ModelError::Rejected {
            status: status.as_u16(),
            message: body,
        }
    }
}

impl AnalysisModel for GeminiClient {
    #[instrument(skip_all, fields(prompt_chars = prompt.len()))]
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let request = GenerateRequest {
            contents: vec![Content {
                parts: vec![TextPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                max_output_tokens: 65_536,
                response_mime_type: "application/json",
            },
        };

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout
                } else {
                    ModelError::Transport(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_http_error(status, body));
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| ModelError::MalformedResponse(e.to_string()))?;

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

        if text.trim().is_empty() {
            return Err(ModelError::EmptyResponse);
        }
        debug!(response_chars = text.len(), "model responded");
        Ok(text)
    }
}

/// Canned model for tests and offline runs. Returns the configured
/// response for every prompt.
#[derive(Clone)]
pub struct MockModel {
    response: String,
}

impl MockModel {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }
}

impl AnalysisModel for MockModel {
    async fn generate(&self, _prompt: &str) -> Result<String, ModelError> {
        Ok(self.response.clone())
    }
}
