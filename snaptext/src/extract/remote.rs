use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use image::DynamicImage;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::GeminiConfig;
use crate::error::{ExtractionError, Result, SnaptextError};

use super::{encode_png, normalize_for_extraction, TextExtractor, REMOTE_NO_TEXT_SENTINEL};

/// Fixed instruction sent with every extraction call.
const EXTRACTION_PROMPT: &str = "Extract all text from this image. \
     Return only the extracted text without any additional explanation. \
     If there is no text, respond with an empty response. \
     Preserve the layout and structure of the text.";

/// Hosted-model extraction backend.
///
/// Issues exactly one `generateContent` call per extraction. Failures are
/// classified by HTTP status into tagged errors; there is no automatic
/// retry; a rate-limited call is reported to the user, not replayed.
#[derive(Clone)]
pub struct GeminiExtractor {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
    max_dimension: u32,
}

#[derive(Debug, Serialize)]
struct GenerateContentRequest {
    contents: Vec<Content>,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum Part {
    Text { text: String },
    InlineData { inline_data: InlineData },
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

impl GeminiExtractor {
    pub fn new(config: &GeminiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SnaptextError::Internal(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            max_dimension: config.max_image_dimension,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn classify_status(status: reqwest::StatusCode, body: &str) -> ExtractionError {
        match status.as_u16() {
            400 | 401 => ExtractionError::InvalidCredentials,
            403 => ExtractionError::Forbidden,
            429 => ExtractionError::RateLimited,
            _ => ExtractionError::Backend(format!("API request failed: {status} - {body}")),
        }
    }
}

#[async_trait]
impl TextExtractor for GeminiExtractor {
    async fn extract(&self, image: &DynamicImage) -> std::result::Result<String, ExtractionError> {
        let normalized = normalize_for_extraction(image, self.max_dimension);
        let png = encode_png(&normalized).map_err(|e| ExtractionError::Backend(e.to_string()))?;

        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: EXTRACTION_PROMPT.to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: STANDARD.encode(&png),
                        },
                    },
                ],
            }],
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ExtractionError::Backend("API request timed out".to_string())
                } else {
                    ExtractionError::Backend(format!("API request failed: {e}"))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::classify_status(status, &body));
        }

        let parsed: GenerateContentResponse = response
            .json()
            .await
            .map_err(|e| ExtractionError::Backend(format!("Failed to parse response: {e}")))?;

        if let Some(reason) = parsed.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(ExtractionError::Blocked(reason));
        }

        let text: String = parsed
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|content| {
                content
                    .parts
                    .iter()
                    .filter_map(|p| p.text.as_deref())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let text = text.trim().to_string();
        if text.is_empty() {
            Ok(REMOTE_NO_TEXT_SENTINEL.to_string())
        } else {
            Ok(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_config() -> GeminiConfig {
        GeminiConfig {
            api_key: format!("AIza{}", "x".repeat(35)),
            model: "gemini-2.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".to_string(),
            timeout_secs: 60,
            max_image_dimension: 4096,
        }
    }

    #[test]
    fn constructor_trims_trailing_slash() {
        let extractor = GeminiExtractor::new(&make_config()).unwrap();
        assert_eq!(
            extractor.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
    }

    #[test]
    fn status_classification_is_tagged() {
        use reqwest::StatusCode;
        assert_eq!(
            GeminiExtractor::classify_status(StatusCode::BAD_REQUEST, ""),
            ExtractionError::InvalidCredentials
        );
        assert_eq!(
            GeminiExtractor::classify_status(StatusCode::FORBIDDEN, ""),
            ExtractionError::Forbidden
        );
        assert_eq!(
            GeminiExtractor::classify_status(StatusCode::TOO_MANY_REQUESTS, ""),
            ExtractionError::RateLimited
        );
        assert!(matches!(
            GeminiExtractor::classify_status(StatusCode::INTERNAL_SERVER_ERROR, "boom"),
            ExtractionError::Backend(_)
        ));
    }

    #[test]
    fn request_body_uses_inline_data_wire_format() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![
                    Part::Text {
                        text: "prompt".to_string(),
                    },
                    Part::InlineData {
                        inline_data: InlineData {
                            mime_type: "image/png".to_string(),
                            data: "aGk=".to_string(),
                        },
                    },
                ],
            }],
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "prompt");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
    }

    #[test]
    fn response_parses_block_reason() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "promptFeedback": { "blockReason": "SAFETY" }
        }))
        .unwrap();
        assert_eq!(
            parsed.prompt_feedback.unwrap().block_reason.as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn response_parses_candidate_text() {
        let parsed: GenerateContentResponse = serde_json::from_value(serde_json::json!({
            "candidates": [
                { "content": { "parts": [ { "text": "HELLO " }, { "text": "WORLD" } ] } }
            ]
        }))
        .unwrap();
        let text: String = parsed.candidates[0]
            .content
            .as_ref()
            .unwrap()
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        assert_eq!(text, "HELLO WORLD");
    }
}
