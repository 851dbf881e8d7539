//! Gemini API client
//!
//! Uses a long-lived reqwest::Client for connection pooling.

use super::{ProviderRequest, TextProvider};
use crate::error::AdvisorError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash-latest";
const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Reusable Gemini client (connection-pooled)
pub struct GeminiClient {
    client: Client,
    api_key: String,
    endpoint: String,
}

impl GeminiClient {
    pub fn new(api_key: String, model: &str) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            endpoint: format!("{}/{}:generateContent", GEMINI_BASE_URL, model),
        })
    }

    fn build_request(request: &ProviderRequest) -> GeminiRequest {
        let mut parts = Vec::with_capacity(2);
        if let Some(attachment) = &request.attachment {
            parts.push(Part::InlineData {
                inline_data: Blob {
                    mime_type: attachment.mime_type.clone(),
                    data: attachment.data.clone(),
                },
            });
        }
        parts.push(Part::Text {
            text: request.user_prompt.clone(),
        });

        GeminiRequest {
            contents: vec![Content {
                role: Some("user".to_string()),
                parts,
            }],
            generation_config: GenerationConfig {
                temperature: 0.2,
                top_p: 0.9,
                top_k: 40,
                max_output_tokens: 1024,
                response_mime_type: request
                    .json_response
                    .then(|| "application/json".to_string()),
            },
            system_instruction: Content {
                role: None,
                parts: vec![Part::Text {
                    text: request.system_prompt.clone(),
                }],
            },
        }
    }
}

#[async_trait]
impl TextProvider for GeminiClient {
    fn name(&self) -> &'static str {
        "gemini"
    }

    async fn generate(&self, request: &ProviderRequest) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(AdvisorError::ConfigError(
                "GEMINI_API_KEY not configured".to_string(),
            ));
        }

        let body = Self::build_request(request);

        info!("Calling Gemini API");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                error!("Gemini API request failed: {}", e);
                AdvisorError::ProviderError(format!("Gemini API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Gemini API error response: {}", error_text);
            return Err(AdvisorError::ProviderError(format!(
                "Gemini API returned {}",
                status
            )));
        }

        let gemini_response: GeminiResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            AdvisorError::InvalidPayload(format!("Gemini parse error: {}", e))
        })?;

        let text = gemini_response.first_text().ok_or_else(|| {
            AdvisorError::InvalidPayload("Empty response from Gemini".to_string())
        })?;

        info!(chars = text.len(), "Gemini response received");

        Ok(text)
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
    system_instruction: Content,
}

#[derive(Debug, Serialize, Deserialize)]
struct Content {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum Part {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: Blob,
    },
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Blob {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: i32,
    max_output_tokens: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

impl GeminiResponse {
    fn first_text(&self) -> Option<String> {
        let parts = &self.candidates.first()?.content.as_ref()?.parts;
        let text: String = parts
            .iter()
            .filter_map(|part| match part {
                Part::Text { text } => Some(text.as_str()),
                Part::InlineData { .. } => None,
            })
            .collect();

        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::InlineData;

    #[test]
    fn test_request_serialization() {
        let request = ProviderRequest::json("You are a financial advisor", "What is 80C?")
            .with_attachment(InlineData {
                mime_type: "image/png".to_string(),
                data: "aGVsbG8=".to_string(),
            });

        let json = serde_json::to_value(GeminiClient::build_request(&request)).unwrap();

        assert_eq!(
            json["generationConfig"]["responseMimeType"],
            "application/json"
        );
        assert_eq!(json["contents"][0]["parts"][0]["inlineData"]["mimeType"], "image/png");
        assert_eq!(json["contents"][0]["parts"][1]["text"], "What is 80C?");
        assert_eq!(
            json["systemInstruction"]["parts"][0]["text"],
            "You are a financial advisor"
        );
        assert!(json["systemInstruction"].get("role").is_none());
    }

    #[test]
    fn test_response_text_extraction() {
        let raw = r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"{\"reply\":"},{"text":"\"ok\"}"}]},"finishReason":"STOP"}]}"#;
        let response: GeminiResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.first_text().unwrap(), r#"{"reply":"ok"}"#);

        let empty: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(empty.first_text().is_none());
    }

    #[tokio::test]
    async fn test_missing_api_key() {
        let client = GeminiClient::new(String::new(), DEFAULT_GEMINI_MODEL).unwrap();
        let result = client.generate(&ProviderRequest::json("s", "u")).await;

        assert!(result.is_err());
        let error_msg = result.unwrap_err().to_string();
        assert!(error_msg.to_lowercase().contains("gemini_api_key"));
    }
}
