//! Groq client (OpenAI-compatible chat completions)

use super::{ProviderRequest, TextProvider};
use crate::error::AdvisorError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{error, info};

pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

pub struct GroqClient {
    client: Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GroqClient {
    pub fn new(api_key: String, model: &str) -> crate::Result<Self> {
        Self::with_base_url(api_key, model, DEFAULT_GROQ_BASE_URL)
    }

    pub fn with_base_url(api_key: String, model: &str, base_url: &str) -> crate::Result<Self> {
        let client = Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .pool_max_idle_per_host(8)
            .build()?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
        })
    }

    fn build_request<'a>(&'a self, request: &'a ProviderRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: &request.user_prompt,
                },
            ],
            temperature: 0.2,
            max_tokens: 1024,
            response_format: request
                .json_response
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

#[async_trait]
impl TextProvider for GroqClient {
    fn name(&self) -> &'static str {
        "groq"
    }

    async fn generate(&self, request: &ProviderRequest) -> crate::Result<String> {
        if self.api_key.is_empty() {
            return Err(AdvisorError::ConfigError(
                "GROQ_API_KEY not configured".to_string(),
            ));
        }
        if request.attachment.is_some() {
            return Err(AdvisorError::ProviderError(format!(
                "{} does not accept inline attachments",
                self.model
            )));
        }

        let url = format!("{}/chat/completions", self.base_url);

        info!(model = %self.model, "Calling Groq API");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&self.build_request(request))
            .send()
            .await
            .map_err(|e| {
                error!("Groq API request failed: {}", e);
                AdvisorError::ProviderError(format!("Groq API error: {}", e))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            error!(%status, "Groq API error response: {}", error_text);
            return Err(AdvisorError::ProviderError(format!(
                "Groq API returned {}",
                status
            )));
        }

        let chat: ChatResponse = response.json().await.map_err(|e| {
            error!("Failed to parse Groq response: {}", e);
            AdvisorError::InvalidPayload(format!("Groq parse error: {}", e))
        })?;

        chat.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| AdvisorError::InvalidPayload("Empty response from Groq".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Debug, Deserialize)]
struct AssistantMessage {
    content: Option<String>,
}
