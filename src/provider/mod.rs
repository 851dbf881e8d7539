//! Text-generation provider boundary
//!
//! Providers return raw text. Callers own the schema and parse it with
//! [`parse_json_payload`], so a misbehaving model is caught at one place.

use crate::error::AdvisorError;
use crate::Result;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, warn};

pub mod gemini;
pub mod groq;

pub use gemini::GeminiClient;
pub use groq::GroqClient;

/// Inline binary attachment (base64 payload plus mime type)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InlineData {
    pub mime_type: String,
    pub data: String,
}

/// One generation call
#[derive(Debug, Clone, Default)]
pub struct ProviderRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub attachment: Option<InlineData>,
    /// Ask the provider to constrain output to a JSON object
    pub json_response: bool,
}

impl ProviderRequest {
    pub fn json(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            attachment: None,
            json_response: true,
        }
    }

    pub fn with_attachment(mut self, attachment: InlineData) -> Self {
        self.attachment = Some(attachment);
        self
    }
}

/// Trait for text generation backends
#[async_trait]
pub trait TextProvider: Send + Sync {
    fn name(&self) -> &'static str;

    async fn generate(&self, request: &ProviderRequest) -> Result<String>;
}

/// Provider used when no API key is configured. Every call fails, so
/// callers take their deterministic path.
pub struct UnavailableProvider {
    reason: String,
}

impl UnavailableProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl TextProvider for UnavailableProvider {
    fn name(&self) -> &'static str {
        "unavailable"
    }

    async fn generate(&self, _request: &ProviderRequest) -> Result<String> {
        Err(AdvisorError::ProviderError(self.reason.clone()))
    }
}

/// Single provider attempt bounded by `timeout`. A hang counts as a failure.
pub async fn generate_within(
    provider: &dyn TextProvider,
    request: &ProviderRequest,
    timeout: Duration,
) -> Result<String> {
    debug!(provider = provider.name(), timeout_secs = timeout.as_secs(), "Calling provider");

    match tokio::time::timeout(timeout, provider.generate(request)).await {
        Ok(result) => result,
        Err(_) => {
            warn!(provider = provider.name(), "Provider call timed out");
            Err(AdvisorError::ProviderTimeout(timeout.as_secs()))
        }
    }
}

/// Strip an optional markdown fence around a JSON body
fn unfence(raw: &str) -> &str {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        return trimmed;
    }

    if let Some(start) = trimmed.find("```") {
        let after = &trimmed[start + 3..];
        let after = after.strip_prefix("json").unwrap_or(after);
        if let Some(end) = after.find("```") {
            return after[..end].trim();
        }
    }

    trimmed
}

/// Parse a provider payload into a strict schema
pub fn parse_json_payload<T: DeserializeOwned>(raw: &str) -> Result<T> {
    let body = unfence(raw);
    if body.is_empty() {
        return Err(AdvisorError::InvalidPayload("empty payload".to_string()));
    }

    serde_json::from_str(body)
        .map_err(|e| AdvisorError::InvalidPayload(format!("schema mismatch: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Sample {
        reply: String,
    }

    struct SlowProvider;

    #[async_trait]
    impl TextProvider for SlowProvider {
        fn name(&self) -> &'static str {
            "slow"
        }

        async fn generate(&self, _request: &ProviderRequest) -> Result<String> {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok("{}".to_string())
        }
    }

    #[test]
    fn test_parse_plain_and_fenced() {
        let plain: Sample = parse_json_payload(r#"{"reply":"hi"}"#).unwrap();
        assert_eq!(plain.reply, "hi");

        let fenced: Sample =
            parse_json_payload("Here you go:\n```json\n{\"reply\":\"fenced\"}\n```").unwrap();
        assert_eq!(fenced.reply, "fenced");
    }

    #[test]
    fn test_parse_rejects_empty_and_mismatch() {
        assert!(matches!(
            parse_json_payload::<Sample>("   "),
            Err(AdvisorError::InvalidPayload(_))
        ));
        assert!(matches!(
            parse_json_payload::<Sample>(r#"{"answer":"x"}"#),
            Err(AdvisorError::InvalidPayload(_))
        ));
    }

    #[tokio::test]
    async fn test_unavailable_provider_fails() {
        let provider = UnavailableProvider::new("no key");
        let result = provider.generate(&ProviderRequest::json("s", "u")).await;
        assert!(matches!(result, Err(AdvisorError::ProviderError(_))));
    }

    #[tokio::test]
    async fn test_timeout_is_failure() {
        let result = generate_within(
            &SlowProvider,
            &ProviderRequest::json("s", "u"),
            Duration::from_millis(20),
        )
        .await;
        assert!(matches!(result, Err(AdvisorError::ProviderTimeout(_))));
    }
}
