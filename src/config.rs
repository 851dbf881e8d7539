//! Runtime configuration from the environment (`.env` is loaded by the binaries)

use crate::error::AdvisorError;
use crate::provider::gemini::DEFAULT_GEMINI_MODEL;
use crate::provider::groq::{DEFAULT_GROQ_BASE_URL, DEFAULT_GROQ_MODEL};
use crate::provider::{GeminiClient, GroqClient, TextProvider, UnavailableProvider};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_PROVIDER_TIMEOUT_SECS: u64 = 20;
pub const DEFAULT_MAX_PROMPT_DOCS: usize = 5;
pub const DEFAULT_KNOWLEDGE_BASE_PATH: &str = "data/seed_kb.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Gemini,
    Groq,
}

impl ProviderKind {
    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "gemini" | "google" => Some(ProviderKind::Gemini),
            "groq" => Some(ProviderKind::Groq),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdvisorConfig {
    pub provider: ProviderKind,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub groq_api_key: Option<String>,
    pub groq_model: String,
    pub groq_base_url: String,
    pub provider_timeout: Duration,
    pub knowledge_base_path: String,
    pub max_prompt_docs: usize,
    pub port: u16,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            provider: ProviderKind::Groq,
            gemini_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            groq_api_key: None,
            groq_model: DEFAULT_GROQ_MODEL.to_string(),
            groq_base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            knowledge_base_path: DEFAULT_KNOWLEDGE_BASE_PATH.to_string(),
            max_prompt_docs: DEFAULT_MAX_PROMPT_DOCS,
            port: DEFAULT_PORT,
        }
    }
}

impl AdvisorConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; blank values count as unset
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let gemini_api_key = get("GEMINI_API_KEY");
        let groq_api_key = get("GROQ_API_KEY");

        let provider = match get("ADVISOR_PROVIDER") {
            Some(raw) => ProviderKind::parse(&raw).ok_or_else(|| {
                AdvisorError::ConfigError(format!("unknown ADVISOR_PROVIDER '{}'", raw))
            })?,
            // prefer whichever key is present
            None if groq_api_key.is_none() && gemini_api_key.is_some() => ProviderKind::Gemini,
            None => ProviderKind::Groq,
        };

        let provider_timeout = match get("PROVIDER_TIMEOUT_SECS") {
            Some(raw) => Duration::from_secs(parse_number(&raw, "PROVIDER_TIMEOUT_SECS")?),
            None => defaults.provider_timeout,
        };

        let max_prompt_docs = match get("MAX_PROMPT_DOCS") {
            Some(raw) => parse_number(&raw, "MAX_PROMPT_DOCS")?,
            None => defaults.max_prompt_docs,
        };
        if max_prompt_docs == 0 {
            return Err(AdvisorError::ConfigError(
                "MAX_PROMPT_DOCS must be at least 1".to_string(),
            ));
        }

        let port = match get("PORT").or_else(|| get("API_PORT")) {
            Some(raw) => parse_number(&raw, "PORT")?,
            None => defaults.port,
        };

        Ok(Self {
            provider,
            gemini_api_key,
            gemini_model: get("GEMINI_MODEL").unwrap_or(defaults.gemini_model),
            groq_api_key,
            groq_model: get("GROQ_MODEL").unwrap_or(defaults.groq_model),
            groq_base_url: get("GROQ_BASE_URL").unwrap_or(defaults.groq_base_url),
            provider_timeout,
            knowledge_base_path: get("KNOWLEDGE_BASE_PATH").unwrap_or(defaults.knowledge_base_path),
            max_prompt_docs,
            port,
        })
    }

    /// Instantiate the configured provider. Without a key every call fails
    /// and callers answer deterministically.
    pub fn build_provider(&self) -> Result<Arc<dyn TextProvider>> {
        let provider: Arc<dyn TextProvider> = match self.provider {
            ProviderKind::Gemini => match &self.gemini_api_key {
                Some(key) => Arc::new(GeminiClient::new(key.clone(), &self.gemini_model)?),
                None => {
                    warn!("GEMINI_API_KEY not set; using deterministic fallback only");
                    Arc::new(UnavailableProvider::new("GEMINI_API_KEY not configured"))
                }
            },
            ProviderKind::Groq => match &self.groq_api_key {
                Some(key) => Arc::new(GroqClient::with_base_url(
                    key.clone(),
                    &self.groq_model,
                    &self.groq_base_url,
                )?),
                None => {
                    warn!("GROQ_API_KEY not set; using deterministic fallback only");
                    Arc::new(UnavailableProvider::new("GROQ_API_KEY not configured"))
                }
            },
        };

        Ok(provider)
    }
}

fn parse_number<T: std::str::FromStr>(raw: &str, key: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| AdvisorError::ConfigError(format!("{} must be a number, got '{}'", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(pairs: &[(&str, &str)]) -> Result<AdvisorConfig> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AdvisorConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();
        assert_eq!(config.provider, ProviderKind::Groq);
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.provider_timeout, Duration::from_secs(20));
        assert_eq!(config.max_prompt_docs, DEFAULT_MAX_PROMPT_DOCS);
    }

    #[test]
    fn test_provider_selection() {
        let gemini_only = config_from(&[("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(gemini_only.provider, ProviderKind::Gemini);

        let explicit = config_from(&[("ADVISOR_PROVIDER", "GROQ"), ("GEMINI_API_KEY", "g")]).unwrap();
        assert_eq!(explicit.provider, ProviderKind::Groq);

        assert!(config_from(&[("ADVISOR_PROVIDER", "openai")]).is_err());
    }

    #[test]
    fn test_numeric_overrides() {
        let config = config_from(&[
            ("PROVIDER_TIMEOUT_SECS", "7"),
            ("MAX_PROMPT_DOCS", "3"),
            ("API_PORT", "9090"),
            ("PORT", " "),
        ])
        .unwrap();
        assert_eq!(config.provider_timeout, Duration::from_secs(7));
        assert_eq!(config.max_prompt_docs, 3);
        assert_eq!(config.port, 9090);

        assert!(config_from(&[("PORT", "eighty")]).is_err());
    }

    #[test]
    fn test_zero_prompt_docs_rejected() {
        assert!(matches!(
            config_from(&[("MAX_PROMPT_DOCS", "0")]),
            Err(AdvisorError::ConfigError(_))
        ));
    }

    #[tokio::test]
    async fn test_missing_key_builds_unavailable_provider() {
        let config = config_from(&[("ADVISOR_PROVIDER", "gemini")]).unwrap();
        let provider = config.build_provider().unwrap();
        assert_eq!(provider.name(), "unavailable");
    }
}
