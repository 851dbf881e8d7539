//! Regime recommendation on top of a computed comparison
//!
//! The provider only phrases the recommendation; the numbers always come
//! from the engine. Provider failure yields a deterministic sentence.

use super::{compare_regimes, RegimeComparison, TaxRegime};
use crate::error::AdvisorError;
use crate::facts::format_inr;
use crate::provider::{generate_within, parse_json_payload, ProviderRequest, TextProvider};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::DEFAULT_PROVIDER_TIMEOUT_SECS;

const TAX_SYSTEM_PROMPT: &str = "You are a helpful tax assistant. Based on the tax calculation you are given, provide a concise, one-sentence recommendation about which regime is more beneficial and by how much. Use only the figures provided. Return a JSON object with a single key \"recommendation\".";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AdviceSource {
    Provider,
    Fallback,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaxAdvice {
    pub recommendation: String,
    pub regime: TaxRegime,
    pub savings: u64,
    pub source: AdviceSource,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaxReport {
    pub comparison: RegimeComparison,
    pub advice: TaxAdvice,
}

#[derive(Debug, Deserialize)]
struct RecommendationPayload {
    recommendation: String,
}

pub struct TaxAdvisor {
    provider: Arc<dyn TextProvider>,
    provider_timeout: Duration,
}

impl TaxAdvisor {
    pub fn new(provider: Arc<dyn TextProvider>) -> Self {
        Self {
            provider,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    /// Compute both regimes and attach a recommendation
    pub async fn report(&self, income: f64, deductions: f64, hra_exemption: f64) -> TaxReport {
        let comparison = compare_regimes(income, deductions, hra_exemption);
        let advice = self.recommend(income, deductions + hra_exemption, &comparison).await;
        TaxReport { comparison, advice }
    }

    pub async fn recommend(
        &self,
        income: f64,
        deductions: f64,
        comparison: &RegimeComparison,
    ) -> TaxAdvice {
        let user_prompt = format!(
            "- Gross Income: {}\n- Total Deductions: {}\n- Tax under Old Regime: {}\n- Tax under New Regime: {}",
            income,
            deductions,
            comparison.old_regime.total_tax,
            comparison.new_regime.total_tax,
        );
        let request = ProviderRequest::json(TAX_SYSTEM_PROMPT, user_prompt);

        let parsed = generate_within(self.provider.as_ref(), &request, self.provider_timeout)
            .await
            .and_then(|raw| parse_json_payload::<RecommendationPayload>(&raw))
            .and_then(|payload| {
                if payload.recommendation.trim().is_empty() {
                    Err(AdvisorError::InvalidPayload("empty recommendation".to_string()))
                } else {
                    Ok(payload.recommendation)
                }
            });

        match parsed {
            Ok(recommendation) => {
                info!(regime = ?comparison.recommended, "Tax recommendation from provider");
                TaxAdvice {
                    recommendation,
                    regime: comparison.recommended,
                    savings: comparison.savings,
                    source: AdviceSource::Provider,
                }
            }
            Err(e) => {
                warn!(error = %e, "Tax advice provider failed; using deterministic recommendation");
                fallback_advice(comparison)
            }
        }
    }
}

pub fn fallback_advice(comparison: &RegimeComparison) -> TaxAdvice {
    let recommendation = if comparison.savings == 0 {
        "Both regimes result in the same tax; the New Regime is the default and needs no deduction proofs.".to_string()
    } else {
        format!(
            "The {} seems more beneficial for you, saving you ₹{}.",
            comparison.recommended,
            format_inr(comparison.savings)
        )
    };

    TaxAdvice {
        recommendation,
        regime: comparison.recommended,
        savings: comparison.savings,
        source: AdviceSource::Fallback,
    }
}
