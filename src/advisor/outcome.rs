//! Provider outcome and its resolution into a final response
//!
//! `resolve` is pure: the same request and outcome always yield the same
//! response, and sources are only ever taken from the request.

use crate::error::AdvisorError;
use crate::models::{AdviceRequest, AdviceResponse, AdviceState, RetrievalResult};
use crate::provider::parse_json_payload;
use crate::Result;
use serde::Deserialize;

pub const FALLBACK_REPLY: &str = "I am sorry, the AI service is currently unavailable. Based on your profile and available information, here's a deterministic recommendation: Consider a term insurance plan with coverage of 10x your annual income.";
pub const FALLBACK_CONFIDENCE: f64 = 0.5;

/// Strict schema for the provider's JSON payload
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProviderAdvice {
    pub reply: String,
    pub confidence: f64,
    #[serde(alias = "sourceIndices")]
    pub source_indices: Vec<i64>,
}

impl ProviderAdvice {
    pub fn parse(raw: &str) -> Result<Self> {
        let advice: ProviderAdvice = parse_json_payload(raw)?;

        if advice.reply.trim().is_empty() {
            return Err(AdvisorError::InvalidPayload("empty reply".to_string()));
        }
        if !advice.confidence.is_finite() || !(0.0..=1.0).contains(&advice.confidence) {
            return Err(AdvisorError::InvalidPayload(format!(
                "confidence {} outside [0, 1]",
                advice.confidence
            )));
        }

        Ok(advice)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ProviderOutcome {
    Succeeded(ProviderAdvice),
    ProviderFailed(String),
}

impl ProviderOutcome {
    pub fn from_raw(raw: Result<String>) -> Self {
        match raw.and_then(|text| ProviderAdvice::parse(&text)) {
            Ok(advice) => ProviderOutcome::Succeeded(advice),
            Err(e) => ProviderOutcome::ProviderFailed(e.to_string()),
        }
    }

    pub fn terminal_state(&self) -> AdviceState {
        match self {
            ProviderOutcome::Succeeded(_) => AdviceState::Succeeded,
            ProviderOutcome::ProviderFailed(_) => AdviceState::FailedFallback,
        }
    }
}

/// Cited indices mapped to source records. Out-of-range (or negative)
/// indices are dropped and repeats keep their first position.
pub fn map_sources(request: &AdviceRequest, indices: &[i64]) -> Vec<RetrievalResult> {
    let mut used = vec![false; request.retrieved_docs.len()];

    indices
        .iter()
        .filter_map(|&index| usize::try_from(index).ok())
        .filter_map(|index| {
            let retrieved = request.retrieved_docs.get(index)?;
            if std::mem::replace(&mut used[index], true) {
                None
            } else {
                Some(retrieved.to_source())
            }
        })
        .collect()
}

/// Canned response citing every supplied document by trust score
pub fn fallback_response(request: &AdviceRequest) -> AdviceResponse {
    AdviceResponse {
        reply: FALLBACK_REPLY.to_string(),
        confidence: FALLBACK_CONFIDENCE,
        sources: request
            .retrieved_docs
            .iter()
            .map(|retrieved| retrieved.to_trusted_source())
            .collect(),
    }
}

pub fn resolve(request: &AdviceRequest, outcome: &ProviderOutcome) -> AdviceResponse {
    match outcome {
        ProviderOutcome::Succeeded(advice) => AdviceResponse {
            reply: advice.reply.clone(),
            confidence: advice.confidence,
            sources: map_sources(request, &advice.source_indices),
        },
        ProviderOutcome::ProviderFailed(_) => fallback_response(request),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{FinancialGoal, KnowledgeDoc, Profile, RetrievedDoc};
    use std::collections::BTreeMap;

    fn request_with(n: usize) -> AdviceRequest {
        let retrieved_docs = (0..n)
            .map(|i| RetrievedDoc {
                doc: KnowledgeDoc {
                    doc_id: format!("kb{}", i),
                    title: format!("Doc {}", i),
                    content: "term insurance".to_string(),
                    source_url: format!("https://example.org/{}", i),
                    trust_score: 0.9 - i as f64 * 0.1,
                },
                similarity: 1.0 - i as f64 * 0.25,
            })
            .collect();

        AdviceRequest {
            question: "term insurance".to_string(),
            profile: Profile::new(
                "Meera".to_string(),
                28,
                60_000.0,
                0,
                FinancialGoal::TermInsurance,
            ),
            computed_facts: BTreeMap::new(),
            retrieved_docs,
            document_facts: None,
        }
    }

    #[test]
    fn test_out_of_range_indices_dropped() {
        let request = request_with(2);
        let sources = map_sources(&request, &[0, 5]);
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].doc_id, "kb0");
        assert_eq!(sources[0].similarity, 1.0);
    }

    #[test]
    fn test_negative_and_repeated_indices() {
        let request = request_with(3);
        let sources = map_sources(&request, &[2, -1, 2, 0]);
        let ids: Vec<&str> = sources.iter().map(|s| s.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["kb2", "kb0"]);
    }

    #[test]
    fn test_fallback_uses_trust_scores_in_supplied_order() {
        let request = request_with(3);
        let response = fallback_response(&request);

        assert_eq!(response.confidence, 0.5);
        assert_eq!(response.reply, FALLBACK_REPLY);
        let ids: Vec<&str> = response.sources.iter().map(|s| s.doc_id.as_str()).collect();
        assert_eq!(ids, vec!["kb0", "kb1", "kb2"]);
        assert_eq!(response.sources[0].similarity, 0.9);
    }

    #[test]
    fn test_parse_validates_schema() {
        let ok = ProviderAdvice::parse(r#"{"reply":"Cover 10x [0]","confidence":0.8,"source_indices":[0]}"#)
            .unwrap();
        assert_eq!(ok.source_indices, vec![0]);

        let camel = ProviderAdvice::parse(r#"{"reply":"x","confidence":0.1,"sourceIndices":[]}"#);
        assert!(camel.is_ok());

        for bad in [
            "",
            "not json",
            r#"{"reply":"","confidence":0.5,"source_indices":[]}"#,
            r#"{"reply":"x","confidence":1.5,"source_indices":[]}"#,
            r#"{"reply":"x","confidence":0.5}"#,
        ] {
            assert!(ProviderAdvice::parse(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_outcome_from_raw() {
        let failed = ProviderOutcome::from_raw(Err(AdvisorError::ProviderError("down".into())));
        assert_eq!(failed.terminal_state(), AdviceState::FailedFallback);

        let garbage = ProviderOutcome::from_raw(Ok("{}".to_string()));
        assert_eq!(garbage.terminal_state(), AdviceState::FailedFallback);

        let ok = ProviderOutcome::from_raw(Ok(
            r#"{"reply":"ok","confidence":0.7,"source_indices":[1]}"#.to_string(),
        ));
        assert_eq!(ok.terminal_state(), AdviceState::Succeeded);

        let request = request_with(2);
        let response = resolve(&request, &ok);
        assert_eq!(response.reply, "ok");
        assert_eq!(response.sources[0].doc_id, "kb1");
    }
}
