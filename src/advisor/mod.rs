//! Advice orchestrator
//!
//! PROFILE → FACTS → RETRIEVE → PROMPT → PROVIDER (once) → RESOLVE
//!
//! Provider failures never reach the caller: every path ends in a
//! well-formed `AdviceResponse`.

use crate::facts::compute_facts;
use crate::knowledge::KnowledgeBase;
use crate::models::{AdviceRequest, AdviceResponse, AdviceState, Profile};
use crate::provider::{generate_within, TextProvider};
use crate::retrieval::retrieve;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub mod outcome;
pub mod prompt;

pub use outcome::{ProviderAdvice, ProviderOutcome, FALLBACK_CONFIDENCE, FALLBACK_REPLY};
pub use prompt::REFUSAL_SENTENCE;

use crate::config::{DEFAULT_MAX_PROMPT_DOCS, DEFAULT_PROVIDER_TIMEOUT_SECS};

pub struct AdviceOrchestrator {
    knowledge_base: Arc<KnowledgeBase>,
    provider: Arc<dyn TextProvider>,
    provider_timeout: Duration,
    max_prompt_docs: usize,
}

impl AdviceOrchestrator {
    pub fn new(knowledge_base: Arc<KnowledgeBase>, provider: Arc<dyn TextProvider>) -> Self {
        Self {
            knowledge_base,
            provider,
            provider_timeout: Duration::from_secs(DEFAULT_PROVIDER_TIMEOUT_SECS),
            max_prompt_docs: DEFAULT_MAX_PROMPT_DOCS,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.provider_timeout = timeout;
        self
    }

    pub fn with_max_prompt_docs(mut self, max_prompt_docs: usize) -> Self {
        self.max_prompt_docs = max_prompt_docs.max(1);
        self
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.knowledge_base
    }

    /// Facts plus the top retrieved documents for a question
    pub fn prepare(
        &self,
        question: &str,
        profile: &Profile,
        document_facts: Option<serde_json::Value>,
    ) -> AdviceRequest {
        let mut retrieved_docs = retrieve(&self.knowledge_base, question);
        retrieved_docs.truncate(self.max_prompt_docs);

        if retrieved_docs.is_empty() {
            debug!("No knowledge-base document matched the question");
        }

        AdviceRequest {
            question: question.to_string(),
            profile: profile.clone(),
            computed_facts: compute_facts(profile),
            retrieved_docs,
            document_facts,
        }
    }

    pub async fn get_advice(&self, question: &str, profile: &Profile) -> AdviceResponse {
        self.get_advice_with_document(question, profile, None).await
    }

    /// As `get_advice`, with facts extracted from an uploaded document
    pub async fn get_advice_with_document(
        &self,
        question: &str,
        profile: &Profile,
        document_facts: Option<serde_json::Value>,
    ) -> AdviceResponse {
        let request = self.prepare(question, profile, document_facts);
        self.advise(&request).await
    }

    /// One provider attempt, then resolution. Never fails.
    pub async fn advise(&self, request: &AdviceRequest) -> AdviceResponse {
        let fingerprint = request.fingerprint();
        let start = Instant::now();

        debug!(
            request = %fingerprint,
            state = ?AdviceState::Pending,
            doc_count = request.retrieved_docs.len(),
            "Advice request prepared"
        );

        let provider_request = prompt::build_provider_request(request);

        debug!(
            request = %fingerprint,
            state = ?AdviceState::ProviderCalled,
            provider = self.provider.name(),
            "Calling provider"
        );

        let raw = generate_within(
            self.provider.as_ref(),
            &provider_request,
            self.provider_timeout,
        )
        .await;
        let outcome = ProviderOutcome::from_raw(raw);

        if let ProviderOutcome::ProviderFailed(reason) = &outcome {
            warn!(
                request = %fingerprint,
                provider = self.provider.name(),
                %reason,
                "Provider failed; answering with deterministic fallback"
            );
        }

        let response = outcome::resolve(request, &outcome);

        info!(
            request = %fingerprint,
            state = ?outcome.terminal_state(),
            confidence = response.confidence,
            source_count = response.sources.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Advice completed"
        );

        response
    }
}
