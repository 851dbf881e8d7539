//! Core data models for the advisory service

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fmt;
use uuid::Uuid;

//
// ================= Enums =================
//

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "kebab-case")]
pub enum FinancialGoal {
    TermInsurance,
    Investment,
    TaxSaving,
    Retirement,
}

impl FinancialGoal {
    pub const ALL: [FinancialGoal; 4] = [
        FinancialGoal::TermInsurance,
        FinancialGoal::Investment,
        FinancialGoal::TaxSaving,
        FinancialGoal::Retirement,
    ];

    pub fn slug(&self) -> &'static str {
        match self {
            FinancialGoal::TermInsurance => "term-insurance",
            FinancialGoal::Investment => "investment",
            FinancialGoal::TaxSaving => "tax-saving",
            FinancialGoal::Retirement => "retirement",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let value = value.trim();
        Self::ALL
            .into_iter()
            .find(|goal| goal.slug().eq_ignore_ascii_case(value))
    }
}

impl fmt::Display for FinancialGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            FinancialGoal::TermInsurance => "Term Insurance",
            FinancialGoal::Investment => "Wealth Creation",
            FinancialGoal::TaxSaving => "Tax Saving",
            FinancialGoal::Retirement => "Retirement Planning",
        };
        write!(f, "{}", s)
    }
}

/// Per-request advice lifecycle
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AdviceState {
    Pending,
    ProviderCalled,
    Succeeded,
    FailedFallback,
}

//
// ================= Profile =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Profile {
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub monthly_income: f64,
    pub annual_income: f64,
    pub dependents: u32,
    pub goal: FinancialGoal,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    pub fn new(
        name: String,
        age: u32,
        monthly_income: f64,
        dependents: u32,
        goal: FinancialGoal,
    ) -> Self {
        Self {
            user_id: format!("user_{}", Uuid::new_v4().simple()),
            name,
            age,
            monthly_income,
            annual_income: monthly_income * 12.0,
            dependents,
            goal,
            created_at: Utc::now(),
        }
    }
}

//
// ================= Knowledge Base =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeDoc {
    pub doc_id: String,
    pub title: String,
    pub content: String,
    pub source_url: String,
    pub trust_score: f64,
}

/// A knowledge-base document paired with its query similarity
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RetrievedDoc {
    #[serde(flatten)]
    pub doc: KnowledgeDoc,
    pub similarity: f64,
}

impl RetrievedDoc {
    pub fn to_source(&self) -> RetrievalResult {
        RetrievalResult {
            doc_id: self.doc.doc_id.clone(),
            title: self.doc.title.clone(),
            url: self.doc.source_url.clone(),
            similarity: self.similarity,
        }
    }

    /// Source record scored by the document's static trust score
    pub fn to_trusted_source(&self) -> RetrievalResult {
        RetrievalResult {
            similarity: self.doc.trust_score,
            ..self.to_source()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RetrievalResult {
    pub doc_id: String,
    pub title: String,
    pub url: String,
    pub similarity: f64,
}

//
// ================= Advice =================
//

/// Deterministic rule-based estimates, keyed by display label
pub type ComputedFacts = BTreeMap<String, String>;

#[derive(Debug, Clone, Serialize)]
pub struct AdviceRequest {
    pub question: String,
    pub profile: Profile,
    pub computed_facts: ComputedFacts,
    pub retrieved_docs: Vec<RetrievedDoc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_facts: Option<serde_json::Value>,
}

impl AdviceRequest {
    /// Stable SHA256 over the request contents, used to correlate log lines
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        match serde_json::to_vec(self) {
            Ok(bytes) => hasher.update(&bytes),
            Err(_) => return String::new(),
        }
        hex::encode(&hasher.finalize()[..8])
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdviceResponse {
    pub reply: String,
    pub confidence: f64,
    pub sources: Vec<RetrievalResult>,
}

//
// ================= Documents =================
//

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DocumentAnalysis {
    pub document_type: String,
    pub extracted_data: serde_json::Value,
    pub summary: String,
}
