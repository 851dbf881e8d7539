//! SmartKharcha Advisor
//!
//! A personal-finance advisory backend that:
//! - Validates lightweight user profiles
//! - Computes tax under the old and new Indian regimes (deterministic)
//! - Retrieves supporting snippets from a static knowledge base
//! - Asks one LLM provider for grounded, cited advice
//! - Falls back to a deterministic answer whenever the provider fails
//!
//! ADVICE FLOW:
//! PROFILE → FACTS → RETRIEVE → PROMPT → PROVIDER → RESOLVE

pub mod advisor;
pub mod api;
pub mod config;
pub mod documents;
pub mod error;
pub mod facts;
pub mod knowledge;
pub mod models;
pub mod profile;
pub mod provider;
pub mod retrieval;
pub mod tax;

pub use error::Result;

// Re-export common types
pub use models::*;
pub use advisor::AdviceOrchestrator;
pub use knowledge::KnowledgeBase;
pub use tax::{compute_tax, TaxComputation};
