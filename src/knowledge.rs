//! Static knowledge base
//!
//! Loaded once at startup and shared read-only. There is no write path.

use crate::error::AdvisorError;
use crate::models::KnowledgeDoc;
use crate::Result;
use std::collections::HashSet;
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct KnowledgeBase {
    docs: Vec<KnowledgeDoc>,
}

impl KnowledgeBase {
    /// Build from documents, rejecting duplicate ids and out-of-range trust scores
    pub fn from_docs(docs: Vec<KnowledgeDoc>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(docs.len());
        for doc in &docs {
            if !seen.insert(doc.doc_id.as_str()) {
                return Err(AdvisorError::KnowledgeBaseError(format!(
                    "duplicate doc_id {}",
                    doc.doc_id
                )));
            }
            if !(0.0..=1.0).contains(&doc.trust_score) {
                return Err(AdvisorError::KnowledgeBaseError(format!(
                    "trust_score {} of {} outside [0, 1]",
                    doc.trust_score, doc.doc_id
                )));
            }
        }
        drop(seen);

        Ok(Self { docs })
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let docs: Vec<KnowledgeDoc> = serde_json::from_str(json)?;
        Self::from_docs(docs)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AdvisorError::KnowledgeBaseError(format!("cannot read {}: {}", path.display(), e))
        })?;

        let kb = Self::from_json(&raw)?;
        info!(path = %path.display(), doc_count = kb.len(), "Knowledge base loaded");
        Ok(kb)
    }

    /// Documents in corpus order
    pub fn docs(&self) -> &[KnowledgeDoc] {
        &self.docs
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }
}
