//! Keyword-overlap retrieval over the knowledge base
//!
//! similarity = (query terms found as substrings of the lowercased content)
//!            / (query term count)
//!
//! Repeated query terms count each time they appear.

use crate::knowledge::KnowledgeBase;
use crate::models::{RetrievalResult, RetrievedDoc};

/// Lowercase, whitespace-delimited query terms
pub fn tokenize(question: &str) -> Vec<String> {
    question
        .split_whitespace()
        .map(str::to_lowercase)
        .collect()
}

/// Fraction of `terms` occurring in `content`. Empty `terms` scores zero.
pub fn similarity(terms: &[String], content: &str) -> f64 {
    if terms.is_empty() {
        return 0.0;
    }

    let content = content.to_lowercase();
    let matches = terms
        .iter()
        .filter(|term| content.contains(term.as_str()))
        .count();

    matches as f64 / terms.len() as f64
}

/// Documents with similarity > 0, best first. Ties keep corpus order.
pub fn retrieve(kb: &KnowledgeBase, question: &str) -> Vec<RetrievedDoc> {
    let terms = tokenize(question);

    let mut hits: Vec<RetrievedDoc> = kb
        .docs()
        .iter()
        .filter_map(|doc| {
            let score = similarity(&terms, &doc.content);
            (score > 0.0).then(|| RetrievedDoc {
                doc: doc.clone(),
                similarity: score,
            })
        })
        .collect();

    // sort_by is stable
    hits.sort_by(|a, b| b.similarity.total_cmp(&a.similarity));
    hits
}

/// Header-only view of a retrieval, as returned to clients
pub fn to_results(hits: &[RetrievedDoc]) -> Vec<RetrievalResult> {
    hits.iter().map(RetrievedDoc::to_source).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::KnowledgeDoc;

    fn doc(id: &str, content: &str) -> KnowledgeDoc {
        KnowledgeDoc {
            doc_id: id.to_string(),
            title: format!("Title {}", id),
            content: content.to_string(),
            source_url: format!("https://example.org/{}", id),
            trust_score: 0.7,
        }
    }

    fn corpus() -> KnowledgeBase {
        KnowledgeBase::from_docs(vec![
            doc("a", "Health insurance covers hospital bills."),
            doc("b", "Term Insurance gives a large life COVER for a small premium."),
            doc("c", "PPF is a long term savings scheme."),
            doc("d", "Mutual funds and SIPs."),
            doc("e", "Buy term insurance early."),
        ])
        .unwrap()
    }

    #[test]
    fn test_full_match_and_exclusion() {
        let hits = retrieve(&corpus(), "term insurance cover");

        assert_eq!(hits[0].doc.doc_id, "b");
        assert_eq!(hits[0].similarity, 1.0);
        assert!(hits.iter().all(|h| h.doc.doc_id != "d"));
    }

    #[test]
    fn test_descending_with_stable_ties() {
        let hits = retrieve(&corpus(), "term insurance cover");
        let ids: Vec<&str> = hits.iter().map(|h| h.doc.doc_id.as_str()).collect();

        // "a" matches insurance + cover(s); "e" matches term + insurance; "c" matches term
        assert_eq!(ids, vec!["b", "a", "e", "c"]);
        assert!(hits.windows(2).all(|w| w[0].similarity >= w[1].similarity));
    }

    #[test]
    fn test_substring_semantics() {
        assert_eq!(similarity(&tokenize("Insur"), "Insurance"), 1.0);
        assert_eq!(similarity(&tokenize("cover"), "Term covers"), 1.0);
        assert_eq!(similarity(&tokenize("insure"), "Insurance"), 0.0);
        assert_eq!(similarity(&tokenize("a b c d"), "a c"), 0.5);
    }

    #[test]
    fn test_empty_query_matches_nothing() {
        assert!(tokenize("   \t ").is_empty());
        assert!(retrieve(&corpus(), "   ").is_empty());
    }

    #[test]
    fn test_to_results_keeps_scores() {
        let hits = retrieve(&corpus(), "mutual funds");
        let results = to_results(&hits);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].doc_id, "d");
        assert_eq!(results[0].url, "https://example.org/d");
        assert_eq!(results[0].similarity, 1.0);
    }
}
