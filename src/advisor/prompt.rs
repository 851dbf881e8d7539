//! Prompt construction for grounded advice

use crate::models::AdviceRequest;
use crate::provider::ProviderRequest;

/// Sentence the model must use when nothing supplied supports an answer
pub const REFUSAL_SENTENCE: &str =
    "I'm sorry, but I don't have a verified source of information to answer that question.";

const SYSTEM_RULES: &str = r#"You are a conservative, professional Indian financial advisor. Your primary directive is to use ONLY the provided facts and documents to answer user questions. Do NOT invent policy wording, financial figures, or legal sections.

You MUST follow these rules:
1. Source citations are mandatory. At the end of each statement that uses information from a document, cite the document's index in brackets, like this [0].
2. Answer only from the provided context. If the documents or computed facts do not contain the information to answer the question, reply exactly: "{REFUSAL}"
3. Be direct and clear. Present information in a structured way using markdown.
4. If document facts from a user upload are present, prioritise them over general knowledge-base material.
5. Treat computed facts as ground truth for any figures.

Respond with a single JSON object with exactly these keys:
- "reply": string, your answer
- "confidence": number between 0.0 and 1.0
- "source_indices": array of integers, the index of every document you cited"#;

pub fn system_prompt() -> String {
    SYSTEM_RULES.replace("{REFUSAL}", REFUSAL_SENTENCE)
}

/// Render profile, facts and the supplied documents (tagged `[i]`) plus the question
pub fn context_prompt(request: &AdviceRequest) -> String {
    let profile = &request.profile;
    let mut out = String::new();

    out.push_str("User profile:\n");
    out.push_str(&format!("- Age: {}\n", profile.age));
    out.push_str(&format!("- Annual income: {}\n", profile.annual_income));
    out.push_str(&format!("- Dependents: {}\n", profile.dependents));
    out.push_str(&format!("- Goal: {}\n\n", profile.goal));

    out.push_str("Computed facts:\n");
    if request.computed_facts.is_empty() {
        out.push_str("(none)\n");
    }
    for (label, value) in &request.computed_facts {
        out.push_str(&format!("- {}: {}\n", label, value));
    }
    out.push('\n');

    if let Some(document_facts) = &request.document_facts {
        out.push_str("Document facts (from the user's uploaded document):\n");
        out.push_str(&document_facts.to_string());
        out.push_str("\n\n");
    }

    out.push_str("Retrieved documents:\n");
    if request.retrieved_docs.is_empty() {
        out.push_str(
            "(no documents matched; if the computed facts do not answer the question, use the refusal sentence)\n",
        );
    }
    for (index, retrieved) in request.retrieved_docs.iter().enumerate() {
        out.push_str(&format!(
            "[{}] Title: {}\nContent: {}\nSource URL: {}\n\n",
            index, retrieved.doc.title, retrieved.doc.content, retrieved.doc.source_url
        ));
    }

    out.push_str(&format!("\nUser Question: {}", request.question));
    out
}

pub fn build_provider_request(request: &AdviceRequest) -> ProviderRequest {
    ProviderRequest::json(system_prompt(), context_prompt(request))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facts::compute_facts;
    use crate::models::{FinancialGoal, KnowledgeDoc, Profile, RetrievedDoc};

    fn request(docs: Vec<RetrievedDoc>) -> AdviceRequest {
        let profile = Profile::new(
            "Ravi".to_string(),
            35,
            80_000.0,
            1,
            FinancialGoal::TaxSaving,
        );
        AdviceRequest {
            question: "How much 80C can I claim?".to_string(),
            computed_facts: compute_facts(&profile),
            profile,
            retrieved_docs: docs,
            document_facts: None,
        }
    }

    #[test]
    fn test_documents_tagged_by_index() {
        let docs = ["first", "second"]
            .iter()
            .map(|t| RetrievedDoc {
                doc: KnowledgeDoc {
                    doc_id: t.to_string(),
                    title: format!("{} title", t),
                    content: format!("{} content", t),
                    source_url: format!("https://example.org/{}", t),
                    trust_score: 0.5,
                },
                similarity: 0.5,
            })
            .collect();

        let prompt = context_prompt(&request(docs));
        assert!(prompt.contains("[0] Title: first title"));
        assert!(prompt.contains("[1] Title: second title"));
        assert!(prompt.contains("- Goal: Tax Saving"));
        assert!(prompt.ends_with("User Question: How much 80C can I claim?"));
    }

    #[test]
    fn test_empty_retrieval_mentions_refusal() {
        let prompt = context_prompt(&request(vec![]));
        assert!(prompt.contains("no documents matched"));
        assert!(system_prompt().contains(REFUSAL_SENTENCE));
    }

    #[test]
    fn test_document_facts_rendered() {
        let mut req = request(vec![]);
        req.document_facts = Some(serde_json::json!({"Gross Salary": "95,000"}));
        assert!(context_prompt(&req).contains("Gross Salary"));
        assert!(build_provider_request(&req).json_response);
    }
}
