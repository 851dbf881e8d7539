//! Financial document analysis (bills, payslips, receipts)
//!
//! The image travels to the provider as an inline attachment; the reply is
//! parsed into a `DocumentAnalysis`. Unlike advice, there is no canned
//! answer for a document, so failures are returned to the caller.

use crate::error::AdvisorError;
use crate::models::DocumentAnalysis;
use crate::provider::{generate_within, parse_json_payload, InlineData, ProviderRequest, TextProvider};
use crate::Result;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

use crate::config::DEFAULT_PROVIDER_TIMEOUT_SECS;

const ANALYSIS_PROMPT: &str = r#"You are an expert financial document analyst. Analyze the attached image of a document and extract structured information.

Identify the document type, extract all relevant key-value pairs into a JSON object, and provide a concise one-sentence summary.

- For an invoice or bill, extract fields like 'Invoice Number', 'Vendor Name', 'Total Amount', 'Due Date', and a list of line items.
- For a salary slip, extract 'Employee Name', 'Gross Salary', 'Net Salary', 'Deductions', and a breakdown of earnings.
- For a generic receipt, extract 'Store Name', 'Total Amount', 'Date', and items purchased.

Respond with a JSON object with keys "document_type" (string), "extracted_data" (object) and "summary" (string)."#;

/// Split `data:<mime>;base64,<payload>` into its parts
pub fn parse_data_uri(uri: &str) -> Result<InlineData> {
    let rest = uri
        .trim()
        .strip_prefix("data:")
        .ok_or_else(|| AdvisorError::InvalidDocument("expected a data: URI".to_string()))?;

    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| AdvisorError::InvalidDocument("missing data URI payload".to_string()))?;

    let mime_type = header
        .strip_suffix(";base64")
        .ok_or_else(|| AdvisorError::InvalidDocument("data URI must be base64 encoded".to_string()))?
        .to_lowercase();

    if !(mime_type.starts_with("image/") || mime_type == "application/pdf") {
        return Err(AdvisorError::InvalidDocument(format!(
            "unsupported mime type '{}'",
            mime_type
        )));
    }

    let payload = payload.trim();
    if payload.is_empty() {
        return Err(AdvisorError::InvalidDocument("empty document payload".to_string()));
    }

    Ok(InlineData {
        mime_type,
        data: payload.to_string(),
    })
}

pub struct DocumentAnalyzer {
    provider: Arc<dyn TextProvider>,
    provider_timeout: Duration,
}

impl DocumentAnalyzer {
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

    pub async fn analyze(&self, document_uri: &str) -> Result<DocumentAnalysis> {
        let attachment = parse_data_uri(document_uri)?;
        info!(mime_type = %attachment.mime_type, "Analyzing document");

        let request = ProviderRequest::json(ANALYSIS_PROMPT, "Analyze the attached document.")
            .with_attachment(attachment);

        let raw = generate_within(self.provider.as_ref(), &request, self.provider_timeout).await?;
        let analysis: DocumentAnalysis = parse_json_payload(&raw)?;

        if !analysis.extracted_data.is_object() {
            return Err(AdvisorError::InvalidPayload(
                "extracted_data must be a JSON object".to_string(),
            ));
        }

        info!(document_type = %analysis.document_type, "Document analyzed");
        Ok(analysis)
    }
}
