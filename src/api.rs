//! REST API server for the advisory service
//!
//! Exposes profile creation, advice, tax comparison and document analysis.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::advisor::AdviceOrchestrator;
use crate::config::AdvisorConfig;
use crate::documents::DocumentAnalyzer;
use crate::error::{AdvisorError, FieldError};
use crate::knowledge::KnowledgeBase;
use crate::models::Profile;
use crate::profile::{check_profile, coerce_number, ProfileForm};
use crate::retrieval;
use crate::tax::TaxAdvisor;

/// =============================
/// Request Models
/// =============================

#[derive(Debug, Deserialize)]
pub struct AdviceApiRequest {
    pub question: String,
    pub profile: Profile,
    #[serde(default)]
    pub document_facts: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveApiRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct TaxApiRequest {
    #[serde(default)]
    pub income: Option<serde_json::Value>,
    #[serde(default)]
    pub deductions: Option<serde_json::Value>,
    #[serde(default)]
    pub hra_exemption: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
pub struct DocumentApiRequest {
    pub document_image: String,
}

/// =============================
/// Response Wrapper
/// =============================

#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse {
    pub success: bool,
    pub data: Option<serde_json::Value>,
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub field_errors: Vec<FieldError>,
    pub timestamp: String,
}

impl ApiResponse {
    pub fn success<T: Serialize>(data: T) -> Self {
        Self {
            success: true,
            data: serde_json::to_value(data).ok(),
            error: None,
            field_errors: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn error(message: String) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message),
            field_errors: Vec::new(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }

    pub fn from_error(err: &AdvisorError) -> Self {
        Self {
            field_errors: err.field_errors().map(<[FieldError]>::to_vec).unwrap_or_default(),
            ..Self::error(err.to_string())
        }
    }
}

type ApiResult = (StatusCode, Json<ApiResponse>);

fn ok<T: Serialize>(data: T) -> ApiResult {
    (StatusCode::OK, Json(ApiResponse::success(data)))
}

fn fail(err: AdvisorError) -> ApiResult {
    let status = match &err {
        AdvisorError::Validation(_) | AdvisorError::InvalidDocument(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        AdvisorError::ProviderError(_)
        | AdvisorError::InvalidPayload(_)
        | AdvisorError::HttpError(_) => StatusCode::BAD_GATEWAY,
        AdvisorError::ProviderTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ApiResponse::from_error(&err)))
}

/// Body that could not be decoded into the request type
fn rejected(rejection: JsonRejection) -> ApiResult {
    fail(AdvisorError::Validation(vec![FieldError::new(
        "body",
        rejection.body_text(),
    )]))
}

/// =============================
/// API State
/// =============================

#[derive(Clone)]
pub struct ApiState {
    pub advisor: Arc<AdviceOrchestrator>,
    pub tax_advisor: Arc<TaxAdvisor>,
    pub documents: Arc<DocumentAnalyzer>,
}

impl ApiState {
    pub fn from_config(config: &AdvisorConfig, knowledge_base: Arc<KnowledgeBase>) -> crate::Result<Self> {
        let provider = config.build_provider()?;

        Ok(Self {
            advisor: Arc::new(
                AdviceOrchestrator::new(knowledge_base, provider.clone())
                    .with_timeout(config.provider_timeout)
                    .with_max_prompt_docs(config.max_prompt_docs),
            ),
            tax_advisor: Arc::new(
                TaxAdvisor::new(provider.clone()).with_timeout(config.provider_timeout),
            ),
            documents: Arc::new(
                DocumentAnalyzer::new(provider).with_timeout(config.provider_timeout),
            ),
        })
    }
}

/// =============================
/// Health Endpoint
/// =============================

async fn health(State(state): State<ApiState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "knowledge_base_docs": state.advisor.knowledge_base().len(),
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

/// =============================
/// Profile Endpoint
/// =============================

async fn create_profile(payload: Result<Json<ProfileForm>, JsonRejection>) -> ApiResult {
    let Json(form) = match payload {
        Ok(form) => form,
        Err(rejection) => return rejected(rejection),
    };

    match form.validate() {
        Ok(profile) => {
            info!(user_id = %profile.user_id, goal = %profile.goal, "Profile created");
            ok(profile)
        }
        Err(e) => fail(e),
    }
}

/// =============================
/// Advice Endpoints
/// =============================

async fn advice_handler(
    State(state): State<ApiState>,
    payload: Result<Json<AdviceApiRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection),
    };
    if req.question.trim().is_empty() {
        return fail(AdvisorError::Validation(vec![FieldError::new(
            "question",
            "Question cannot be empty.",
        )]));
    }
    if let Err(e) = check_profile(&req.profile) {
        return fail(e);
    }

    info!(user_id = %req.profile.user_id, "Received advice request");

    let response = state
        .advisor
        .get_advice_with_document(req.question.trim(), &req.profile, req.document_facts)
        .await;
    ok(response)
}

async fn retrieve_handler(
    State(state): State<ApiState>,
    payload: Result<Json<RetrieveApiRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection),
    };
    let hits = retrieval::retrieve(state.advisor.knowledge_base(), &req.question);
    ok(retrieval::to_results(&hits))
}

/// =============================
/// Tax Endpoint
/// =============================

/// Absent amounts count as zero
fn optional_amount(
    field: &str,
    label: &str,
    value: Option<&serde_json::Value>,
    errors: &mut Vec<FieldError>,
) -> Option<f64> {
    match value {
        None | Some(serde_json::Value::Null) => Some(0.0),
        value => coerce_number(field, label, value, errors),
    }
}

async fn tax_handler(
    State(state): State<ApiState>,
    payload: Result<Json<TaxApiRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection),
    };

    let mut errors = Vec::new();
    let income = coerce_number("income", "Income", req.income.as_ref(), &mut errors);
    let deductions = optional_amount("deductions", "Deductions", req.deductions.as_ref(), &mut errors);
    let hra_exemption = optional_amount(
        "hra_exemption",
        "HRA exemption",
        req.hra_exemption.as_ref(),
        &mut errors,
    );

    for (field, label, value) in [
        ("income", "Income", income),
        ("deductions", "Deductions", deductions),
        ("hra_exemption", "HRA exemption", hra_exemption),
    ] {
        if matches!(value, Some(v) if v < 0.0) {
            errors.push(FieldError::new(field, format!("{} cannot be negative.", label)));
        }
    }

    let (Some(income), Some(deductions), Some(hra_exemption)) = (income, deductions, hra_exemption)
    else {
        return fail(AdvisorError::Validation(errors));
    };
    if !errors.is_empty() {
        return fail(AdvisorError::Validation(errors));
    }

    let report = state
        .tax_advisor
        .report(income, deductions, hra_exemption)
        .await;
    ok(report)
}

/// =============================
/// Document Endpoint
/// =============================

async fn analyze_document_handler(
    State(state): State<ApiState>,
    payload: Result<Json<DocumentApiRequest>, JsonRejection>,
) -> ApiResult {
    let Json(req) = match payload {
        Ok(req) => req,
        Err(rejection) => return rejected(rejection),
    };
    match state.documents.analyze(&req.document_image).await {
        Ok(analysis) => ok(analysis),
        Err(e) => fail(e),
    }
}

/// =============================
/// Router
/// =============================

pub fn create_router(state: ApiState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/profile", post(create_profile))
        .route("/api/advice", post(advice_handler))
        .route("/api/retrieve", post(retrieve_handler))
        .route("/api/tax", post(tax_handler))
        .route("/api/documents/analyze", post(analyze_document_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// =============================
/// Server Startup
/// =============================

pub async fn start_server(
    state: ApiState,
    port: u16,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!("API Server listening on http://0.0.0.0:{}", port);
    info!("Local: http://127.0.0.1:{}", port);

    axum::serve(listener, router).await?;

    Ok(())
}
