//! API handlers for the lease server
//!
//! Provides REST endpoints for:
//! - Lease text analysis
//! - Uploaded document analysis
//! - Jurisdiction listing

use axum::{extract::State, Json};
use lease_engine::extraction::{extract_pdf_text_blocking, fetch_document};
use lease_engine::{Jurisdiction, LeaseAnalysisResponse};
use serde::{Deserialize, Serialize};
use tracing::{info, info_span, Instrument};
use uuid::Uuid;

use crate::error::ServerError;
use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
}

/// Handler: GET /health
pub async fn handle_health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "lease-server",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Jurisdiction list response
#[derive(Serialize)]
pub struct JurisdictionListResponse {
    pub success: bool,
    pub jurisdictions: Vec<JurisdictionInfo>,
    pub count: usize,
}

/// Catalog entry summary
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JurisdictionInfo {
    pub code: String,
    pub name: Option<&'static str>,
    pub law_summary: String,
    pub required_clause_count: usize,
}

/// Handler: GET /api/jurisdictions
pub async fn handle_list_jurisdictions(
    State(state): State<AppState>,
) -> Json<JurisdictionListResponse> {
    let registry = state.analyzer.registry();
    let jurisdictions: Vec<JurisdictionInfo> = registry
        .jurisdictions()
        .into_iter()
        .filter_map(|code| {
            registry.get(code).map(|schema| JurisdictionInfo {
                code: code.to_string(),
                name: lease_engine::jurisdiction::country_name(code),
                law_summary: schema.law_summary.clone(),
                required_clause_count: schema.required_clauses.len(),
            })
        })
        .collect();

    let count = jurisdictions.len();

    Json(JurisdictionListResponse {
        success: true,
        jurisdictions,
        count,
    })
}

/// Analyze request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub country_code: String,
    pub region_code: Option<String>,
}

/// Handler: POST /api/analyze
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<LeaseAnalysisResponse>, ServerError> {
    if req.text.trim().is_empty() {
        return Err(ServerError::InvalidRequest(
            "Lease text is required".to_string(),
        ));
    }
    let jurisdiction = validate_jurisdiction(&req.country_code, req.region_code.as_deref())?;

    let request_id = Uuid::new_v4();
    let span = info_span!("request", id = %request_id, jurisdiction = %jurisdiction);

    async move {
        info!("Analyze request: {} chars", req.text.len());
        let assessment = state
            .analyzer
            .analyze(
                &req.text,
                &jurisdiction.country_code,
                jurisdiction.region_code.as_deref(),
            )
            .await?;
        Ok::<_, ServerError>(Json(assessment))
    }
    .instrument(span)
    .await
}

/// Analyze-document request body
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeDocumentRequest {
    #[serde(default)]
    pub file_url: String,
    #[serde(default)]
    pub country_code: String,
    pub region_code: Option<String>,
}

/// Handler: POST /api/analyze-document
pub async fn handle_analyze_document(
    State(state): State<AppState>,
    Json(req): Json<AnalyzeDocumentRequest>,
) -> Result<Json<LeaseAnalysisResponse>, ServerError> {
    let file_url = req.file_url.trim().to_string();
    if file_url.is_empty() {
        return Err(ServerError::InvalidRequest(
            "File URL is required".to_string(),
        ));
    }
    if !(file_url.starts_with("http://") || file_url.starts_with("https://")) {
        return Err(ServerError::InvalidRequest(
            "File URL must use http or https".to_string(),
        ));
    }
    let jurisdiction = validate_jurisdiction(&req.country_code, req.region_code.as_deref())?;

    let request_id = Uuid::new_v4();
    let span = info_span!("request", id = %request_id, jurisdiction = %jurisdiction);

    async move {
        info!("Analyze document request: {}", file_url);

        if let Some(cached) = state
            .analyzer
            .cached(
                &file_url,
                &jurisdiction.country_code,
                jurisdiction.region_code.as_deref(),
            )
            .await
        {
            info!("Returning cached analysis without fetching document");
            return Ok(Json(cached));
        }

        let bytes = fetch_document(&state.http, &file_url, state.max_document_bytes).await?;
        let text = extract_pdf_text_blocking(bytes).await?;
        info!("Extracted {} chars", text.len());

        let assessment = state
            .analyzer
            .analyze_document(
                &file_url,
                &text,
                &jurisdiction.country_code,
                jurisdiction.region_code.as_deref(),
            )
            .await?;
        Ok::<_, ServerError>(Json(assessment))
    }
    .instrument(span)
    .await
}

/// Normalize and check the requested jurisdiction
pub(crate) fn validate_jurisdiction(
    country_code: &str,
    region_code: Option<&str>,
) -> Result<Jurisdiction, ServerError> {
    let jurisdiction = Jurisdiction::new(country_code, region_code);
    if !jurisdiction.has_valid_country_code() {
        return Err(ServerError::InvalidRequest(format!(
            "Invalid country code '{}': expected a 2 or 3 letter ISO code",
            country_code.trim()
        )));
    }
    Ok(jurisdiction)
}
