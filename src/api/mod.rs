// Copyright (c) 2026 Bountyy Oy. All rights reserved.
// This software is proprietary and confidential.

/**
 * Bountyy Oy - Recon API Gateway
 * API-key-gated HTTP surface over the scan pipeline
 *
 * @copyright 2026 Bountyy Oy
 * @license Proprietary - Enterprise Edition
 */

pub mod auth;

use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::errors::{AuthError, ReconError};
use crate::pipeline::ScanPipeline;
use crate::policy::PolicyGate;
use crate::store::Store;
use crate::types::{EnrichmentRecord, Finding, Scan, ScanStatus, Scope};

const DEFAULT_LIST_LIMIT: i64 = 20;
const MAX_LIST_LIMIT: i64 = 100;

pub struct ApiState {
    pub store: Arc<dyn Store>,
    pub pipeline: Arc<ScanPipeline>,
    pub policy: Arc<PolicyGate>,
}

pub fn create_router(state: Arc<ApiState>) -> Router {
    Router::new()
        .route("/scan", post(create_scan_handler))
        .route("/scan/:id", get(get_scan_handler))
        .route("/scan/:id/findings", get(get_findings_handler))
        .route("/scans", get(list_scans_handler))
        .route("/domain/verify", post(verify_domain_handler))
        .route("/policy/benchmark", get(benchmark_handler))
        .fallback(unknown_route_handler)
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct CreateScanRequest {
    domain: String,
}

#[derive(Debug, Deserialize)]
struct ListScansParams {
    limit: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct VerifyDomainRequest {
    domain: String,
    token: String,
}

/// Submission receipt. The full record, including the raw crawl blob,
/// stays server-side; clients fetch the summary by id.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CreateScanResponse {
    success: bool,
    scan_id: Uuid,
    urls_found: u32,
    findings_count: u32,
    risk_score: u8,
}

/// Scan summary for read endpoints: derived fields only, never the
/// raw crawl or the parsed surface.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanSummary {
    id: Uuid,
    domain: String,
    status: ScanStatus,
    risk_score: u8,
    urls_found: u32,
    vulnerabilities_found: u32,
    technologies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    enrichment: Option<EnrichmentRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<Scan> for ScanSummary {
    fn from(scan: Scan) -> Self {
        Self {
            id: scan.id,
            domain: scan.domain,
            status: scan.status,
            risk_score: scan.risk_score,
            urls_found: scan.urls_found,
            vulnerabilities_found: scan.vulnerabilities_found,
            technologies: scan.technologies,
            enrichment: scan.enrichment,
            error_message: scan.error_message,
            created_at: scan.created_at,
            updated_at: scan.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FindingsResponse {
    scan_id: Uuid,
    findings: Vec<Finding>,
    count: usize,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ScanListResponse {
    scans: Vec<ScanSummary>,
    count: usize,
}

fn presented_key(headers: &HeaderMap) -> Option<&str> {
    headers.get("x-api-key").and_then(|v| v.to_str().ok())
}

async fn create_scan_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<CreateScanRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::ScanCreate)?;

    info!("Scan requested for {} by key '{}'", request.domain, key.name);

    let scan = state.pipeline.run(&request.domain, &key.name).await?;
    Ok((
        StatusCode::CREATED,
        Json(CreateScanResponse {
            success: true,
            scan_id: scan.id,
            urls_found: scan.urls_found,
            findings_count: scan.vulnerabilities_found,
            risk_score: scan.risk_score,
        }),
    ))
}

async fn get_scan_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::ScanRead)?;

    let scan = state
        .store
        .get_scan(id)
        .await
        .map_err(ReconError::from)?
        .ok_or_else(|| ReconError::NotFound("Scan".to_string()))?;

    Ok(Json(ScanSummary::from(scan)))
}

async fn get_findings_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::FindingsRead)?;

    // 404 for findings of a nonexistent scan, not an empty list
    state
        .store
        .get_scan(id)
        .await
        .map_err(ReconError::from)?
        .ok_or_else(|| ReconError::NotFound("Scan".to_string()))?;

    let findings = state
        .store
        .findings_for_scan(id)
        .await
        .map_err(ReconError::from)?;

    let count = findings.len();
    Ok(Json(FindingsResponse {
        scan_id: id,
        findings,
        count,
    }))
}

async fn list_scans_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Query(params): Query<ListScansParams>,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::ScanRead)?;

    let limit = params
        .limit
        .unwrap_or(DEFAULT_LIST_LIMIT)
        .clamp(1, MAX_LIST_LIMIT);

    let scans: Vec<ScanSummary> = state
        .store
        .list_recent_scans(limit)
        .await
        .map_err(ReconError::from)?
        .into_iter()
        .map(ScanSummary::from)
        .collect();

    let count = scans.len();
    Ok(Json(ScanListResponse { scans, count }))
}

async fn verify_domain_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    Json(request): Json<VerifyDomainRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::ScanCreate)?;

    state
        .policy
        .verify_ownership(&request.domain, &request.token)
        .await?;

    Ok(Json(serde_json::json!({
        "success": true,
        "domain": request.domain,
    })))
}

async fn benchmark_handler(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, ApiError> {
    let key = auth::authenticate(state.store.as_ref(), presented_key(&headers)).await?;
    auth::require_scope(&key, Scope::ScanRead)?;

    let report = state.policy.benchmark_report().await?;
    Ok(Json(report))
}

/// Self-describing 404 so misrouted clients can correct themselves
async fn unknown_route_handler() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(serde_json::json!({
            "error": "Unknown endpoint",
            "endpoints": {
                "POST /scan": "Start a scan (scope scan:create)",
                "GET /scan/:id": "Fetch a scan record (scope scan:read)",
                "GET /scan/:id/findings": "Fetch scan findings (scope findings:read)",
                "GET /scans?limit=N": "List recent scans, limit <= 100 (scope scan:read)",
                "POST /domain/verify": "Prove domain ownership via DNS TXT (scope scan:create)",
                "GET /policy/benchmark": "Classifier precision/recall report (scope scan:read)",
            },
        })),
    )
}

/// HTTP surface of the pipeline error taxonomy
struct ApiError(ReconError);

impl From<ReconError> for ApiError {
    fn from(err: ReconError) -> Self {
        ApiError(err)
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        ApiError(ReconError::Auth(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            ReconError::PolicyDenied { .. } => StatusCode::FORBIDDEN,
            ReconError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReconError::Configuration(_) => StatusCode::SERVICE_UNAVAILABLE,
            ReconError::UpstreamRateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            ReconError::UpstreamExhausted { .. } => StatusCode::PAYMENT_REQUIRED,
            ReconError::NotFound(_) => StatusCode::NOT_FOUND,
            ReconError::Dns { .. } => StatusCode::BAD_REQUEST,
            ReconError::Auth(AuthError::InsufficientScope { .. }) => StatusCode::FORBIDDEN,
            ReconError::Auth(_) => StatusCode::UNAUTHORIZED,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(serde_json::json!({
            "error": self.0.to_string()
        }));

        (status, body).into_response()
    }
}
