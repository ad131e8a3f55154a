use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use company_sourcing::{filter_companies, SourcingResult};
use screening_core::{CompanyRecord, Mandate, ScreenedCompany, ScreeningError, SourcingFilters};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{ApiResponse, AppError, AppState};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct ScreeningRequest {
    /// Parameter name -> free-form constraint string, in mandate order.
    pub mandate_parameters: serde_json::Map<String, serde_json::Value>,
    pub companies: Vec<CompanyRecord>,
}

/// Wire shape consumed by the frontend: each passed company flattened with
/// `status`/`reason`, wrapped under `company_details`.
#[derive(Debug, Serialize)]
pub struct ScreeningResponse {
    pub company_details: Vec<CompanyRecord>,
    pub total_screened: usize,
    pub total_passed: usize,
}

#[derive(Debug, Deserialize)]
pub struct SourcingRequest {
    #[serde(default)]
    pub filters: SourcingFilters,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

async fn screen_companies(
    State(state): State<AppState>,
    Json(request): Json<ScreeningRequest>,
) -> Result<Json<ScreeningResponse>, AppError> {
    if request.mandate_parameters.is_empty() {
        return Err(ScreeningError::EmptyMandate.into());
    }
    if request.companies.is_empty() {
        return Err(ScreeningError::EmptyUniverse.into());
    }

    let mandate = Mandate::from_json_object(&request.mandate_parameters);
    let companies = request.companies;
    let screener = Arc::clone(&state.screener);

    // The engine is sync and CPU-bound; keep it off the event loop.
    let run = tokio::task::spawn_blocking(move || screener.run(&mandate, &companies)).await?;

    Ok(Json(ScreeningResponse {
        total_screened: run.total_screened,
        total_passed: run.total_passed,
        company_details: run
            .passed
            .into_iter()
            .map(ScreenedCompany::into_record)
            .collect(),
    }))
}

async fn source_companies(
    State(state): State<AppState>,
    Json(request): Json<SourcingRequest>,
) -> Result<Json<ApiResponse<SourcingResult>>, AppError> {
    let universe = state.provider.load_universe().await?;
    let result = filter_companies(&universe, &request.filters);
    Ok(Json(ApiResponse::success(result)))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/screen-companies", post(screen_companies))
        .route("/api/source-companies", post(source_companies))
        .route("/api/health", get(health))
}
