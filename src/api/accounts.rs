use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AppError, Result},
    models::{AddOutcome, ApiResponse, SortDirection},
    services::connection::{RankingSnapshot, RefreshSummary},
    utils::{canonical_address, normalize_address},
};

use super::AppState;

#[derive(Debug, Deserialize, Default)]
pub struct RankingQuery {
    pub search: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AddAccountRequest {
    pub address: String,
}

#[derive(Debug, Serialize)]
pub struct AddAccountResponse {
    pub address: String,
    pub outcome: AddOutcome,
}

#[derive(Debug, Serialize)]
pub struct RemoveAccountResponse {
    pub address: String,
    pub removed: bool,
}

#[derive(Debug, Serialize)]
pub struct SortResponse {
    pub direction: SortDirection,
}

/// GET /api/v1/ranking?search=<term>
pub async fn get_ranking(
    State(state): State<AppState>,
    Query(query): Query<RankingQuery>,
) -> Json<ApiResponse<RankingSnapshot>> {
    let term = query.search.unwrap_or_default();
    Json(ApiResponse::success(state.service.ranking(&term).await))
}

/// POST /api/v1/accounts
pub async fn add_account(
    State(state): State<AppState>,
    Json(req): Json<AddAccountRequest>,
) -> Result<Json<ApiResponse<AddAccountResponse>>> {
    let outcome = state.service.add_address_if_new(&req.address).await?;
    let address = canonical_address(&req.address)?;

    if outcome == AddOutcome::AlreadyExists {
        return Err(AppError::AlreadyExists(address));
    }

    Ok(Json(ApiResponse::success(AddAccountResponse {
        address,
        outcome,
    })))
}

/// DELETE /api/v1/accounts/{address}
pub async fn remove_account(
    State(state): State<AppState>,
    Path(address): Path<String>,
) -> Json<ApiResponse<RemoveAccountResponse>> {
    let removed = state.service.remove_address(&address).await;
    Json(ApiResponse::success(RemoveAccountResponse {
        address: normalize_address(&address),
        removed,
    }))
}

/// POST /api/v1/refresh
pub async fn refresh(State(state): State<AppState>) -> Result<Json<ApiResponse<RefreshSummary>>> {
    let summary = state.service.load_from_store().await?;
    Ok(Json(ApiResponse::success(summary)))
}

/// POST /api/v1/sort
pub async fn toggle_sort(State(state): State<AppState>) -> Json<ApiResponse<SortResponse>> {
    let direction = state.service.toggle_sort().await;
    Json(ApiResponse::success(SortResponse { direction }))
}
