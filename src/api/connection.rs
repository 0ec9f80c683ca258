use axum::{extract::State, Json};
use serde::Serialize;

use crate::{
    error::Result,
    models::{ApiResponse, ConnectionStatus},
    services::connection::StatusSnapshot,
};

use super::AppState;

#[derive(Debug, Serialize)]
pub struct ConnectResponse {
    pub accounts: Vec<String>,
    pub status: ConnectionStatus,
}

#[derive(Debug, Serialize)]
pub struct DisconnectResponse {
    pub status: ConnectionStatus,
}

/// POST /api/v1/connect
pub async fn connect(State(state): State<AppState>) -> Result<Json<ApiResponse<ConnectResponse>>> {
    let accounts = state.service.connect().await?;
    let status = state.service.status().await.status;
    Ok(Json(ApiResponse::success(ConnectResponse { accounts, status })))
}

/// POST /api/v1/disconnect
pub async fn disconnect(State(state): State<AppState>) -> Json<ApiResponse<DisconnectResponse>> {
    let status = state.service.disconnect().await;
    Json(ApiResponse::success(DisconnectResponse { status }))
}

/// GET /api/v1/status
pub async fn get_status(State(state): State<AppState>) -> Json<ApiResponse<StatusSnapshot>> {
    Json(ApiResponse::success(state.service.status().await))
}
