use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::models::ConnectionStatus;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub environment: String,
    pub connection: ConnectionStatus,
    pub wallet_configured: bool,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let connection = state.service.status().await.status;

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        environment: state.config.environment.clone(),
        connection,
        wallet_configured: state.service.has_wallet(),
    })
}
