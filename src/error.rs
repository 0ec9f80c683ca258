use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Address store error: {0}")]
    Network(String),

    #[error("Balance query failed: {0}")]
    Oracle(String),

    #[error("Invalid address: {0}")]
    InvalidAddress(String),

    #[error("Address already added: {0}")]
    AlreadyExists(String),

    #[error("No wallet provider available")]
    ProviderUnavailable,

    #[error("Wallet request rejected: {0}")]
    UserRejected(String),

    #[error("Wallet provider error: {0}")]
    Provider(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    /// Stable machine-readable code used in API error bodies.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Network(_) => "NETWORK_ERROR",
            AppError::Oracle(_) => "ORACLE_ERROR",
            AppError::InvalidAddress(_) => "INVALID_ADDRESS",
            AppError::AlreadyExists(_) => "ALREADY_EXISTS",
            AppError::ProviderUnavailable => "PROVIDER_UNAVAILABLE",
            AppError::UserRejected(_) => "USER_REJECTED",
            AppError::Provider(_) => "PROVIDER_ERROR",
            AppError::BadRequest(_) => "BAD_REQUEST",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidAddress(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::ProviderUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::UserRejected(_) => StatusCode::FORBIDDEN,
            AppError::Network(_) | AppError::Oracle(_) | AppError::Provider(_) => {
                StatusCode::BAD_GATEWAY
            }
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Serialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = Json(ErrorResponse {
            success: false,
            error: ErrorDetail {
                code: self.code().to_string(),
                message: self.to_string(),
            },
        });

        (status, body).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
