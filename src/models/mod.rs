// src/models/mod.rs
pub mod account;

pub use account::{
    AddOutcome, Balance, ConnectionStatus, Notice, NoticeKind, RemoteRecord, SortDirection,
};

use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
