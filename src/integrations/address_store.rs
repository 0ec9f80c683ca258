use reqwest::Client;

use crate::{
    error::{AppError, Result},
    models::RemoteRecord,
};

/// Append-only view of the remote address store.
///
/// The store holds `{address}` records; this service only lists the full set
/// and appends new entries. Creation is not idempotent on the store side, so
/// callers check existence first.
#[async_trait::async_trait]
pub trait AddressStore: Send + Sync {
    /// Raw addresses exactly as stored; callers normalize.
    async fn list_addresses(&self) -> Result<Vec<String>>;

    async fn add_address(&self, address: &str) -> Result<()>;
}

#[derive(Clone, Debug)]
pub struct HttpAddressStore {
    url: String,
    client: Client,
}

impl HttpAddressStore {
    pub fn new(url: String) -> Self {
        Self {
            url,
            client: Client::new(),
        }
    }
}

#[async_trait::async_trait]
impl AddressStore for HttpAddressStore {
    async fn list_addresses(&self) -> Result<Vec<String>> {
        let response = self
            .client
            .get(&self.url)
            .send()
            .await
            .map_err(|e| AppError::Network(format!("address list request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "address list returned {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        let records: Vec<RemoteRecord> = response
            .json()
            .await
            .map_err(|e| AppError::Network(format!("address list parse failed: {}", e)))?;

        tracing::debug!("Address store returned {} records", records.len());
        Ok(records.into_iter().map(|record| record.address).collect())
    }

    async fn add_address(&self, address: &str) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&RemoteRecord {
                address: address.to_string(),
            })
            .send()
            .await
            .map_err(|e| AppError::Network(format!("address create request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Network(format!(
                "address create returned {}: {}",
                status,
                truncate_body(&body)
            )));
        }

        tracing::info!("Address {} added to remote store", address);
        Ok(())
    }
}

// Internal helper that supports `truncate_body` operations.
fn truncate_body(body: &str) -> String {
    const MAX_CHARS: usize = 200;
    if body.chars().count() <= MAX_CHARS {
        return body.to_string();
    }
    let head: String = body.chars().take(MAX_CHARS).collect();
    format!("{}...", head)
}
