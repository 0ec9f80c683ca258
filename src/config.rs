use serde::Deserialize;
use std::env;

use crate::constants::{
    DEFAULT_ADDRESS_STORE_URL, DEFAULT_FALLBACK_RPC_URL, DEFAULT_NOTICE_TTL_SECS,
};
use crate::utils::is_env_flag_enabled;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Remote address store
    pub address_store_url: String,

    // Chain RPC
    pub fallback_rpc_url: String,
    pub wallet_rpc_url: Option<String>,

    // Ledger behaviour
    pub notice_ttl_secs: u64,
    pub load_on_startup: bool,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            address_store_url: env::var("ADDRESS_STORE_URL")
                .unwrap_or_else(|_| DEFAULT_ADDRESS_STORE_URL.to_string()),

            fallback_rpc_url: env::var("FALLBACK_RPC_URL")
                .unwrap_or_else(|_| DEFAULT_FALLBACK_RPC_URL.to_string()),
            wallet_rpc_url: env::var("WALLET_RPC_URL")
                .ok()
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty()),

            notice_ttl_secs: env::var("NOTICE_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_NOTICE_TTL_SECS.to_string())
                .parse()?,
            load_on_startup: if env::var("LOAD_ON_STARTUP").is_ok() {
                is_env_flag_enabled("LOAD_ON_STARTUP")
            } else {
                true
            },

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure_http_url("ADDRESS_STORE_URL", &self.address_store_url)?;
        ensure_http_url("FALLBACK_RPC_URL", &self.fallback_rpc_url)?;
        if let Some(wallet_url) = &self.wallet_rpc_url {
            ensure_http_url("WALLET_RPC_URL", wallet_url)?;
        } else {
            tracing::warn!("WALLET_RPC_URL not set; wallet connect is unavailable");
        }
        if self.notice_ttl_secs == 0 {
            anyhow::bail!("NOTICE_TTL_SECS must be greater than zero");
        }
        Ok(())
    }
}

// Internal helper that checks conditions for `ensure_http_url`.
fn ensure_http_url(name: &str, raw: &str) -> anyhow::Result<()> {
    if raw.trim().is_empty() {
        anyhow::bail!("{} is empty", name);
    }
    let parsed = url::Url::parse(raw.trim())
        .map_err(|e| anyhow::anyhow!("{} is not a valid URL: {}", name, e))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => anyhow::bail!("{} uses unsupported scheme '{}'", name, other),
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "test".to_string(),
        address_store_url: "http://localhost:8080/tabela".to_string(),
        fallback_rpc_url: "http://localhost:8545".to_string(),
        wallet_rpc_url: None,
        notice_ttl_secs: DEFAULT_NOTICE_TTL_SECS,
        load_on_startup: false,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_default_endpoints() {
        let config = test_config();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_rejects_non_http_store_url() {
        let config = Config {
            address_store_url: "ftp://example.com/tabela".to_string(),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_malformed_wallet_url() {
        let config = Config {
            wallet_rpc_url: Some("not a url".to_string()),
            ..test_config()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_rejects_zero_notice_ttl() {
        let config = Config {
            notice_ttl_secs: 0,
            ..test_config()
        };
        assert!(config.validate().is_err());
    }
}
