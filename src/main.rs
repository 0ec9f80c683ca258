use axum::http::HeaderValue;
use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod error;
mod integrations;
mod models;
mod services;
mod utils;

use config::Config;
use constants::API_VERSION;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "whale_ranking=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting whale ranking service");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    let app_state = api::AppState::from_config(config.clone())?;

    // Initial load: store list, then one balance query per address
    if config.load_on_startup {
        let service = app_state.service.clone();
        tokio::spawn(async move {
            match service.load_from_store().await {
                Ok(summary) => tracing::info!(
                    "Initial load finished: {} address(es), {} balance(s)",
                    summary.addresses,
                    summary.balances_resolved
                ),
                Err(e) => tracing::error!("Initial load failed: {}", e),
            }
        });
    } else {
        tracing::warn!("Initial load disabled via LOAD_ON_STARTUP");
    }

    let app = build_router(app_state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Ranking & ledger edits
        .route("/api/v1/ranking", get(api::accounts::get_ranking))
        .route("/api/v1/accounts", post(api::accounts::add_account))
        .route(
            "/api/v1/accounts/{address}",
            delete(api::accounts::remove_account),
        )
        .route("/api/v1/refresh", post(api::accounts::refresh))
        .route("/api/v1/sort", post(api::accounts::toggle_sort))
        // Wallet session
        .route("/api/v1/connect", post(api::connection::connect))
        .route("/api/v1/disconnect", post(api::connection::disconnect))
        .route("/api/v1/status", get(api::connection::get_status))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Method, Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;

    use crate::config::test_config;
    use crate::services::testing::{InMemoryStore, ScriptedOracle};
    use crate::services::LedgerService;

    const A: &str = "0xabc0000000000000000000000000000000000001";
    const B: &str = "0xabc0000000000000000000000000000000000002";

    fn test_app(store: Arc<InMemoryStore>) -> Router {
        let oracle = Arc::new(ScriptedOracle::new().with_balance(A, 100).with_balance(B, 900));
        let service = LedgerService::new(store, oracle, None, 3);
        build_router(api::AppState {
            service: Arc::new(service),
            config: test_config(),
        })
    }

    async fn call(
        app: &Router,
        method: Method,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string())),
            None => builder.body(Body::empty()),
        }
        .expect("request");

        let response = app.clone().oneshot(request).await.expect("response");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, value)
    }

    #[tokio::test]
    async fn refresh_then_ranking_lists_whales_first() {
        let app = test_app(Arc::new(InMemoryStore::with_records(&[A, B])));

        let (status, body) = call(&app, Method::POST, "/api/v1/refresh", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["addresses"], 2);

        let (status, body) = call(&app, Method::GET, "/api/v1/ranking", None).await;
        assert_eq!(status, StatusCode::OK);
        let rows = body["data"]["rows"].as_array().expect("rows");
        assert_eq!(rows[0]["address"], B);
        assert_eq!(rows[0]["rank"], 1);
        assert_eq!(rows[0]["balance_display"], "9.00");
        assert_eq!(rows[0]["short_address"], "0xabc0...0002");
        assert_eq!(body["data"]["direction"], "descending");

        let (_, body) = call(&app, Method::GET, "/api/v1/ranking?search=0001", None).await;
        let rows = body["data"]["rows"].as_array().expect("rows");
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["address"], A);
    }

    #[tokio::test]
    async fn add_account_reports_invalid_and_duplicate() {
        let store = Arc::new(InMemoryStore::default());
        let app = test_app(store.clone());

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/accounts",
            Some(serde_json::json!({ "address": "not-an-address" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "INVALID_ADDRESS");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/accounts",
            Some(serde_json::json!({ "address": A })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["outcome"], "added");

        let (status, body) = call(
            &app,
            Method::POST,
            "/api/v1/accounts",
            Some(serde_json::json!({ "address": A.to_uppercase().replacen("0X", "0x", 1) })),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["error"]["code"], "ALREADY_EXISTS");
        assert_eq!(store.posts(), 1);
    }

    #[tokio::test]
    async fn connect_without_wallet_is_service_unavailable() {
        let app = test_app(Arc::new(InMemoryStore::default()));

        let (status, body) = call(&app, Method::POST, "/api/v1/connect", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "PROVIDER_UNAVAILABLE");

        let (_, body) = call(&app, Method::GET, "/api/v1/status", None).await;
        assert_eq!(body["data"]["status"], "disconnected");
        assert!(body["data"]["last_error"].is_string());
    }

    #[tokio::test]
    async fn delete_and_sort_update_the_view() {
        let app = test_app(Arc::new(InMemoryStore::with_records(&[A, B])));
        call(&app, Method::POST, "/api/v1/refresh", None).await;

        let (_, body) = call(&app, Method::POST, "/api/v1/sort", None).await;
        assert_eq!(body["data"]["direction"], "ascending");

        let uri = format!("/api/v1/accounts/{}", A);
        let (status, body) = call(&app, Method::DELETE, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["data"]["removed"], true);

        let (_, body) = call(&app, Method::GET, "/api/v1/ranking", None).await;
        assert_eq!(body["data"]["total"], 1);
        assert_eq!(body["data"]["rows"][0]["address"], B);
    }

    #[tokio::test]
    async fn health_reports_wallet_configuration() {
        let app = test_app(Arc::new(InMemoryStore::default()));
        let (status, body) = call(&app, Method::GET, "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["wallet_configured"], false);
    }

    #[test]
    fn cors_parses_explicit_origins() {
        let config = Config {
            cors_allowed_origins: "http://localhost:5173, https://whales.example".to_string(),
            ..test_config()
        };
        // Builds without panicking for explicit and wildcard origins.
        let _ = cors_from_config(&config);
        let _ = cors_from_config(&test_config());
    }
}
