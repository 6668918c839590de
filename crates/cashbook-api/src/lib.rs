//! HTTP API server
//!
//! Routes are organized into modules:
//! - routes::webhook: Telegram updates in, bot replies out
//! - routes::users: balances, lending records and chat linking

pub mod error;
pub mod routes;
pub mod telegram;

use axum::{
    http::HeaderValue,
    routing::{get, post},
    Router,
};
use cashbook_config::Config;
use cashbook_core::{BotDispatcher, ChatTransportRef, LendingService, MemoryStore, ReplyComposer};
use cashbook_parser::DefaultLendingParser;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;
pub use telegram::{LogTransport, TelegramTransport};

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<BotDispatcher>,
    pub transport: ChatTransportRef,
    pub config: Arc<Config>,
}

impl AppState {
    /// Wire the bot over one in-memory store
    pub fn new(config: Config, store: Arc<MemoryStore>, transport: ChatTransportRef) -> Self {
        let service = LendingService::new(config.lendings.clone(), store.clone(), store.clone());
        let dispatcher = BotDispatcher::new(
            Arc::new(DefaultLendingParser),
            Arc::new(service),
            store,
            ReplyComposer::new(config.currency.clone()),
            config.linking.code_ttl_secs,
        );
        Self {
            dispatcher: Arc::new(dispatcher),
            transport,
            config: Arc::new(config),
        }
    }

    /// Telegram transport when a token is configured, otherwise replies are logged
    pub fn from_config(config: Config) -> Self {
        let transport: ChatTransportRef = match TelegramTransport::from_config(&config.telegram) {
            Some(transport) => Arc::new(transport),
            None => {
                log::warn!("No Telegram bot token configured; replies will not be delivered");
                Arc::new(LogTransport)
            }
        };
        Self::new(config, Arc::new(MemoryStore::new()), transport)
    }
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::users::{
        api_balances, api_create_link_code, api_lending_records, api_link_status, api_unlink,
    };
    use routes::webhook::{receive_update, webhook_status};

    let cors = cors_layer(&state.config.server.cors_allow);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/telegram/webhook", post(receive_update).get(webhook_status))
        .route("/api/users/:user_id/balances", get(api_balances))
        .route("/api/users/:user_id/lendings", get(api_lending_records))
        .route("/api/users/:user_id/link-code", post(api_create_link_code))
        .route("/api/users/:user_id/link", get(api_link_status).delete(api_unlink))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed: &[String]) -> CorsLayer {
    if allowed.iter().any(|o| o == "*") {
        return CorsLayer::new().allow_origin(Any);
    }
    let origins: Vec<HeaderValue> = allowed
        .iter()
        .filter_map(|o| match o.parse() {
            Ok(origin) => Some(origin),
            Err(_) => {
                log::warn!("Ignoring invalid CORS origin '{}'", o);
                None
            }
        })
        .collect();
    CorsLayer::new().allow_origin(origins)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

/// Start the HTTP server and run until Ctrl-C
pub async fn start_server(state: AppState) -> std::io::Result<()> {
    let addr = state.config.bind_addr();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!("Starting CashBook server on http://{}", addr);
    log::info!("Available routes:");
    log::info!("  - POST /api/telegram/webhook (Telegram updates)");
    log::info!("  - GET  /api/users/:user_id/balances (Per-person balances)");
    log::info!("  - POST /api/users/:user_id/link-code (Chat link codes)");
    log::info!("  - GET  /api/health");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!("Server stopped gracefully");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!("Failed to listen for shutdown signal: {}", e);
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use cashbook_core::{ChatTransport, CoreResult, LinkStore};
    use chrono::{Duration, Utc};
    use rust_decimal_macros::dec;
    use serde_json::{json, Value};
    use tokio::sync::Mutex;
    use tower::ServiceExt;

    /// Keeps every outbound reply
    #[derive(Default)]
    struct RecordingTransport {
        sent: Mutex<Vec<(String, String)>>,
    }

    #[async_trait]
    impl ChatTransport for RecordingTransport {
        async fn send(&self, chat_id: &str, text: &str) -> CoreResult<()> {
            self.sent.lock().await.push((chat_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    fn test_state() -> (AppState, Arc<MemoryStore>, Arc<RecordingTransport>) {
        let store = Arc::new(MemoryStore::new());
        let transport = Arc::new(RecordingTransport::default());
        let state = AppState::new(Config::default(), store.clone(), transport.clone());
        (state, store, transport)
    }

    fn update(chat_id: i64, text: &str) -> Body {
        Body::from(
            json!({
                "update_id": 1,
                "message": {
                    "message_id": 1,
                    "from": { "id": 7, "is_bot": false, "first_name": "A", "username": "asha" },
                    "chat": { "id": chat_id, "type": "private" },
                    "date": 0,
                    "text": text
                }
            })
            .to_string(),
        )
    }

    async fn post_update(router: Router, body: Body) -> Value {
        let response = router
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/telegram/webhook")
                    .header("content-type", "application/json")
                    .body(body)
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn get_json(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_check() {
        let (state, _, _) = test_state();
        let response = create_router(state)
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&bytes[..], b"OK");
    }

    #[tokio::test]
    async fn test_webhook_status() {
        let (state, _, _) = test_state();
        let (status, body) = get_json(create_router(state), "/api/telegram/webhook").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!({ "status": "Telegram webhook active" }));
    }

    #[tokio::test]
    async fn test_webhook_always_acknowledges() {
        let (state, _, transport) = test_state();
        let router = create_router(state);

        let body = post_update(router.clone(), Body::from("not json")).await;
        assert_eq!(body, json!({ "ok": true }));

        let body = post_update(router, Body::from(json!({ "update_id": 5 }).to_string())).await;
        assert_eq!(body, json!({ "ok": true }));
        assert!(transport.sent.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_unlinked_chat_is_prompted() {
        let (state, _, transport) = test_state();
        post_update(create_router(state), update(42, "gave john 500")).await;

        let sent = transport.sent.lock().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, "42");
        assert!(sent[0].1.contains("Please link your account first"));
    }

    #[tokio::test]
    async fn test_link_record_and_read_balances() {
        let (state, store, transport) = test_state();
        let router = create_router(state);

        let response = router
            .clone()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/users/u1/link-code")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let issued: Value = serde_json::from_slice(&bytes).unwrap();
        let code = issued["code"].as_str().unwrap().to_string();
        assert_eq!(code.len(), 6);
        assert!(issued["expires_in"].as_i64().unwrap() > 590);

        post_update(router.clone(), update(42, &format!("/start {}", code))).await;
        assert!(store.linked_user("42").await.unwrap().is_some());

        post_update(router.clone(), update(42, "gave john 500 tomorrow")).await;
        post_update(router.clone(), update(42, "got john 200")).await;
        post_update(router.clone(), update(42, "borrowed ravi 2k")).await;

        {
            let sent = transport.sent.lock().await;
            assert_eq!(sent.len(), 4);
            assert!(sent[1].1.starts_with("✅ Recorded: Lent ₹500 to John"));
            assert_eq!(sent[2].1, "✅ Recorded: Received ₹200 from John");
        }

        let (status, overview) = get_json(router.clone(), "/api/users/u1/balances").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["people_count"], 2);
        assert_eq!(overview["they_owe_you"][0]["name"], "John");
        let total: rust_decimal::Decimal =
            serde_json::from_value(overview["total_owed_to_you"].clone()).unwrap();
        assert_eq!(total, dec!(300));

        let (_, filtered) = get_json(router.clone(), "/api/users/u1/balances?q=rav").await;
        assert_eq!(filtered["people_count"], 1);
        assert_eq!(filtered["you_owe_them"][0]["name"], "Ravi");

        let (_, lendings) = get_json(router.clone(), "/api/users/u1/lendings").await;
        assert_eq!(lendings.as_array().unwrap().len(), 2);

        let (_, link) = get_json(router, "/api/users/u1/link").await;
        assert_eq!(link["linked"], true);
        assert_eq!(link["chat_id"], "42");
    }

    #[tokio::test]
    async fn test_unknown_user_has_empty_overview() {
        let (state, _, _) = test_state();
        let (status, overview) = get_json(create_router(state), "/api/users/nobody/balances").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(overview["people_count"], 0);
        assert_eq!(overview["they_owe_you"], json!([]));
    }

    #[tokio::test]
    async fn test_unlink() {
        let (state, store, _) = test_state();
        let code = store
            .create_link_code("u1", Duration::seconds(600), Utc::now())
            .await
            .unwrap();
        store
            .verify_and_link(&code.code, "42", None, Utc::now())
            .await
            .unwrap();
        let router = create_router(state);

        let delete = || {
            Request::builder()
                .method("DELETE")
                .uri("/api/users/u1/link")
                .body(Body::empty())
                .unwrap()
        };
        let response = router.clone().oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = router.oneshot(delete()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
