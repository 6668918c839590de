//! Telegram webhook endpoints

use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde_json::{json, Value};

use crate::telegram::Update;
use crate::AppState;

/// Telegram retries any non-2xx response, so every outcome is acknowledged
pub async fn receive_update(State(state): State<AppState>, body: Bytes) -> Json<Value> {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            log::warn!(target: "cashbook::telegram", "Malformed update ignored: {}", e);
            return Json(json!({ "ok": true }));
        }
    };

    let Some(message) = update.into_inbound() else {
        return Json(json!({ "ok": true }));
    };

    let reply = state.dispatcher.handle(&message, Utc::now()).await;
    if let Err(e) = state.transport.send(&message.chat_id, &reply).await {
        log::error!(
            target: "cashbook::telegram",
            "Failed to send reply to chat {}: {}",
            message.chat_id,
            e
        );
    }

    Json(json!({ "ok": true }))
}

/// Telegram probes the webhook URL with GET
pub async fn webhook_status() -> Json<Value> {
    Json(json!({ "status": "Telegram webhook active" }))
}
