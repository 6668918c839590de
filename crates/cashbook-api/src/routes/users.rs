//! Per-user JSON endpoints
//!
//! The path `user_id` is taken as given. An upstream auth layer must guard
//! these routes.

use axum::extract::{Path, Query, State};
use axum::Json;
use cashbook_core::{LendingRecord, LendingsOverview};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{ApiError, AppState};

#[derive(Debug, Default, Deserialize)]
pub struct BalanceQuery {
    /// Case-insensitive person name filter
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkCodeResponse {
    pub code: String,
    /// Seconds until the code expires
    pub expires_in: i64,
}

#[derive(Debug, Serialize)]
pub struct LinkStatusResponse {
    pub linked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chat_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub linked_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct UnlinkResponse {
    pub success: bool,
}

fn require_user_id(user_id: &str) -> Result<&str, ApiError> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(ApiError::BadRequest {
            message: "user id is empty".to_string(),
        });
    }
    Ok(user_id)
}

pub async fn api_balances(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<BalanceQuery>,
) -> Result<Json<LendingsOverview>, ApiError> {
    let user_id = require_user_id(&user_id)?;
    let overview = state
        .dispatcher
        .service()
        .overview(user_id, query.q.as_deref())
        .await?;
    Ok(Json(overview))
}

pub async fn api_lending_records(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<Vec<LendingRecord>>, ApiError> {
    let user_id = require_user_id(&user_id)?;
    let records = state.dispatcher.service().lending_records(user_id).await?;
    Ok(Json(records))
}

/// Issues a chat link code for `user_id`; the caller must already be authenticated as that user
pub async fn api_create_link_code(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LinkCodeResponse>, ApiError> {
    let user_id = require_user_id(&user_id)?;
    let now = Utc::now();
    let code = state.dispatcher.issue_link_code(user_id, now).await?;
    Ok(Json(LinkCodeResponse {
        expires_in: code.expires_in(now),
        code: code.code,
    }))
}

pub async fn api_link_status(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<LinkStatusResponse>, ApiError> {
    let user_id = require_user_id(&user_id)?;
    let link = state.dispatcher.link_status(user_id).await?;
    Ok(Json(LinkStatusResponse {
        linked: link.is_some(),
        chat_id: link.as_ref().map(|l| l.chat_id.clone()),
        username: link.as_ref().and_then(|l| l.username.clone()),
        linked_at: link.map(|l| l.linked_at),
    }))
}

pub async fn api_unlink(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<UnlinkResponse>, ApiError> {
    let user_id = require_user_id(&user_id)?;
    let removed = state.dispatcher.unlink(user_id).await?;
    if !removed {
        return Err(ApiError::NotFound {
            resource: format!("chat link for user {}", user_id),
        });
    }
    Ok(Json(UnlinkResponse { success: true }))
}
