//! Error types for cashbook-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use cashbook_core::{CoreError, ErrorCode};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Core(e) => match e.code() {
                ErrorCode::InvalidDraft
                | ErrorCode::LinkCodeInvalid
                | ErrorCode::LinkCodeExpired => StatusCode::BAD_REQUEST,
                ErrorCode::AlreadyLinked => StatusCode::CONFLICT,
                ErrorCode::TransportError => StatusCode::BAD_GATEWAY,
                ErrorCode::StoreError
                | ErrorCode::LedgerUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Core(e) => serde_json::to_value(e.to_details())
                .unwrap_or_else(|_| serde_json::json!({ "message": e.to_string() })),
            other => serde_json::json!({ "message": other.to_string() }),
        };
        if status.is_server_error() {
            log::error!(target: "cashbook::api", "{} -> {}", self, status);
        }
        (status, Json(serde_json::json!({ "success": false, "error": body }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(ApiError::Core(CoreError::LinkCodeExpired).status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            ApiError::Core(CoreError::AlreadyLinked { chat_id: "1".to_string() }).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::from(CoreError::store("down")).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            ApiError::NotFound { resource: "link".to_string() }.status(),
            StatusCode::NOT_FOUND
        );
    }
}
