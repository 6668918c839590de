//! Error types for cashbook-core
//!
//! Every failure the bookkeeping layer can report carries an error code,
//! a severity and, where it helps, suggestions for the caller.

use thiserror::Error;
use serde::{Deserialize, Serialize};

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Persistence layer failure
    StoreError,
    /// Lendings ledger could not be found or created
    LedgerUnavailable,
    /// Draft rejected before it was stored
    InvalidDraft,
    /// Link code does not exist
    LinkCodeInvalid,
    /// Link code exists but expired
    LinkCodeExpired,
    /// Chat already linked to a user
    AlreadyLinked,
    /// Chat transport failure
    TransportError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::StoreError => write!(f, "STORE_ERROR"),
            ErrorCode::LedgerUnavailable => write!(f, "LEDGER_UNAVAILABLE"),
            ErrorCode::InvalidDraft => write!(f, "INVALID_DRAFT"),
            ErrorCode::LinkCodeInvalid => write!(f, "LINK_CODE_INVALID"),
            ErrorCode::LinkCodeExpired => write!(f, "LINK_CODE_EXPIRED"),
            ErrorCode::AlreadyLinked => write!(f, "ALREADY_LINKED"),
            ErrorCode::TransportError => write!(f, "TRANSPORT_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for cashbook-core
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    #[error("Store error: {message}")]
    Store { message: String },

    #[error("Failed to access {name} ledger")]
    LedgerUnavailable { name: String },

    #[error("Invalid draft: {message}")]
    InvalidDraft { message: String },

    #[error("Invalid link code")]
    LinkCodeInvalid,

    #[error("Link code expired")]
    LinkCodeExpired,

    #[error("Chat {chat_id} is already linked to another user")]
    AlreadyLinked { chat_id: String },

    #[error("Transport error: {message}")]
    Transport { message: String },
}

impl CoreError {
    pub fn store(message: impl Into<String>) -> Self {
        CoreError::Store { message: message.into() }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        CoreError::Transport { message: message.into() }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::Store { .. } => ErrorCode::StoreError,
            CoreError::LedgerUnavailable { .. } => ErrorCode::LedgerUnavailable,
            CoreError::InvalidDraft { .. } => ErrorCode::InvalidDraft,
            CoreError::LinkCodeInvalid => ErrorCode::LinkCodeInvalid,
            CoreError::LinkCodeExpired => ErrorCode::LinkCodeExpired,
            CoreError::AlreadyLinked { .. } => ErrorCode::AlreadyLinked,
            CoreError::Transport { .. } => ErrorCode::TransportError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::Store { .. } => ErrorSeverity::Error,
            CoreError::LedgerUnavailable { .. } => ErrorSeverity::Error,
            CoreError::InvalidDraft { .. } => ErrorSeverity::Warning,
            CoreError::LinkCodeInvalid => ErrorSeverity::Info,
            CoreError::LinkCodeExpired => ErrorSeverity::Info,
            CoreError::AlreadyLinked { .. } => ErrorSeverity::Warning,
            CoreError::Transport { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::Store { message } => {
                details = details.with_detail(serde_json::json!({ "store_message": message }));
            }
            CoreError::InvalidDraft { message } => {
                details = details.with_detail(serde_json::json!({ "validation_message": message }));
                details = details.with_suggestion(
                    "Amounts must be positive, at most 10^15, and the ledger id must be set.".to_string()
                );
            }
            CoreError::LinkCodeInvalid => {
                details = details.with_suggestion(
                    "Generate a new code from the app and send /start <code>.".to_string()
                );
            }
            CoreError::LinkCodeExpired => {
                details = details.with_suggestion(
                    "Link codes are short-lived; generate a fresh one.".to_string()
                );
            }
            CoreError::AlreadyLinked { .. } => {
                details = details.with_suggestion(
                    "Unlink the chat from the other account first.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Owner the operation ran for
    pub user_id: Option<String>,
    /// Chat the request came from
    pub chat_id: Option<String>,
    /// Operation being performed
    pub operation: String,
}

impl ErrorContext {
    pub fn new(operation: &str) -> Self {
        Self {
            user_id: None,
            chat_id: None,
            operation: operation.to_string(),
        }
    }

    pub fn with_user_id(mut self, user_id: &str) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    pub fn with_chat_id(mut self, chat_id: &str) -> Self {
        self.chat_id = Some(chat_id.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    fn log_warning(&self, message: &str, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "cashbook::error",
            "ERROR [{}] {} - Operation: {} - User: {:?} - Chat: {:?}",
            error.code(),
            error,
            context.operation,
            context.user_id,
            context.chat_id
        );
    }

    fn log_warning(&self, message: &str, context: &ErrorContext) {
        log::warn!(
            target: "cashbook::error",
            "WARNING: {} - Operation: {} - User: {:?}",
            message,
            context.operation,
            context.user_id
        );
    }
}

// ==================== Tests ====================
