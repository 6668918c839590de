//! Error types for cashbook-parser
//!
//! Every variant describes why a message is not a lending message. Callers
//! usually only need `Option` semantics and use `MessageInterpreter::parse`.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("Empty message")]
    EmptyMessage,

    #[error("Too few tokens: expected at least {expected}, got {actual}")]
    TooFewTokens { expected: usize, actual: usize },

    #[error("Unknown keyword: {keyword}")]
    UnknownKeyword { keyword: String },

    #[error("Invalid amount: {token}")]
    InvalidAmount { token: String },

    #[error("Missing person name")]
    MissingPerson,
}
