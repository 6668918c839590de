//! Core data models for the lendings ledger

use cashbook_parser::MAX_AMOUNT;
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::types::{LendingStatus, TransactionType};

/// Named collection of transactions owned by one user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    pub id: String,
    pub name: String,
    pub categories: Vec<String>,
    pub payment_modes: Vec<String>,
    pub owner_id: String,
    pub created_at: DateTime<Utc>,
}

/// Persisted cash movement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    /// Store-assigned identifier
    pub id: String,
    /// Owning ledger
    pub ledger_id: String,
    /// Store-assigned creation time
    pub created_at: DateTime<Utc>,
    /// Direction of the movement; the amount is never negative
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub title: String,
    pub category: String,
    pub payment_mode: Option<String>,
    /// Counterparty, if any
    pub person: Option<String>,
}

impl Transaction {
    pub fn is_cash_out(&self) -> bool {
        self.transaction_type == TransactionType::CashOut
    }
}

/// Transaction before the store assigns `id` and `created_at`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransactionDraft {
    pub ledger_id: String,
    #[serde(rename = "type")]
    pub transaction_type: TransactionType,
    pub amount: Decimal,
    pub title: String,
    pub category: String,
    pub payment_mode: Option<String>,
    pub person: Option<String>,
}

impl TransactionDraft {
    /// Reject drafts a store must never persist
    pub fn validate(&self) -> CoreResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(CoreError::InvalidDraft {
                message: format!("amount must be positive, got {}", self.amount),
            });
        }
        if self.amount > MAX_AMOUNT {
            return Err(CoreError::InvalidDraft {
                message: format!("amount exceeds {}, got {}", MAX_AMOUNT, self.amount),
            });
        }
        if self.ledger_id.trim().is_empty() {
            return Err(CoreError::InvalidDraft {
                message: "ledger id is empty".to_string(),
            });
        }
        Ok(())
    }
}

/// Settlement tracking for one debt-creating transaction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingRecord {
    pub id: String,
    pub transaction_id: String,
    pub borrower_name: String,
    pub due_date: Option<NaiveDate>,
    pub status: LendingStatus,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Lending record fields known before the transaction exists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingDraft {
    pub borrower_name: String,
    pub due_date: Option<NaiveDate>,
    pub status: LendingStatus,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub notes: Option<String>,
}

impl LendingDraft {
    /// Bind the draft to the transaction it tracks
    pub fn for_transaction(self, transaction_id: &str) -> NewLendingRecord {
        NewLendingRecord {
            transaction_id: transaction_id.to_string(),
            borrower_name: self.borrower_name,
            due_date: self.due_date,
            status: self.status,
            original_amount: self.original_amount,
            remaining_amount: self.remaining_amount,
            notes: self.notes,
        }
    }
}

/// Lending record ready for the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewLendingRecord {
    pub transaction_id: String,
    pub borrower_name: String,
    pub due_date: Option<NaiveDate>,
    pub status: LendingStatus,
    pub original_amount: Decimal,
    pub remaining_amount: Decimal,
    pub notes: Option<String>,
}

/// Chat bound to an application user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatLink {
    pub user_id: String,
    pub chat_id: String,
    pub username: Option<String>,
    pub linked_at: DateTime<Utc>,
}

/// Short-lived code a user sends with `/start` to link a chat
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkCode {
    pub user_id: String,
    pub code: String,
    pub expires_at: DateTime<Utc>,
}

impl LinkCode {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Whole seconds left before expiry, zero once expired
    pub fn expires_in(&self, now: DateTime<Utc>) -> i64 {
        (self.expires_at - now).num_seconds().max(0)
    }
}

/// One message delivered by the chat transport
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InboundMessage {
    pub chat_id: String,
    pub text: String,
    pub username: Option<String>,
}

impl InboundMessage {
    pub fn new(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            text: text.into(),
            username: None,
        }
    }

    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}
