//! Collaborator contracts for persistence and chat delivery

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;

use crate::error::CoreResult;
use crate::models::{
    ChatLink, Ledger, LendingRecord, LinkCode, NewLendingRecord, Transaction, TransactionDraft,
};

/// Ledger and transaction persistence
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Find the owner's ledger by name, creating it with the given defaults
    async fn get_or_create_ledger(
        &self,
        owner_id: &str,
        name: &str,
        categories: &[String],
        payment_modes: &[String],
    ) -> CoreResult<Ledger>;

    async fn find_ledger(&self, owner_id: &str, name: &str) -> CoreResult<Option<Ledger>>;

    async fn create_transaction(&self, draft: TransactionDraft) -> CoreResult<Transaction>;

    async fn list_transactions(&self, ledger_id: &str) -> CoreResult<Vec<Transaction>>;
}

/// Lending record persistence
#[async_trait]
pub trait LendingStore: Send + Sync {
    async fn create_lending_record(&self, record: NewLendingRecord) -> CoreResult<LendingRecord>;

    /// Records whose transaction belongs to the ledger
    async fn lending_records(&self, ledger_id: &str) -> CoreResult<Vec<LendingRecord>>;
}

/// Chat-to-user links and the codes that create them
#[async_trait]
pub trait LinkStore: Send + Sync {
    async fn linked_user(&self, chat_id: &str) -> CoreResult<Option<ChatLink>>;

    async fn link_for_user(&self, user_id: &str) -> CoreResult<Option<ChatLink>>;

    /// Replace any outstanding code for the user with a fresh one
    async fn create_link_code(
        &self,
        user_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> CoreResult<LinkCode>;

    async fn verify_and_link(
        &self,
        code: &str,
        chat_id: &str,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<ChatLink>;

    /// Returns whether a link was removed
    async fn unlink(&self, user_id: &str) -> CoreResult<bool>;
}

/// Outbound chat messages
#[async_trait]
pub trait ChatTransport: Send + Sync {
    async fn send(&self, chat_id: &str, text: &str) -> CoreResult<()>;
}

pub type LedgerStoreRef = Arc<dyn LedgerStore>;
pub type LendingStoreRef = Arc<dyn LendingStore>;
pub type LinkStoreRef = Arc<dyn LinkStore>;
pub type ChatTransportRef = Arc<dyn ChatTransport>;
