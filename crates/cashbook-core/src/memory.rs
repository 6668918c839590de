//! In-memory store used by the server and by tests

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::models::{
    ChatLink, Ledger, LendingRecord, LinkCode, NewLendingRecord, Transaction, TransactionDraft,
};
use crate::store::{LedgerStore, LendingStore, LinkStore};

#[derive(Debug, Default)]
struct MemoryState {
    ledgers: Vec<Ledger>,
    transactions: Vec<Transaction>,
    lendings: Vec<LendingRecord>,
    /// chat_id -> link
    links: HashMap<String, ChatLink>,
    /// code -> pending link code
    codes: HashMap<String, LinkCode>,
}

/// Implements every store trait over one lock
#[derive(Debug, Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn new_id() -> String {
        Uuid::new_v4().to_string()
    }

    fn new_code() -> String {
        format!("{:06}", 100_000 + OsRng.next_u32() % 900_000)
    }
}

#[async_trait]
impl LedgerStore for MemoryStore {
    async fn get_or_create_ledger(
        &self,
        owner_id: &str,
        name: &str,
        categories: &[String],
        payment_modes: &[String],
    ) -> CoreResult<Ledger> {
        let mut state = self.state.write().await;
        if let Some(ledger) = state
            .ledgers
            .iter()
            .find(|l| l.owner_id == owner_id && l.name == name)
        {
            return Ok(ledger.clone());
        }

        let ledger = Ledger {
            id: Self::new_id(),
            name: name.to_string(),
            categories: categories.to_vec(),
            payment_modes: payment_modes.to_vec(),
            owner_id: owner_id.to_string(),
            created_at: Utc::now(),
        };
        log::info!("Created ledger '{}' for user {}", name, owner_id);
        state.ledgers.push(ledger.clone());
        Ok(ledger)
    }

    async fn find_ledger(&self, owner_id: &str, name: &str) -> CoreResult<Option<Ledger>> {
        let state = self.state.read().await;
        Ok(state
            .ledgers
            .iter()
            .find(|l| l.owner_id == owner_id && l.name == name)
            .cloned())
    }

    async fn create_transaction(&self, draft: TransactionDraft) -> CoreResult<Transaction> {
        draft.validate()?;
        let mut state = self.state.write().await;
        if !state.ledgers.iter().any(|l| l.id == draft.ledger_id) {
            return Err(CoreError::store(format!("unknown ledger {}", draft.ledger_id)));
        }

        let transaction = Transaction {
            id: Self::new_id(),
            ledger_id: draft.ledger_id,
            created_at: Utc::now(),
            transaction_type: draft.transaction_type,
            amount: draft.amount,
            title: draft.title,
            category: draft.category,
            payment_mode: draft.payment_mode,
            person: draft.person,
        };
        state.transactions.push(transaction.clone());
        Ok(transaction)
    }

    async fn list_transactions(&self, ledger_id: &str) -> CoreResult<Vec<Transaction>> {
        let state = self.state.read().await;
        Ok(state
            .transactions
            .iter()
            .filter(|t| t.ledger_id == ledger_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LendingStore for MemoryStore {
    async fn create_lending_record(&self, record: NewLendingRecord) -> CoreResult<LendingRecord> {
        let mut state = self.state.write().await;
        if !state.transactions.iter().any(|t| t.id == record.transaction_id) {
            return Err(CoreError::store(format!(
                "unknown transaction {}",
                record.transaction_id
            )));
        }
        if state.lendings.iter().any(|l| l.transaction_id == record.transaction_id) {
            return Err(CoreError::store(format!(
                "transaction {} already has a lending record",
                record.transaction_id
            )));
        }

        let lending = LendingRecord {
            id: Self::new_id(),
            transaction_id: record.transaction_id,
            borrower_name: record.borrower_name,
            due_date: record.due_date,
            status: record.status,
            original_amount: record.original_amount,
            remaining_amount: record.remaining_amount,
            notes: record.notes,
            created_at: Utc::now(),
        };
        state.lendings.push(lending.clone());
        Ok(lending)
    }

    async fn lending_records(&self, ledger_id: &str) -> CoreResult<Vec<LendingRecord>> {
        let state = self.state.read().await;
        Ok(state
            .lendings
            .iter()
            .filter(|l| {
                state
                    .transactions
                    .iter()
                    .any(|t| t.id == l.transaction_id && t.ledger_id == ledger_id)
            })
            .cloned()
            .collect())
    }
}

#[async_trait]
impl LinkStore for MemoryStore {
    async fn linked_user(&self, chat_id: &str) -> CoreResult<Option<ChatLink>> {
        let state = self.state.read().await;
        Ok(state.links.get(chat_id).cloned())
    }

    async fn link_for_user(&self, user_id: &str) -> CoreResult<Option<ChatLink>> {
        let state = self.state.read().await;
        Ok(state.links.values().find(|l| l.user_id == user_id).cloned())
    }

    async fn create_link_code(
        &self,
        user_id: &str,
        ttl: Duration,
        now: DateTime<Utc>,
    ) -> CoreResult<LinkCode> {
        let mut state = self.state.write().await;
        state.codes.retain(|_, c| c.user_id != user_id && !c.is_expired(now));

        let mut code = Self::new_code();
        while state.codes.contains_key(&code) {
            code = Self::new_code();
        }

        let link_code = LinkCode {
            user_id: user_id.to_string(),
            code: code.clone(),
            expires_at: now + ttl,
        };
        state.codes.insert(code, link_code.clone());
        Ok(link_code)
    }

    async fn verify_and_link(
        &self,
        code: &str,
        chat_id: &str,
        username: Option<&str>,
        now: DateTime<Utc>,
    ) -> CoreResult<ChatLink> {
        let mut state = self.state.write().await;
        let link_code = state
            .codes
            .get(code)
            .cloned()
            .ok_or(CoreError::LinkCodeInvalid)?;

        if link_code.is_expired(now) {
            state.codes.remove(code);
            return Err(CoreError::LinkCodeExpired);
        }

        if let Some(existing) = state.links.get(chat_id) {
            if existing.user_id != link_code.user_id {
                return Err(CoreError::AlreadyLinked {
                    chat_id: chat_id.to_string(),
                });
            }
        }

        // one chat per user: relinking moves the user to the new chat
        state.links.retain(|_, l| l.user_id != link_code.user_id);
        let link = ChatLink {
            user_id: link_code.user_id,
            chat_id: chat_id.to_string(),
            username: username.map(str::to_string),
            linked_at: now,
        };
        state.links.insert(chat_id.to_string(), link.clone());
        state.codes.remove(code);
        Ok(link)
    }

    async fn unlink(&self, user_id: &str) -> CoreResult<bool> {
        let mut state = self.state.write().await;
        let before = state.links.len();
        state.links.retain(|_, l| l.user_id != user_id);
        Ok(state.links.len() != before)
    }
}
