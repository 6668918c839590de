//! Per-person balances derived from a ledger's transactions
//!
//! Balances are never stored. Every read recomputes them from the full
//! transaction set, so the output depends on nothing but the input slice.
//! Sums saturate at `Decimal::MAX` instead of overflowing.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::mapper::signed_effect;
use crate::models::Transaction;
use crate::types::TransactionType;

// ==================== Person Balance ====================

/// Net position with one counterparty
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonBalance {
    pub name: String,
    /// Positive: they owe the owner. Negative: the owner owes them.
    pub balance: Decimal,
    /// Sum of cash_out amounts
    pub total_lent: Decimal,
    /// Sum of cash_in amounts
    pub total_received: Decimal,
    /// Contributing transactions, newest first
    pub transactions: Vec<Transaction>,
    pub last_transaction_date: DateTime<Utc>,
}

/// Which side of a relationship owes money
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Standing {
    OwesYou,
    YouOwe,
    Settled,
}

impl PersonBalance {
    fn empty(name: &str, first_seen: DateTime<Utc>) -> Self {
        Self {
            name: name.to_string(),
            balance: Decimal::ZERO,
            total_lent: Decimal::ZERO,
            total_received: Decimal::ZERO,
            transactions: Vec::new(),
            last_transaction_date: first_seen,
        }
    }

    pub fn standing(&self) -> Standing {
        if self.balance > Decimal::ZERO {
            Standing::OwesYou
        } else if self.balance < Decimal::ZERO {
            Standing::YouOwe
        } else {
            Standing::Settled
        }
    }
}

// ==================== Aggregator ====================

/// Groups transactions by counterparty and nets them
#[derive(Debug, Clone)]
pub struct BalanceAggregator {
    unknown_person: String,
}

impl Default for BalanceAggregator {
    fn default() -> Self {
        Self::new("Unknown")
    }
}

impl BalanceAggregator {
    /// `unknown_person` names the group for transactions without a person
    pub fn new(unknown_person: impl Into<String>) -> Self {
        Self {
            unknown_person: unknown_person.into(),
        }
    }

    pub fn summarize(&self, transactions: &[Transaction]) -> Vec<PersonBalance> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut balances: Vec<PersonBalance> = Vec::new();

        for tx in transactions {
            let name = self.group_name(tx);
            let slot = match index.get(name) {
                Some(&slot) => slot,
                None => {
                    balances.push(PersonBalance::empty(name, tx.created_at));
                    index.insert(name, balances.len() - 1);
                    balances.len() - 1
                }
            };

            let entry = &mut balances[slot];
            match tx.transaction_type {
                TransactionType::CashOut => {
                    entry.total_lent = entry.total_lent.saturating_add(tx.amount)
                }
                TransactionType::CashIn => {
                    entry.total_received = entry.total_received.saturating_add(tx.amount)
                }
            }
            entry.balance = entry
                .balance
                .saturating_add(signed_effect(tx.transaction_type, tx.amount));
            if tx.created_at > entry.last_transaction_date {
                entry.last_transaction_date = tx.created_at;
            }
            entry.transactions.push(tx.clone());
        }

        for entry in &mut balances {
            entry.transactions.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        }

        // sort_by is stable: equal magnitudes keep first-seen order
        balances.sort_by(|a, b| b.balance.abs().cmp(&a.balance.abs()));
        balances
    }

    fn group_name<'a>(&'a self, tx: &'a Transaction) -> &'a str {
        match tx.person.as_deref() {
            Some(person) if !person.is_empty() => person,
            _ => &self.unknown_person,
        }
    }
}

/// Distinct counterparties in a transaction set, sorted
pub fn people<'a>(transactions: impl IntoIterator<Item = &'a Transaction>) -> Vec<String> {
    transactions
        .into_iter()
        .filter_map(|tx| tx.person.as_deref())
        .filter(|person| !person.is_empty())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

// ==================== Overview ====================

/// Dashboard view over a set of person balances
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LendingsOverview {
    pub they_owe_you: Vec<PersonBalance>,
    pub you_owe_them: Vec<PersonBalance>,
    pub settled: Vec<PersonBalance>,
    pub total_owed_to_you: Decimal,
    pub total_you_owe: Decimal,
    pub net: Decimal,
    pub people_count: usize,
    pub transaction_count: usize,
    /// Every named counterparty in the ledger, sorted, filter or not
    pub people: Vec<String>,
}

impl LendingsOverview {
    /// Split balances by standing, keeping their order
    pub fn from_balances(balances: Vec<PersonBalance>) -> Self {
        let people_count = balances.len();
        let transaction_count = balances.iter().map(|b| b.transactions.len()).sum();
        let people = people(balances.iter().flat_map(|b| b.transactions.iter()));

        let mut they_owe_you = Vec::new();
        let mut you_owe_them = Vec::new();
        let mut settled = Vec::new();
        for balance in balances {
            match balance.standing() {
                Standing::OwesYou => they_owe_you.push(balance),
                Standing::YouOwe => you_owe_them.push(balance),
                Standing::Settled => settled.push(balance),
            }
        }

        let total_owed_to_you = they_owe_you
            .iter()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_add(b.balance));
        let total_you_owe = you_owe_them
            .iter()
            .fold(Decimal::ZERO, |acc, b| acc.saturating_sub(b.balance));

        Self {
            they_owe_you,
            you_owe_them,
            settled,
            total_owed_to_you,
            total_you_owe,
            net: total_owed_to_you.saturating_sub(total_you_owe),
            people_count,
            transaction_count,
            people,
        }
    }

    /// Case-insensitive substring match on the person name
    pub fn filter(balances: Vec<PersonBalance>, query: &str) -> Self {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Self::from_balances(balances);
        }
        let everyone = people(balances.iter().flat_map(|b| b.transactions.iter()));
        let mut overview = Self::from_balances(
            balances
                .into_iter()
                .filter(|b| b.name.to_lowercase().contains(&query))
                .collect(),
        );
        overview.people = everyone;
        overview
    }

    /// Balances in display order: owed to you, you owe, settled
    pub fn iter(&self) -> impl Iterator<Item = &PersonBalance> {
        self.they_owe_you
            .iter()
            .chain(self.you_owe_them.iter())
            .chain(self.settled.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.people_count == 0
    }
}

// ==================== Tests ====================
