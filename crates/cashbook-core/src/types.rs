//! Basic types for the bookkeeping module

use serde::{Deserialize, Serialize};

/// Direction of a cash movement, seen from the ledger owner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    /// Money came in to the owner
    CashIn,
    /// Money went out from the owner
    CashOut,
}

impl std::str::FromStr for TransactionType {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "cash_in" | "in" => Ok(TransactionType::CashIn),
            "cash_out" | "out" => Ok(TransactionType::CashOut),
            _ => Err(format!("Invalid transaction type: {}", s)),
        }
    }
}

impl std::fmt::Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransactionType::CashIn => write!(f, "cash_in"),
            TransactionType::CashOut => write!(f, "cash_out"),
        }
    }
}

/// Repayment state of a lending record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LendingStatus {
    /// Nothing repaid yet
    Pending,
    /// Partly repaid
    Partial,
    /// Fully repaid
    Settled,
}

impl Default for LendingStatus {
    fn default() -> Self {
        LendingStatus::Pending
    }
}

impl std::str::FromStr for LendingStatus {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(LendingStatus::Pending),
            "partial" => Ok(LendingStatus::Partial),
            "settled" => Ok(LendingStatus::Settled),
            _ => Err(format!("Invalid lending status: {}", s)),
        }
    }
}

impl std::fmt::Display for LendingStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LendingStatus::Pending => write!(f, "pending"),
            LendingStatus::Partial => write!(f, "partial"),
            LendingStatus::Settled => write!(f, "settled"),
        }
    }
}
