//! Common types for the lending message parser

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Financial meaning of a lending message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Intent {
    /// Owner gave money; the counterparty now owes the owner
    Lent,
    /// Owner paid back a debt the owner had
    Repaid,
    /// Counterparty paid back a debt owed to the owner
    Received,
    /// Owner took money; the owner now owes the counterparty
    Borrowed,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Lent => "lent",
            Intent::Repaid => "repaid",
            Intent::Received => "received",
            Intent::Borrowed => "borrowed",
        }
    }

    /// Lent and borrowed open a new debt; the other two shrink one
    pub fn is_debt_creating(&self) -> bool {
        matches!(self, Intent::Lent | Intent::Borrowed)
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "lent" => Ok(Intent::Lent),
            "repaid" => Ok(Intent::Repaid),
            "received" => Ok(Intent::Received),
            "borrowed" => Ok(Intent::Borrowed),
            _ => Err(format!("Invalid intent: {}", s)),
        }
    }
}

/// Trailing due-date fragment of a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum DueTerm {
    /// Fragment resolved to an absolute date
    Resolved { date: NaiveDate, text: String },
    /// Fragment kept verbatim because no date could be derived from it
    Unresolved { text: String },
}

impl DueTerm {
    pub fn date(&self) -> Option<NaiveDate> {
        match self {
            DueTerm::Resolved { date, .. } => Some(*date),
            DueTerm::Unresolved { .. } => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            DueTerm::Resolved { text, .. } => text,
            DueTerm::Unresolved { text } => text,
        }
    }
}

/// Structured result of interpreting one lending message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedLending {
    /// Always strictly positive
    pub amount: Decimal,
    /// Counterparty, first character upper-cased
    pub person_name: String,
    pub intent: Intent,
    /// `None` when the message carried no trailing text
    pub due: Option<DueTerm>,
}

impl ParsedLending {
    /// Resolved due date, if any
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.due.as_ref().and_then(DueTerm::date)
    }

    /// Original trailing fragment, whether or not it resolved
    pub fn raw_due_text(&self) -> Option<&str> {
        self.due.as_ref().map(DueTerm::text)
    }

    /// Fragment that did not resolve to a date, kept as a note
    pub fn unresolved_due_text(&self) -> Option<&str> {
        match &self.due {
            Some(DueTerm::Unresolved { text }) => Some(text),
            _ => None,
        }
    }
}
