//! Intent classification from the leading token of a message

use rust_decimal::Decimal;

use crate::amount::parse_amount;
use crate::types::Intent;

/// How the first token of a message was understood
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// An explicit keyword such as `gave` or `got`
    Keyword(Intent),
    /// Legacy `amount person [due]` form; the amount is the first token
    LegacyAmount(Decimal),
}

impl Classification {
    pub fn intent(&self) -> Intent {
        match self {
            Classification::Keyword(intent) => *intent,
            Classification::LegacyAmount(_) => Intent::Lent,
        }
    }
}

/// Map a keyword to its intent, case-insensitively
pub fn keyword_intent(keyword: &str) -> Option<Intent> {
    let intent = match keyword.to_lowercase().as_str() {
        "gave" | "lent" | "give" | "lend" => Intent::Lent,
        "got" | "received" | "get" => Intent::Received,
        "borrowed" | "borrow" => Intent::Borrowed,
        "repaid" | "repay" | "paid" => Intent::Repaid,
        _ => return None,
    };
    Some(intent)
}

/// Classify the first token, falling back to the legacy amount form
pub fn classify(first_token: &str) -> Option<Classification> {
    if let Some(intent) = keyword_intent(first_token) {
        return Some(Classification::Keyword(intent));
    }
    parse_amount(first_token).map(Classification::LegacyAmount)
}
