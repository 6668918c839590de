//! Lending message parser
//!
//! Turns short chat messages such as `gave john 500 tomorrow` or the legacy
//! `500 john 15jan` into a structured [`ParsedLending`].

use chrono::NaiveDate;
use std::sync::Arc;

pub mod amount;
pub mod due_date;
pub mod error;
pub mod intent;
pub mod interpreter;
pub mod types;

pub use amount::{parse_amount, MAX_AMOUNT};
pub use due_date::{resolve_date, resolve_due_date};
pub use error::ParseError;
pub use intent::{classify, keyword_intent, Classification};
pub use interpreter::{capitalize_first, MessageInterpreter};
pub use types::{DueTerm, Intent, ParsedLending};

// ==================== Parser Trait ====================

/// Parser reference type
pub type ParserRef = Arc<dyn LendingParserTrait>;

/// Trait for lending message parsers
pub trait LendingParserTrait: Send + Sync {
    /// Interpret a message, `None` when it is not a lending message
    fn parse(&self, text: &str, today: NaiveDate) -> Option<ParsedLending> {
        self.try_parse(text, today).ok()
    }

    /// Interpret a message and keep the rejection reason
    fn try_parse(&self, text: &str, today: NaiveDate) -> Result<ParsedLending, ParseError>;
}

/// Default parser implementation
#[derive(Debug, Default)]
pub struct DefaultLendingParser;

impl LendingParserTrait for DefaultLendingParser {
    fn try_parse(&self, text: &str, today: NaiveDate) -> Result<ParsedLending, ParseError> {
        MessageInterpreter::try_parse(text, today)
    }
}
