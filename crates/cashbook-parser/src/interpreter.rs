//! Lending message interpreter

use chrono::NaiveDate;

use crate::amount::parse_amount;
use crate::due_date::resolve_due_date;
use crate::error::ParseError;
use crate::intent::{classify, Classification};
use crate::types::ParsedLending;

/// Minimum tokens for `keyword person amount`
const KEYWORD_MIN_TOKENS: usize = 3;
/// Minimum tokens for legacy `amount person`
const LEGACY_MIN_TOKENS: usize = 2;

/// Turns free text such as `gave john 500 tomorrow` into a [`ParsedLending`]
pub struct MessageInterpreter;

impl MessageInterpreter {
    /// Interpret a message; `None` means "not a lending message"
    pub fn parse(text: &str, today: NaiveDate) -> Option<ParsedLending> {
        Self::try_parse(text, today).ok()
    }

    /// Interpret a message and report why it was rejected
    pub fn try_parse(text: &str, today: NaiveDate) -> Result<ParsedLending, ParseError> {
        let tokens: Vec<&str> = text.split_whitespace().collect();
        let first = tokens.first().ok_or(ParseError::EmptyMessage)?;

        let classification = classify(first).ok_or_else(|| ParseError::UnknownKeyword {
            keyword: first.to_lowercase(),
        })?;

        let (amount, person, rest) = match classification {
            Classification::Keyword(_) => {
                Self::require_tokens(&tokens, KEYWORD_MIN_TOKENS)?;
                let (amount, person) = Self::split_amount_and_person(tokens[1], tokens[2])?;
                (amount, person, &tokens[3..])
            }
            Classification::LegacyAmount(amount) => {
                Self::require_tokens(&tokens, LEGACY_MIN_TOKENS)?;
                (amount, tokens[1], &tokens[2..])
            }
        };

        if !person.chars().any(char::is_alphabetic) {
            return Err(ParseError::MissingPerson);
        }

        let due = if rest.is_empty() {
            None
        } else {
            Some(resolve_due_date(&rest.join(" "), today))
        };

        Ok(ParsedLending {
            amount,
            person_name: capitalize_first(person),
            intent: classification.intent(),
            due,
        })
    }

    fn require_tokens(tokens: &[&str], expected: usize) -> Result<(), ParseError> {
        if tokens.len() < expected {
            return Err(ParseError::TooFewTokens {
                expected,
                actual: tokens.len(),
            });
        }
        Ok(())
    }

    /// Accepts both `person amount` and `amount person` after a keyword
    fn split_amount_and_person<'a>(
        first: &'a str,
        second: &'a str,
    ) -> Result<(rust_decimal::Decimal, &'a str), ParseError> {
        if let (Some(amount), None) = (parse_amount(first), parse_amount(second)) {
            return Ok((amount, second));
        }
        let amount = parse_amount(second).ok_or_else(|| ParseError::InvalidAmount {
            token: second.to_string(),
        })?;
        Ok((amount, first))
    }
}

/// Upper-case the first character, leave the rest untouched
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
