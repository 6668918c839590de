//! Amount token normalization
//!
//! Accepts tokens such as `500`, `₹1,200`, `Rs.2500`, `1.5k`, `2L` or
//! `3lakh` and turns them into a strictly positive [`Decimal`].

use once_cell::sync::OnceCell;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;

const THOUSAND: Decimal = Decimal::from_parts(1_000, 0, 0, false, 0);
const LAKH: Decimal = Decimal::from_parts(100_000, 0, 0, false, 0);

/// Largest accepted amount, 10^15
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(2_764_472_320, 232_830, 0, false, 0);

/// Parse a single token into a positive amount.
///
/// Returns `None` for anything that is not a finite number greater than zero
/// and at most [`MAX_AMOUNT`] once currency symbols and digit-group commas
/// are removed.
pub fn parse_amount(token: &str) -> Option<Decimal> {
    static CURRENCY: OnceCell<Regex> = OnceCell::new();
    let currency_regex = CURRENCY.get_or_init(|| {
        Regex::new(r"(?i)^(?:₹|\$|rs\.?)\s*|\s*(?:₹|\$|rs\.?)$").unwrap()
    });

    static NUMBER: OnceCell<Regex> = OnceCell::new();
    let number_regex = NUMBER.get_or_init(|| {
        Regex::new(r"(?i)^([0-9]+(?:\.[0-9]+)?|\.[0-9]+)(k|lakhs?|lacs?|l)?$").unwrap()
    });

    let without_commas = token.trim().replace(',', "");
    let cleaned = currency_regex.replace_all(&without_commas, "");

    let caps = number_regex.captures(&cleaned)?;
    let digits = caps.get(1)?.as_str();
    let number = if digits.starts_with('.') {
        Decimal::from_str(&format!("0{}", digits)).ok()?
    } else {
        Decimal::from_str(digits).ok()?
    };

    let multiplier = match caps.get(2).map(|m| m.as_str().to_lowercase()) {
        Some(suffix) if suffix == "k" => THOUSAND,
        Some(_) => LAKH,
        None => Decimal::ONE,
    };

    let value = number.checked_mul(multiplier)?.normalize();
    if value > Decimal::ZERO && value <= MAX_AMOUNT {
        Some(value)
    } else {
        None
    }
}
