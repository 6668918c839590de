//! Due date resolution for the trailing part of a lending message
//!
//! The grammar is deliberately small: relative keywords, `in N days`,
//! `15jan` / `15 jan` and `jan 15`. Anything else stays unresolved and the
//! caller keeps the text as a note.

use chrono::{Datelike, Days, Months, NaiveDate};
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::types::DueTerm;

/// Resolve a due-date fragment against an explicit reference date.
///
/// `text` is lower-cased and trimmed before matching; the original wording is
/// preserved in the returned [`DueTerm`].
pub fn resolve_due_date(text: &str, today: NaiveDate) -> DueTerm {
    let original = text.trim().to_string();
    match resolve_date(&original.to_lowercase(), today) {
        Some(date) => DueTerm::Resolved { date, text: original },
        None => DueTerm::Unresolved { text: original },
    }
}

/// Date for a fragment, or `None` if the grammar does not cover it
pub fn resolve_date(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    let text = text.trim();

    match text {
        "today" => return Some(today),
        "tomorrow" => return today.checked_add_days(Days::new(1)),
        "next week" => return today.checked_add_days(Days::new(7)),
        "next month" => return today.checked_add_months(Months::new(1)),
        _ => {}
    }

    static IN_DAYS: OnceCell<Regex> = OnceCell::new();
    let in_days_regex = IN_DAYS.get_or_init(|| Regex::new(r"^in\s+([0-9]+)\s+days?$").unwrap());
    if let Some(caps) = in_days_regex.captures(text) {
        let days: u64 = caps.get(1)?.as_str().parse().ok()?;
        return today.checked_add_days(Days::new(days));
    }

    // "15jan", "15 jan", "15 january"
    static DAY_MONTH: OnceCell<Regex> = OnceCell::new();
    let day_month_regex = DAY_MONTH.get_or_init(|| Regex::new(r"^([0-9]{1,2})\s*([a-z]+)$").unwrap());
    if let Some(caps) = day_month_regex.captures(text) {
        let day: u32 = caps.get(1)?.as_str().parse().ok()?;
        if let Some(month) = month_number(caps.get(2)?.as_str()) {
            return upcoming_date(today, month, day);
        }
    }

    // "jan 15"
    static MONTH_DAY: OnceCell<Regex> = OnceCell::new();
    let month_day_regex = MONTH_DAY.get_or_init(|| Regex::new(r"^([a-z]+)\s+([0-9]{1,2})$").unwrap());
    if let Some(caps) = month_day_regex.captures(text) {
        let day: u32 = caps.get(2)?.as_str().parse().ok()?;
        if let Some(month) = month_number(caps.get(1)?.as_str()) {
            return upcoming_date(today, month, day);
        }
    }

    None
}

/// Date in the reference year, rolled to next year when already past.
/// `None` when the day does not exist in the chosen year, e.g. 29 Feb.
fn upcoming_date(today: NaiveDate, month: u32, day: u32) -> Option<NaiveDate> {
    let date = NaiveDate::from_ymd_opt(today.year(), month, day)?;
    if date < today {
        NaiveDate::from_ymd_opt(today.year() + 1, month, day)
    } else {
        Some(date)
    }
}

/// Month number (1-12) for an English month name or abbreviation
fn month_number(name: &str) -> Option<u32> {
    let month = match name {
        "jan" | "january" => 1,
        "feb" | "february" => 2,
        "mar" | "march" => 3,
        "apr" | "april" => 4,
        "may" => 5,
        "jun" | "june" => 6,
        "jul" | "july" => 7,
        "aug" | "august" => 8,
        "sep" | "sept" | "september" => 9,
        "oct" | "october" => 10,
        "nov" | "november" => 11,
        "dec" | "december" => 12,
        _ => return None,
    };
    Some(month)
}
