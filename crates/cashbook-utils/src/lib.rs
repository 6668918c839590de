//! Utility functions and helpers

use rust_decimal::Decimal;

/// Format an amount with Indian digit grouping (`1,00,000.5`)
pub fn format_indian(amount: Decimal) -> String {
    format_grouped(amount, group_indian)
}

/// Format an amount with Western digit grouping (`100,000.5`)
pub fn format_western(amount: Decimal) -> String {
    format_grouped(amount, group_western)
}

/// Round to paise, drop trailing zeros, then group the integer part
fn format_grouped(amount: Decimal, group: fn(&str) -> String) -> String {
    let rounded = amount.round_dp(2).normalize();
    let text = rounded.abs().to_string();
    let (int_part, frac_part) = match text.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (text.as_str(), None),
    };

    let mut result = String::new();
    if rounded.is_sign_negative() && !rounded.is_zero() {
        result.push('-');
    }
    result.push_str(&group(int_part));
    if let Some(frac) = frac_part {
        result.push('.');
        result.push_str(frac);
    }
    result
}

/// 1234567 -> 1,234,567
fn group_western(digits: &str) -> String {
    let mut result = String::new();
    let mut count = 0;
    for c in digits.chars().rev() {
        if count == 3 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    result.chars().rev().collect()
}

/// 1234567 -> 12,34,567
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut result = String::new();
    let mut count = 0;
    for c in head.chars().rev() {
        if count == 2 {
            result.push(',');
            count = 0;
        }
        result.push(c);
        count += 1;
    }
    let head: String = result.chars().rev().collect();
    format!("{},{}", head, tail)
}

/// Escape text for Telegram's HTML parse mode
pub fn escape_html(content: &str) -> String {
    let mut escaped = String::with_capacity(content.len());
    for c in content.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
