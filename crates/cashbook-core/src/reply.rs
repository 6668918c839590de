//! Chat reply texts
//!
//! Replies are sent with HTML parse mode, so anything a user typed is
//! escaped before it is embedded.

use cashbook_config::{CurrencyConfig, DigitGrouping};
use cashbook_parser::Intent;
use cashbook_utils::{escape_html, format_indian, format_western};
use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use crate::balances::{LendingsOverview, PersonBalance, Standing};
use crate::error::CoreError;
use crate::models::ChatLink;
use crate::service::RecordedLending;

const LINK_STEPS: &str = "Open CashBook app → Settings → Link Telegram";

/// Builds every user-visible reply
#[derive(Debug, Clone)]
pub struct ReplyComposer {
    currency: CurrencyConfig,
}

impl Default for ReplyComposer {
    fn default() -> Self {
        Self::new(CurrencyConfig::default())
    }
}

impl ReplyComposer {
    pub fn new(currency: CurrencyConfig) -> Self {
        Self { currency }
    }

    /// `₹1,00,000` with the configured symbol and grouping
    pub fn amount(&self, amount: Decimal) -> String {
        let digits = match self.currency.grouping {
            DigitGrouping::Indian => format_indian(amount),
            DigitGrouping::Western => format_western(amount),
        };
        format!("{}{}", self.currency.symbol, digits)
    }

    /// `15 Jan`, with the year only when it differs from `today`
    pub fn due_date(date: NaiveDate, today: NaiveDate) -> String {
        if date.year() == today.year() {
            date.format("%-d %b").to_string()
        } else {
            date.format("%-d %b %Y").to_string()
        }
    }

    // ==================== Onboarding ====================

    pub fn help(&self) -> String {
        [
            "📖 <b>How to record lendings</b>",
            "",
            "<b>You gave money:</b>",
            "• <code>gave john 500 tomorrow</code>",
            "• <code>lent priya 1.5k in 3 days</code>",
            "• <code>500 john 15jan</code>",
            "",
            "<b>Someone paid you back:</b>",
            "• <code>got mary 1000</code>",
            "",
            "<b>You borrowed or repaid:</b>",
            "• <code>borrowed amit 2k next week</code>",
            "• <code>paid amit 500</code>",
            "",
            "<b>Amounts:</b> 500, 1.5k, 2L, ₹1,200",
            "<b>Due dates:</b> today, tomorrow, next week, next month, in 3 days, 15jan, jan 15",
            "",
            "<b>Commands:</b>",
            "/balance [name] - Show who owes what",
            "/status - Check link status",
            "/help - Show this message",
        ]
        .join("\n")
    }

    pub fn welcome_back(&self) -> String {
        format!(
            "👋 Welcome back! You can start recording your lendings.\n\n{}",
            self.help()
        )
    }

    pub fn onboarding(&self) -> String {
        [
            "👋 Welcome to CashBook LENDINGS Bot!",
            "",
            "To get started, you need to link your account:",
            "1. Open CashBook app",
            "2. Go to Settings → Link Telegram",
            "3. Copy the code and send it here",
            "",
            "Example: <code>/start 123456</code>",
        ]
        .join("\n")
    }

    pub fn status(&self, link: Option<&ChatLink>) -> String {
        match link {
            Some(_) => "✅ Your account is linked!\n\nYou can send lending entries directly.".to_string(),
            None => format!("❌ Your account is not linked.\n\n{}", LINK_STEPS),
        }
    }

    pub fn link_required(&self) -> String {
        format!("⚠️ Please link your account first!\n\n{}", LINK_STEPS)
    }

    pub fn link_result(&self, result: &Result<ChatLink, CoreError>) -> String {
        match result {
            Ok(_) => "✅ Account linked successfully!\n\nYou can now send lending entries like:\n<code>gave john 500 tomorrow</code>".to_string(),
            Err(CoreError::LinkCodeInvalid) => {
                "❌ Invalid code. Please generate a new one from the app.".to_string()
            }
            Err(CoreError::LinkCodeExpired) => {
                "⏰ Code expired. Please generate a new one from the app.".to_string()
            }
            Err(CoreError::AlreadyLinked { .. }) => {
                "❌ This Telegram account is already linked to another user.".to_string()
            }
            Err(_) => "❌ Failed to link account. Please try again.".to_string(),
        }
    }

    // ==================== Lendings ====================

    pub fn format_hint(&self) -> String {
        [
            "❓ Could not understand the message.",
            "",
            "<b>Format:</b> <code>gave name amount due_date</code>",
            "<b>Example:</b> <code>gave john 500 tomorrow</code>",
            "",
            "Send /help for more info.",
        ]
        .join("\n")
    }

    pub fn recorded(&self, recorded: &RecordedLending, today: NaiveDate) -> String {
        let parsed = &recorded.parsed;
        let name = escape_html(&parsed.person_name);
        let amount = self.amount(parsed.amount);
        let action = match parsed.intent {
            Intent::Lent => format!("Lent {} to {}", amount, name),
            Intent::Repaid => format!("Repaid {} to {}", amount, name),
            Intent::Received => format!("Received {} from {}", amount, name),
            Intent::Borrowed => format!("Borrowed {} from {}", amount, name),
        };

        let mut reply = format!("✅ Recorded: {}", action);
        if parsed.intent.is_debt_creating() {
            if let Some(date) = parsed.due_date() {
                reply.push_str(&format!("\n📅 Due: {}", Self::due_date(date, today)));
            } else if let Some(note) = parsed.unresolved_due_text() {
                reply.push_str(&format!("\n📝 Note: {}", escape_html(note)));
            }
        }
        reply
    }

    pub fn record_failed(&self, error: &CoreError) -> String {
        match error {
            CoreError::LedgerUnavailable { name } => {
                format!("❌ Failed to access {} ledger.", escape_html(name))
            }
            _ => "❌ Failed to create transaction.".to_string(),
        }
    }

    pub fn balances(&self, overview: &LendingsOverview, query: Option<&str>) -> String {
        if overview.is_empty() {
            return match query {
                Some(q) if overview.people.is_empty() => {
                    format!("No balances found for \"{}\".", escape_html(q))
                }
                Some(q) => format!(
                    "No balances found for \"{}\".\nPeople: {}",
                    escape_html(q),
                    escape_html(&overview.people.join(", "))
                ),
                None => "No lending entries yet. Send /help to get started.".to_string(),
            };
        }

        let mut lines = vec!["📊 <b>Balances</b>".to_string(), String::new()];
        lines.extend(overview.iter().map(|b| self.balance_line(b)));
        lines.push(String::new());
        lines.push(format!(
            "Owed to you: {}\nYou owe: {}",
            self.amount(overview.total_owed_to_you),
            self.amount(overview.total_you_owe)
        ));
        lines.join("\n")
    }

    fn balance_line(&self, balance: &PersonBalance) -> String {
        let name = escape_html(&balance.name);
        match balance.standing() {
            Standing::OwesYou => format!("• {} owes you {}", name, self.amount(balance.balance)),
            Standing::YouOwe => format!("• You owe {} {}", name, self.amount(balance.balance.abs())),
            Standing::Settled => format!("• {} is settled", name),
        }
    }

    pub fn internal_error(&self) -> String {
        "❌ An error occurred. Please try again.".to_string()
    }
}
