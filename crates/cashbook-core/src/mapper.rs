//! Maps an interpreted message onto ledger drafts

use cashbook_parser::{Intent, ParsedLending};
use rust_decimal::Decimal;

use crate::models::{LendingDraft, TransactionDraft};
use crate::types::{LendingStatus, TransactionType};

/// How one intent is booked
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IntentBooking {
    pub transaction_type: TransactionType,
    pub title_prefix: &'static str,
    pub category: &'static str,
}

impl IntentBooking {
    pub fn for_intent(intent: Intent) -> Self {
        let (transaction_type, title_prefix, category) = match intent {
            Intent::Lent => (TransactionType::CashOut, "Lent to", "Lending"),
            Intent::Repaid => (TransactionType::CashOut, "Repaid to", "Repayment"),
            Intent::Received => (TransactionType::CashIn, "Received from", "Repayment"),
            Intent::Borrowed => (TransactionType::CashIn, "Borrowed from", "Borrowing"),
        };
        Self {
            transaction_type,
            title_prefix,
            category,
        }
    }
}

/// Drafts produced for one message
#[derive(Debug, Clone, PartialEq)]
pub struct MappedLending {
    pub transaction: TransactionDraft,
    /// Only lent and borrowed messages open a lending record
    pub lending: Option<LendingDraft>,
}

/// Builds drafts only; persistence belongs to the stores
#[derive(Debug, Clone)]
pub struct TransactionMapper {
    payment_mode: String,
}

impl Default for TransactionMapper {
    fn default() -> Self {
        Self::new("Cash")
    }
}

impl TransactionMapper {
    pub fn new(payment_mode: impl Into<String>) -> Self {
        Self {
            payment_mode: payment_mode.into(),
        }
    }

    pub fn to_transaction(&self, parsed: &ParsedLending, ledger_id: &str) -> MappedLending {
        let booking = IntentBooking::for_intent(parsed.intent);

        let transaction = TransactionDraft {
            ledger_id: ledger_id.to_string(),
            transaction_type: booking.transaction_type,
            amount: parsed.amount,
            title: format!("{} {}", booking.title_prefix, parsed.person_name),
            category: booking.category.to_string(),
            payment_mode: Some(self.payment_mode.clone()),
            person: Some(parsed.person_name.clone()),
        };

        let lending = parsed
            .intent
            .is_debt_creating()
            .then(|| Self::lending_draft(parsed));

        MappedLending {
            transaction,
            lending,
        }
    }

    fn lending_draft(parsed: &ParsedLending) -> LendingDraft {
        LendingDraft {
            borrower_name: parsed.person_name.clone(),
            due_date: parsed.due_date(),
            status: LendingStatus::Pending,
            original_amount: parsed.amount,
            remaining_amount: parsed.amount,
            notes: parsed.unresolved_due_text().map(str::to_string),
        }
    }
}

/// Net effect of a booking on what the counterparty owes the owner
pub fn signed_effect(transaction_type: TransactionType, amount: Decimal) -> Decimal {
    match transaction_type {
        TransactionType::CashOut => amount,
        TransactionType::CashIn => -amount,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cashbook_parser::{DueTerm, MessageInterpreter};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn parsed(text: &str) -> ParsedLending {
        MessageInterpreter::parse(text, today()).unwrap()
    }

    #[test]
    fn test_booking_table() {
        let cases = [
            (Intent::Lent, TransactionType::CashOut, "Lent to", "Lending"),
            (Intent::Repaid, TransactionType::CashOut, "Repaid to", "Repayment"),
            (Intent::Received, TransactionType::CashIn, "Received from", "Repayment"),
            (Intent::Borrowed, TransactionType::CashIn, "Borrowed from", "Borrowing"),
        ];
        for (intent, transaction_type, prefix, category) in cases {
            let booking = IntentBooking::for_intent(intent);
            assert_eq!(booking.transaction_type, transaction_type);
            assert_eq!(booking.title_prefix, prefix);
            assert_eq!(booking.category, category);
        }
    }

    #[test]
    fn test_borrowed_maps_to_cash_in_with_lending_draft() {
        let mapped = TransactionMapper::default()
            .to_transaction(&parsed("borrowed ravi 2000 jan 20"), "ledger-1");

        assert_eq!(mapped.transaction.transaction_type, TransactionType::CashIn);
        assert_eq!(mapped.transaction.category, "Borrowing");
        assert_eq!(mapped.transaction.title, "Borrowed from Ravi");
        assert_eq!(mapped.transaction.ledger_id, "ledger-1");

        let lending = mapped.lending.unwrap();
        assert_eq!(lending.status, LendingStatus::Pending);
        assert_eq!(lending.original_amount, dec!(2000));
        assert_eq!(lending.remaining_amount, dec!(2000));
        assert_eq!(lending.due_date, NaiveDate::from_ymd_opt(2024, 1, 20));
        assert_eq!(lending.notes, None);
    }

    #[test]
    fn test_repayments_have_no_lending_draft() {
        let mapper = TransactionMapper::default();
        let received = mapper.to_transaction(&parsed("got mary 1000"), "l");
        assert!(received.lending.is_none());
        assert_eq!(received.transaction.title, "Received from Mary");

        let repaid = mapper.to_transaction(&parsed("paid sam 300"), "l");
        assert!(repaid.lending.is_none());
        assert_eq!(repaid.transaction.transaction_type, TransactionType::CashOut);
    }

    #[test]
    fn test_unresolved_due_text_becomes_note() {
        let parsed = parsed("lent sam 300 after diwali");
        assert_eq!(
            parsed.due,
            Some(DueTerm::Unresolved { text: "after diwali".to_string() })
        );
        let lending = TransactionMapper::default()
            .to_transaction(&parsed, "l")
            .lending
            .unwrap();
        assert_eq!(lending.due_date, None);
        assert_eq!(lending.notes.as_deref(), Some("after diwali"));
    }

    #[test]
    fn test_configured_payment_mode() {
        let mapped = TransactionMapper::new("UPI").to_transaction(&parsed("500 john"), "l");
        assert_eq!(mapped.transaction.payment_mode.as_deref(), Some("UPI"));
        assert_eq!(mapped.transaction.person.as_deref(), Some("John"));
        assert_eq!(mapped.transaction.amount, dec!(500));
    }

    #[test]
    fn test_signed_effect() {
        assert_eq!(signed_effect(TransactionType::CashOut, dec!(5)), dec!(5));
        assert_eq!(signed_effect(TransactionType::CashIn, dec!(5)), dec!(-5));
    }
}
