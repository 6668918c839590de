//! Records interpreted lending messages and reads balances back

use cashbook_config::LendingsConfig;
use cashbook_parser::ParsedLending;

use crate::balances::{BalanceAggregator, LendingsOverview, PersonBalance};
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::mapper::TransactionMapper;
use crate::models::{Ledger, LendingRecord, Transaction};
use crate::store::{LedgerStoreRef, LendingStoreRef};

/// Outcome of recording one message
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedLending {
    pub parsed: ParsedLending,
    pub transaction: Transaction,
    pub lending: Option<LendingRecord>,
    /// Set when the lending record could not be stored; the transaction stands
    pub lending_error: Option<String>,
}

/// Lendings ledger operations for one deployment
pub struct LendingService {
    ledgers: LedgerStoreRef,
    lendings: LendingStoreRef,
    mapper: TransactionMapper,
    aggregator: BalanceAggregator,
    settings: LendingsConfig,
    logger: Box<dyn ErrorLogger>,
}

impl LendingService {
    pub fn new(settings: LendingsConfig, ledgers: LedgerStoreRef, lendings: LendingStoreRef) -> Self {
        Self {
            ledgers,
            lendings,
            mapper: TransactionMapper::new(settings.default_payment_mode.clone()),
            aggregator: BalanceAggregator::new(settings.unknown_person.clone()),
            settings,
            logger: Box::new(DefaultErrorLogger),
        }
    }

    pub fn ledger_name(&self) -> &str {
        &self.settings.ledger_name
    }

    /// The user's lendings ledger, created on first use
    pub async fn lendings_ledger(&self, user_id: &str) -> CoreResult<Ledger> {
        self.ledgers
            .get_or_create_ledger(
                user_id,
                &self.settings.ledger_name,
                &self.settings.categories,
                &self.settings.payment_modes,
            )
            .await
            .map_err(|e| {
                self.logger.log_error(
                    &e,
                    &ErrorContext::new("get_or_create_ledger").with_user_id(user_id),
                );
                CoreError::LedgerUnavailable {
                    name: self.settings.ledger_name.clone(),
                }
            })
    }

    pub async fn record(&self, parsed: &ParsedLending, user_id: &str) -> CoreResult<RecordedLending> {
        let ledger = self.lendings_ledger(user_id).await?;
        let mapped = self.mapper.to_transaction(parsed, &ledger.id);

        let transaction = self
            .ledgers
            .create_transaction(mapped.transaction)
            .await
            .map_err(|e| {
                self.logger.log_error(
                    &e,
                    &ErrorContext::new("create_transaction").with_user_id(user_id),
                );
                e
            })?;

        let mut recorded = RecordedLending {
            parsed: parsed.clone(),
            transaction,
            lending: None,
            lending_error: None,
        };

        if let Some(draft) = mapped.lending {
            let record = draft.for_transaction(&recorded.transaction.id);
            match self.lendings.create_lending_record(record).await {
                Ok(lending) => recorded.lending = Some(lending),
                Err(e) => {
                    self.logger.log_warning(
                        &format!(
                            "lending record for transaction {} not stored: {}",
                            recorded.transaction.id, e
                        ),
                        &ErrorContext::new("create_lending_record").with_user_id(user_id),
                    );
                    recorded.lending_error = Some(e.to_string());
                }
            }
        }

        log::info!(
            "Recorded {} {} for {} (user {})",
            parsed.intent,
            parsed.amount,
            parsed.person_name,
            user_id
        );
        Ok(recorded)
    }

    /// Per-person balances; a user without a ledger has none
    pub async fn balances(&self, user_id: &str) -> CoreResult<Vec<PersonBalance>> {
        let ledger = self
            .ledgers
            .find_ledger(user_id, &self.settings.ledger_name)
            .await?;
        let Some(ledger) = ledger else {
            return Ok(Vec::new());
        };
        let transactions = self.ledgers.list_transactions(&ledger.id).await?;
        Ok(self.aggregator.summarize(&transactions))
    }

    pub async fn overview(&self, user_id: &str, query: Option<&str>) -> CoreResult<LendingsOverview> {
        let balances = self.balances(user_id).await?;
        Ok(match query {
            Some(q) => LendingsOverview::filter(balances, q),
            None => LendingsOverview::from_balances(balances),
        })
    }

    pub async fn lending_records(&self, user_id: &str) -> CoreResult<Vec<LendingRecord>> {
        match self.ledgers.find_ledger(user_id, &self.settings.ledger_name).await? {
            Some(ledger) => self.lendings.lending_records(&ledger.id).await,
            None => Ok(Vec::new()),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::models::{NewLendingRecord, TransactionDraft};
    use crate::store::{LedgerStore, LendingStore};
    use crate::types::{LendingStatus, TransactionType};
    use async_trait::async_trait;
    use cashbook_parser::MessageInterpreter;
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    /// Wraps a MemoryStore and fails the selected operations
    #[derive(Default)]
    pub(crate) struct FlakyStore {
        pub inner: MemoryStore,
        pub fail_ledger: bool,
        pub fail_transaction: bool,
        pub fail_lending: bool,
    }

    #[async_trait]
    impl LedgerStore for FlakyStore {
        async fn get_or_create_ledger(
            &self,
            owner_id: &str,
            name: &str,
            categories: &[String],
            payment_modes: &[String],
        ) -> CoreResult<Ledger> {
            if self.fail_ledger {
                return Err(CoreError::store("ledger table unavailable"));
            }
            self.inner.get_or_create_ledger(owner_id, name, categories, payment_modes).await
        }

        async fn find_ledger(&self, owner_id: &str, name: &str) -> CoreResult<Option<Ledger>> {
            self.inner.find_ledger(owner_id, name).await
        }

        async fn create_transaction(&self, draft: TransactionDraft) -> CoreResult<Transaction> {
            if self.fail_transaction {
                return Err(CoreError::store("insert failed"));
            }
            self.inner.create_transaction(draft).await
        }

        async fn list_transactions(&self, ledger_id: &str) -> CoreResult<Vec<Transaction>> {
            self.inner.list_transactions(ledger_id).await
        }
    }

    #[async_trait]
    impl LendingStore for FlakyStore {
        async fn create_lending_record(&self, record: NewLendingRecord) -> CoreResult<LendingRecord> {
            if self.fail_lending {
                return Err(CoreError::store("lendings table unavailable"));
            }
            self.inner.create_lending_record(record).await
        }

        async fn lending_records(&self, ledger_id: &str) -> CoreResult<Vec<LendingRecord>> {
            self.inner.lending_records(ledger_id).await
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 10).unwrap()
    }

    fn parsed(text: &str) -> ParsedLending {
        MessageInterpreter::parse(text, today()).unwrap()
    }

    fn service(store: Arc<FlakyStore>) -> LendingService {
        LendingService::new(LendingsConfig::default(), store.clone(), store)
    }

    #[tokio::test]
    async fn test_record_lent_creates_transaction_and_lending() {
        let store = Arc::new(FlakyStore::default());
        let service = service(store.clone());

        let recorded = service.record(&parsed("gave john 500 tomorrow"), "u1").await.unwrap();
        assert_eq!(recorded.transaction.transaction_type, TransactionType::CashOut);
        assert_eq!(recorded.transaction.title, "Lent to John");
        assert_eq!(recorded.transaction.payment_mode.as_deref(), Some("Cash"));

        let lending = recorded.lending.unwrap();
        assert_eq!(lending.transaction_id, recorded.transaction.id);
        assert_eq!(lending.status, LendingStatus::Pending);
        assert_eq!(lending.due_date, NaiveDate::from_ymd_opt(2024, 1, 11));

        let ledger = store.inner.find_ledger("u1", "LENDINGS").await.unwrap().unwrap();
        assert_eq!(ledger.categories, LendingsConfig::default().categories);
        assert_eq!(service.lending_records("u1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_record_repayment_has_no_lending() {
        let store = Arc::new(FlakyStore::default());
        let recorded = service(store).record(&parsed("got mary 1000"), "u1").await.unwrap();
        assert!(recorded.lending.is_none());
        assert!(recorded.lending_error.is_none());
    }

    #[tokio::test]
    async fn test_ledger_failure_is_reported() {
        let store = Arc::new(FlakyStore {
            fail_ledger: true,
            ..Default::default()
        });
        let err = service(store).record(&parsed("500 john"), "u1").await.unwrap_err();
        assert_eq!(err, CoreError::LedgerUnavailable { name: "LENDINGS".to_string() });
    }

    #[tokio::test]
    async fn test_transaction_failure_leaves_no_lending_record() {
        let store = Arc::new(FlakyStore {
            fail_transaction: true,
            ..Default::default()
        });
        let service = service(store.clone());

        let err = service.record(&parsed("gave john 500"), "u1").await.unwrap_err();
        assert!(matches!(err, CoreError::Store { .. }));
        assert!(service.lending_records("u1").await.unwrap().is_empty());
        assert!(service.balances("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_lending_failure_keeps_transaction() {
        let store = Arc::new(FlakyStore {
            fail_lending: true,
            ..Default::default()
        });
        let service = service(store);

        let recorded = service.record(&parsed("borrowed ravi 2k"), "u1").await.unwrap();
        assert!(recorded.lending.is_none());
        assert!(recorded.lending_error.unwrap().contains("lendings table unavailable"));

        let balances = service.balances("u1").await.unwrap();
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].balance, dec!(-2000));
    }

    #[tokio::test]
    async fn test_balances_and_overview() {
        let store = Arc::new(FlakyStore::default());
        let service = service(store);
        assert!(service.balances("u1").await.unwrap().is_empty());

        service.record(&parsed("gave john 500"), "u1").await.unwrap();
        service.record(&parsed("got john 200"), "u1").await.unwrap();
        service.record(&parsed("lent mary 100"), "u1").await.unwrap();
        service.record(&parsed("lent zed 999"), "u2").await.unwrap();

        let balances = service.balances("u1").await.unwrap();
        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].name, "John");
        assert_eq!(balances[0].balance, dec!(300));

        let overview = service.overview("u1", Some("mar")).await.unwrap();
        assert_eq!(overview.people_count, 1);
        assert_eq!(overview.total_owed_to_you, dec!(100));
    }

    #[tokio::test]
    async fn test_oversized_amounts_never_reach_balances() {
        let store = Arc::new(FlakyStore::default());
        let service = service(store);

        let text = "gave john 79228162514264337593543950335";
        assert!(MessageInterpreter::parse(text, today()).is_none());

        let mut huge = parsed("gave john 500");
        huge.amount = rust_decimal::Decimal::MAX;
        let err = service.record(&huge, "u1").await.unwrap_err();
        assert!(matches!(err, CoreError::InvalidDraft { .. }));

        let largest = parsed("gave john 10000000000L");
        service.record(&largest, "u1").await.unwrap();
        service.record(&largest, "u1").await.unwrap();

        let balances = service.balances("u1").await.unwrap();
        assert_eq!(balances[0].balance, dec!(2000000000000000));
        let overview = service.overview("u1", None).await.unwrap();
        assert_eq!(overview.total_owed_to_you, dec!(2000000000000000));
    }
}
