//! Lending bookkeeping and chat dispatch
//!
//! Interpreted messages are booked into a per-user LENDINGS ledger through
//! the store traits in [`store`]; balances are derived on every read.

pub mod balances;
pub mod bot;
pub mod error;
pub mod mapper;
pub mod memory;
pub mod models;
pub mod reply;
pub mod service;
pub mod store;
pub mod types;

pub use balances::{people, BalanceAggregator, LendingsOverview, PersonBalance, Standing};
pub use bot::{BotDispatcher, Command};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity};
pub use mapper::{IntentBooking, MappedLending, TransactionMapper};
pub use memory::MemoryStore;
pub use models::{
    ChatLink, InboundMessage, Ledger, LendingDraft, LendingRecord, LinkCode, NewLendingRecord,
    Transaction, TransactionDraft,
};
pub use reply::ReplyComposer;
pub use service::{LendingService, RecordedLending};
pub use store::{
    ChatTransport, ChatTransportRef, LedgerStore, LedgerStoreRef, LendingStore, LendingStoreRef,
    LinkStore, LinkStoreRef,
};
pub use types::{LendingStatus, TransactionType};
