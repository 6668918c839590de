//! Route modules for the API server
//!
//! - webhook: Telegram update intake
//! - users: balances, lending records and chat linking per user

pub mod users;
pub mod webhook;
