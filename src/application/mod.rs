//! Application layer containing the core credit ledger.
//!
//! This module defines the `CreditLedger`, the concurrency-safe store of
//! payer balances plus the per-payer waiter registry behind blocking
//! threshold notification.

pub mod ledger;
