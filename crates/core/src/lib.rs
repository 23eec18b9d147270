//! Core posting engine for Caravan.
//!
//! This crate contains pure business logic with ZERO network or storage dependencies.
//! Every business event flows through one path: normalize currency, compute
//! commission, build journal lines, post them, and apply their effect on
//! party balances.
//!
//! # Modules
//!
//! - `currency` - Exchange-rate resolution and base-currency conversion
//! - `commission` - Employee commission on sales
//! - `posting` - Transactions and the rule table that turns them into lines
//! - `ledger` - Journal entries, posting, balance effects, reference numbers
//! - `lifecycle` - Create/edit/void/delete/restore with audit
//! - `repair` - Idempotent repair and migration passes
//! - `store` - The in-memory tenant snapshot

pub mod commission;
pub mod currency;
pub mod ledger;
pub mod lifecycle;
pub mod posting;
pub mod repair;
pub mod store;

pub use ledger::{LedgerError, LedgerStore};
pub use lifecycle::{Actor, PostingEngine, Role};
pub use store::Snapshot;
