//! Double-entry bookkeeping logic.
//!
//! This module implements the core ledger functionality:
//! - Journal entry and line types
//! - Party balance effects and their reversal
//! - The posting path with balance validation
//! - Reference number sequencing
//! - The store seam the engine works against

pub mod balance;
pub mod error;
pub mod poster;
pub mod reference;
pub mod store;
pub mod types;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod poster_props;

pub use balance::{BalanceAdjustment, BalanceKind, apply_effect, apply_entry_effect, effect_of};
pub use error::LedgerError;
pub use poster::LedgerPoster;
pub use reference::{RefPrefix, duplicate_ref_nos, next_ref_no};
pub use store::{LedgerStore, PartyOpening};
pub use types::{AccountType, Direction, EntryDraft, EntryTotals, JournalEntry, JournalLine};
