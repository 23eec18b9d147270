//! In-memory tenant state.

pub mod accounts;
pub mod snapshot;

pub use accounts::{Currency, Employee, Partner, TradingParty, Treasury};
pub use snapshot::Snapshot;
