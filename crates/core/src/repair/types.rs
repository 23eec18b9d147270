//! Repair pass bookkeeping.

use serde::Serialize;

/// Which passes already ran in this process.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MigrationState {
    /// Zero-line repair ran.
    pub repaired: bool,
    /// Reference-number migration ran.
    pub ref_nos_migrated: bool,
    /// Currency-balance backfill ran.
    pub currency_balances_backfilled: bool,
}

/// Outcome of the zero-line repair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ZeroLineRepair {
    /// Zero-valued lines rewritten.
    pub lines: usize,
    /// Broken entries left alone because no transaction references them.
    pub stale_entries: usize,
}

/// Counts from the reference-number migration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefMigration {
    /// Transactions that received a ref.
    pub transactions: usize,
    /// Journal entries that received a ref.
    pub journal_entries: usize,
}

/// What a full repair run changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RepairReport {
    /// Zero-line repair outcome.
    pub zero_lines: ZeroLineRepair,
    /// Refs assigned by the migration.
    pub refs: RefMigration,
    /// Party currency balances filled in.
    pub currency_balances_backfilled: usize,
    /// Refs used more than once, with counts. Reported, never fixed.
    pub duplicate_ref_nos: Vec<(String, usize)>,
}

impl RepairReport {
    /// True if the run modified the store.
    #[must_use]
    pub fn changed(&self) -> bool {
        self.zero_lines.lines > 0
            || self.refs.transactions > 0
            || self.refs.journal_entries > 0
            || self.currency_balances_backfilled > 0
    }
}
