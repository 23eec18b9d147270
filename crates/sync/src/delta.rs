//! Record-level changes exchanged between sessions.

use std::collections::HashSet;

use caravan_core::LedgerStore;
use caravan_core::ledger::JournalEntry;
use caravan_core::posting::Transaction;
use caravan_core::store::Snapshot;
use caravan_shared::types::{JournalEntryId, TransactionId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upserted and deleted records since some earlier state.
///
/// Party balances are never carried; receivers recompute them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Delta {
    /// When the sender produced the delta.
    pub sent_at: DateTime<Utc>,
    /// New or changed transactions.
    #[serde(default)]
    pub transactions: Vec<Transaction>,
    /// New or changed journal entries.
    #[serde(default)]
    pub journal_entries: Vec<JournalEntry>,
    /// Transactions removed by the sender.
    #[serde(default)]
    pub deleted_transactions: Vec<TransactionId>,
    /// Journal entries removed by the sender.
    #[serde(default)]
    pub deleted_journal_entries: Vec<JournalEntryId>,
}

impl Delta {
    /// An empty delta stamped now.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sent_at: Utc::now(),
            transactions: Vec::new(),
            journal_entries: Vec::new(),
            deleted_transactions: Vec::new(),
            deleted_journal_entries: Vec::new(),
        }
    }

    /// Changes that turn `before` into `after`.
    #[must_use]
    pub fn between(before: &Snapshot, after: &Snapshot) -> Self {
        let kept_tx: HashSet<TransactionId> = after.transactions.iter().map(|t| t.id).collect();
        let kept_entries: HashSet<JournalEntryId> =
            after.journal_entries.iter().map(|e| e.id).collect();

        Self {
            transactions: after
                .transactions
                .iter()
                .filter(|t| before.find_transaction(t.id) != Some(*t))
                .cloned()
                .collect(),
            journal_entries: after
                .journal_entries
                .iter()
                .filter(|e| before.find_journal_entry(e.id) != Some(*e))
                .cloned()
                .collect(),
            deleted_transactions: before
                .transactions
                .iter()
                .map(|t| t.id)
                .filter(|id| !kept_tx.contains(id))
                .collect(),
            deleted_journal_entries: before
                .journal_entries
                .iter()
                .map(|e| e.id)
                .filter(|id| !kept_entries.contains(id))
                .collect(),
            ..Self::new()
        }
    }

    /// True if the delta carries no change.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
            && self.journal_entries.is_empty()
            && self.deleted_transactions.is_empty()
            && self.deleted_journal_entries.is_empty()
    }
}

impl Default for Delta {
    fn default() -> Self {
        Self::new()
    }
}
