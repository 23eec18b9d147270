//! Delta merge and local balance recomputation.

use caravan_core::LedgerStore;
use caravan_core::ledger::{Direction, apply_entry_effect};
use caravan_core::store::Snapshot;
use serde::Serialize;

use crate::delta::Delta;

/// What a merge did.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MergeOutcome {
    /// Records inserted or replaced.
    pub upserted: usize,
    /// Records removed.
    pub deleted: usize,
}

/// Merges a remote delta into a local snapshot.
///
/// Last writer wins per record id: an incoming record replaces the local
/// one with the same id. Deletions are applied by id. Balances are then
/// rebuilt from scratch with [`recompute_balances`].
pub fn merge_delta(snapshot: &mut Snapshot, delta: &Delta) -> MergeOutcome {
    let mut outcome = MergeOutcome::default();

    for tx in &delta.transactions {
        snapshot.upsert_transaction(tx.clone());
        outcome.upserted += 1;
    }
    for entry in &delta.journal_entries {
        snapshot.upsert_journal_entry(entry.clone());
        outcome.upserted += 1;
    }
    for id in &delta.deleted_transactions {
        if snapshot.remove_transaction(*id).is_some() {
            outcome.deleted += 1;
        }
    }
    for id in &delta.deleted_journal_entries {
        if snapshot.remove_journal_entry(*id).is_some() {
            outcome.deleted += 1;
        }
    }

    recompute_balances(snapshot);
    snapshot.last_updated = snapshot.last_updated.max(Some(delta.sent_at));

    tracing::info!(
        upserted = outcome.upserted,
        deleted = outcome.deleted,
        "remote delta merged"
    );
    outcome
}

/// Rebuilds every party balance from opening balances and all journal
/// lines.
pub fn recompute_balances(snapshot: &mut Snapshot) {
    for treasury in &mut snapshot.treasuries {
        treasury.balance = treasury.opening_balance;
    }
    for party in snapshot
        .customers
        .iter_mut()
        .chain(snapshot.suppliers.iter_mut())
    {
        party.balance = party.opening_in_base();
        party.currency_balance = Some(party.opening_balance);
    }
    for employee in &mut snapshot.employees {
        employee.balance = employee.opening_balance;
        employee.advances = employee.opening_advances;
    }
    for partner in &mut snapshot.partners {
        partner.balance = partner.opening_balance;
    }

    let entries = std::mem::take(&mut snapshot.journal_entries);
    for entry in &entries {
        apply_entry_effect(snapshot, entry, Direction::Apply);
    }
    snapshot.journal_entries = entries;

    tracing::debug!(
        entries = snapshot.journal_entries.len(),
        "balances recomputed"
    );
}
