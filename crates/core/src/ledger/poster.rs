//! Ledger poster: the only path by which journal entries reach the store.
//!
//! Posting validates balance before touching the store, persists the
//! entry, then applies each line's balance effect once in line order.
//! Reversal replays the same effect with the sign flipped.

use caravan_shared::types::{JournalEntryId, LINE_DECIMAL_PLACES};
use rust_decimal::Decimal;

use super::balance::apply_entry_effect;
use super::error::LedgerError;
use super::reference::{RefPrefix, next_ref_no};
use super::store::LedgerStore;
use super::types::{Direction, EntryDraft, EntryTotals, JournalEntry, JournalLine};

/// Posts and reverses journal entries against a [`LedgerStore`].
#[derive(Debug, Clone, Copy)]
pub struct LedgerPoster {
    decimal_places: u32,
}

impl Default for LedgerPoster {
    fn default() -> Self {
        Self::new(LINE_DECIMAL_PLACES)
    }
}

impl LedgerPoster {
    /// Creates a poster comparing totals at `decimal_places`.
    #[must_use]
    pub fn new(decimal_places: u32) -> Self {
        Self { decimal_places }
    }

    /// Validates lines without touching any store.
    ///
    /// # Errors
    ///
    /// Returns `NoJournalLines`, `InvalidExchangeRate`, or `UnbalancedEntry`.
    pub fn validate(&self, lines: &[JournalLine]) -> Result<EntryTotals, LedgerError> {
        if lines.is_empty() {
            return Err(LedgerError::NoJournalLines);
        }

        if let Some(line) = lines.iter().find(|l| l.exchange_rate <= Decimal::ZERO) {
            return Err(LedgerError::InvalidExchangeRate(line.exchange_rate));
        }

        let totals = EntryTotals::from_lines(lines, self.decimal_places);
        if !totals.is_balanced {
            return Err(LedgerError::UnbalancedEntry {
                debit: totals.debit,
                credit: totals.credit,
            });
        }

        Ok(totals)
    }

    /// Posts a new journal entry.
    ///
    /// A `JV` ref is assigned when the draft has none. Nothing is persisted
    /// if validation fails.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn post<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        draft: EntryDraft,
    ) -> Result<JournalEntryId, LedgerError> {
        self.post_as(store, JournalEntryId::new(), draft)
    }

    /// Posts a journal entry under a caller-chosen id.
    ///
    /// Used when an existing entry is replaced and must keep its identity.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if validation fails.
    pub fn post_as<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        id: JournalEntryId,
        draft: EntryDraft,
    ) -> Result<JournalEntryId, LedgerError> {
        let totals = self.validate(&draft.lines)?;

        let ref_no = match draft.ref_no.filter(|r| !r.trim().is_empty()) {
            Some(r) => r,
            None => next_ref_no(
                RefPrefix::Jv,
                store.journal_entries().iter().filter_map(|e| e.ref_no.as_deref()),
            ),
        };

        let lines = draft
            .lines
            .into_iter()
            .zip(0u32..)
            .map(|(line, n)| JournalLine { id: n, ..line })
            .collect();

        let entry = JournalEntry {
            id,
            ref_no: Some(ref_no),
            description: draft.description,
            date: draft.date,
            total_amount: totals.debit,
            lines,
        };

        store.upsert_journal_entry(entry.clone());
        apply_entry_effect(store, &entry, Direction::Apply);

        tracing::info!(
            entry_id = %entry.id,
            ref_no = entry.ref_no.as_deref().unwrap_or_default(),
            lines = entry.lines.len(),
            total = %entry.total_amount,
            "journal entry posted"
        );

        Ok(id)
    }

    /// Undoes every line's effect of an entry. The entry itself is left
    /// in the store.
    pub fn reverse_entry<S: LedgerStore + ?Sized>(&self, store: &mut S, entry: &JournalEntry) {
        apply_entry_effect(store, entry, Direction::Reverse);
        tracing::debug!(entry_id = %entry.id, "journal entry effect reversed");
    }

    /// Reverses and removes an entry, returning what was removed.
    ///
    /// # Errors
    ///
    /// Returns `JournalEntryNotFound` if the entry does not exist.
    pub fn unpost<S: LedgerStore + ?Sized>(
        &self,
        store: &mut S,
        id: JournalEntryId,
    ) -> Result<JournalEntry, LedgerError> {
        let entry = store
            .remove_journal_entry(id)
            .ok_or(LedgerError::JournalEntryNotFound(id))?;
        self.reverse_entry(store, &entry);
        Ok(entry)
    }

    /// Re-inserts a previously removed entry at its old position and
    /// re-applies its effect.
    pub fn repost<S: LedgerStore + ?Sized>(&self, store: &mut S, index: usize, entry: JournalEntry) {
        apply_entry_effect(store, &entry, Direction::Apply);
        tracing::debug!(entry_id = %entry.id, index, "journal entry reposted");
        store.insert_journal_entry(index, entry);
    }
}
