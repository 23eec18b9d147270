//! Posting engine: the entry point for every change to a tenant's books.
//!
//! The engine owns the store, so each operation runs with exclusive
//! access and balance read-modify-write cannot interleave. Reversal of an
//! old entry always happens before anything new is posted.

use caravan_shared::config::EngineConfig;
use caravan_shared::types::{JournalEntryId, TransactionId};

use super::audit::{AuditAction, AuditEntity, AuditRecord, AuditSink};
use super::policy::LifecyclePolicy;
use super::types::{Actor, LifecycleAction, TransactionState};
use crate::commission::{CommissionCalculator, CommissionInput};
use crate::currency::CurrencyNormalizer;
use crate::ledger::{
    Direction, EntryDraft, JournalEntry, JournalLine, LedgerError, LedgerPoster, LedgerStore,
    RefPrefix, apply_entry_effect, next_ref_no,
};
use crate::posting::{PartyKind, Transaction, build_lines};

/// Creates, edits, voids, deletes, and restores transactions, and manages
/// manual journal entries.
#[derive(Debug)]
pub struct PostingEngine<S, A> {
    store: S,
    audit: A,
    poster: LedgerPoster,
}

impl<S: LedgerStore, A: AuditSink> PostingEngine<S, A> {
    /// Creates an engine with the default 2 dp balance tolerance.
    pub fn new(store: S, audit: A) -> Self {
        Self {
            store,
            audit,
            poster: LedgerPoster::default(),
        }
    }

    /// Creates an engine using the configured balance tolerance.
    pub fn with_config(store: S, audit: A, config: &EngineConfig) -> Self {
        Self {
            store,
            audit,
            poster: LedgerPoster::new(config.balance_tolerance_dp),
        }
    }

    /// The underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Mutable access for maintenance passes.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// The audit sink.
    pub fn audit(&self) -> &A {
        &self.audit
    }

    /// Consumes the engine, returning the store and audit sink.
    pub fn into_parts(self) -> (S, A) {
        (self.store, self.audit)
    }

    /// Resolves the rate, stores base amounts, computes commission, and
    /// builds the journal lines. Touches nothing.
    pub fn prepare(&self, mut tx: Transaction) -> (Transaction, Vec<JournalLine>) {
        let opening = match (tx.related_entity_type, tx.related_entity_id.as_ref()) {
            (Some(kind @ (PartyKind::Customer | PartyKind::Supplier)), Some(id)) => {
                self.store.party_opening(kind, id)
            }
            _ => None,
        };
        let rate = CurrencyNormalizer::resolve_rate(
            tx.exchange_rate,
            opening.as_ref(),
            &tx.currency_code,
            self.store.currency_rate(&tx.currency_code),
        );
        tx.apply_rate(rate);

        let default_rate = tx
            .employee_id
            .as_ref()
            .and_then(|id| self.store.employee_commission_rate(id));
        let commission =
            CommissionCalculator::calculate(&CommissionInput::from_transaction(&tx, default_rate));

        let lines = build_lines(&tx, commission);
        (tx, lines)
    }

    /// Records a new transaction and posts its journal entry.
    ///
    /// The transaction always gets a fresh id, so creating the same value
    /// twice yields two independent records. Nothing is persisted if
    /// posting fails. A transaction whose rule yields no lines is stored
    /// without an entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the built entry does not balance.
    pub fn create(&mut self, tx: Transaction, actor: &Actor) -> Result<TransactionId, LedgerError> {
        let (mut tx, lines) = self.prepare(tx);
        tx.id = TransactionId::new();
        tx.is_voided = false;
        tx.journal_entry_id = None;
        self.ensure_ref_no(&mut tx);

        tx.journal_entry_id = self.post_lines(&tx, lines)?;
        self.store.upsert_transaction(tx.clone());

        tracing::info!(
            tx_id = %tx.id,
            ref_no = tx.ref_no.as_deref().unwrap_or_default(),
            category = ?tx.category,
            "transaction created"
        );
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Create,
                AuditEntity::Transaction,
                tx.id,
                format!("Created transaction: {}", tx.description),
            )
            .with_values(None, to_json(&tx)),
        );

        Ok(tx.id)
    }

    /// Replaces an active transaction, keeping its id and reference number.
    ///
    /// The new lines are validated first, so a rejected edit touches
    /// nothing. Then the old entry's effect is reversed and the entry
    /// removed before the new one is posted.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, `ReasonRequired`,
    /// or the posting error of the new entry.
    pub fn edit(
        &mut self,
        id: TransactionId,
        updated: Transaction,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        let old = self.load(id)?;
        LifecyclePolicy::check_transition(TransactionState::of(&old), LifecycleAction::Edit)?;
        LifecyclePolicy::require_reason(actor, reason)?;

        let mut updated = updated;
        updated.id = id;
        updated.ref_no = non_blank(updated.ref_no).or_else(|| old.ref_no.clone());
        updated.is_voided = false;
        updated.journal_entry_id = None;

        let (mut updated, lines) = self.prepare(updated);
        self.ensure_ref_no(&mut updated);
        if !lines.is_empty() {
            self.poster.validate(&lines)?;
        }

        let removed = self.detach_entry(&old);
        match self.post_lines(&updated, lines) {
            Ok(entry_id) => updated.journal_entry_id = entry_id,
            Err(err) => {
                if let Some((index, entry)) = removed {
                    self.poster.repost(&mut self.store, index, entry);
                }
                tracing::warn!(tx_id = %id, error = %err, "edit rejected; previous entry restored");
                return Err(err);
            }
        }

        self.store.upsert_transaction(updated.clone());

        tracing::info!(tx_id = %id, "transaction edited");
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Update,
                AuditEntity::Transaction,
                id,
                with_reason(format!("Edited transaction: {}", updated.description), reason),
            )
            .with_values(to_json(&old), to_json(&updated)),
        );

        Ok(())
    }

    /// Voids an active transaction: reverses and removes its entry but
    /// keeps the record.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, or `ReasonRequired`.
    pub fn void(
        &mut self,
        id: TransactionId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        let old = self.load(id)?;
        LifecyclePolicy::check_transition(TransactionState::of(&old), LifecycleAction::Void)?;
        LifecyclePolicy::require_reason(actor, reason)?;

        self.detach_entry(&old);

        let mut voided = old.clone();
        voided.is_voided = true;
        voided.journal_entry_id = None;
        self.store.upsert_transaction(voided.clone());

        tracing::info!(tx_id = %id, "transaction voided");
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Void,
                AuditEntity::Transaction,
                id,
                with_reason(format!("Voided transaction: {}", old.description), reason),
            )
            .with_values(to_json(&old), to_json(&voided)),
        );

        Ok(())
    }

    /// Deletes an active or voided transaction, reversing any live entry.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, or `ReasonRequired`.
    pub fn delete(
        &mut self,
        id: TransactionId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        let old = self.load(id)?;
        LifecyclePolicy::check_transition(TransactionState::of(&old), LifecycleAction::Delete)?;
        LifecyclePolicy::require_reason(actor, reason)?;

        self.detach_entry(&old);
        self.store.remove_transaction(id);

        tracing::info!(tx_id = %id, "transaction deleted");
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Delete,
                AuditEntity::Transaction,
                id,
                with_reason(format!("Deleted transaction: {}", old.description), reason),
            )
            .with_values(to_json(&old), None),
        );

        Ok(())
    }

    /// Re-posts a voided transaction from its stored content and rate.
    ///
    /// # Errors
    ///
    /// Returns `TransactionNotFound`, `InvalidTransition`, `ReasonRequired`,
    /// or the posting error of the rebuilt entry.
    pub fn restore(
        &mut self,
        id: TransactionId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        let old = self.load(id)?;
        LifecyclePolicy::check_transition(TransactionState::of(&old), LifecycleAction::Restore)?;
        LifecyclePolicy::require_reason(actor, reason)?;

        let (mut restored, lines) = self.prepare(old.clone());
        restored.is_voided = false;
        restored.journal_entry_id = self.post_lines(&restored, lines)?;
        self.store.upsert_transaction(restored.clone());

        tracing::info!(tx_id = %id, "transaction restored");
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Update,
                AuditEntity::Transaction,
                id,
                with_reason(format!("Restored transaction: {}", old.description), reason),
            )
            .with_values(to_json(&old), to_json(&restored)),
        );

        Ok(())
    }

    /// Posts a manual journal entry.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError` if the entry is empty or does not balance.
    pub fn post_manual_entry(
        &mut self,
        draft: EntryDraft,
        actor: &Actor,
    ) -> Result<JournalEntryId, LedgerError> {
        let id = self.poster.post(&mut self.store, draft)?;

        if let Some(entry) = self.store.find_journal_entry(id) {
            self.audit.record(
                AuditRecord::new(
                    actor,
                    AuditAction::Create,
                    AuditEntity::JournalEntry,
                    id,
                    format!("Posted journal entry: {}", entry.description),
                )
                .with_values(None, to_json(entry)),
            );
        }

        Ok(id)
    }

    /// Replaces the lines of a journal entry, keeping its id, ref, and
    /// position.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired`, `JournalEntryNotFound`, or the validation
    /// error of the new lines; the old entry is untouched on error.
    pub fn edit_journal_entry(
        &mut self,
        id: JournalEntryId,
        draft: EntryDraft,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        LifecyclePolicy::require_reason(actor, reason)?;
        self.poster.validate(&draft.lines)?;

        let old = self
            .store
            .find_journal_entry(id)
            .cloned()
            .ok_or(LedgerError::JournalEntryNotFound(id))?;
        let draft = EntryDraft {
            ref_no: old.ref_no.clone(),
            ..draft
        };

        self.poster.reverse_entry(&mut self.store, &old);
        if let Err(err) = self.poster.post_as(&mut self.store, id, draft) {
            apply_entry_effect(&mut self.store, &old, Direction::Apply);
            return Err(err);
        }

        tracing::info!(entry_id = %id, "journal entry edited");
        let new_value = self.store.find_journal_entry(id).and_then(to_json);
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Update,
                AuditEntity::JournalEntry,
                id,
                with_reason(format!("Edited journal entry: {}", old.description), reason),
            )
            .with_values(to_json(&old), new_value),
        );

        Ok(())
    }

    /// Reverses and removes a journal entry.
    ///
    /// A transaction pointing at the entry loses its back-reference.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` or `JournalEntryNotFound`.
    pub fn delete_journal_entry(
        &mut self,
        id: JournalEntryId,
        actor: &Actor,
        reason: Option<&str>,
    ) -> Result<(), LedgerError> {
        LifecyclePolicy::require_reason(actor, reason)?;
        let old = self.poster.unpost(&mut self.store, id)?;

        let linked = self
            .store
            .transactions()
            .iter()
            .find(|t| t.journal_entry_id == Some(id))
            .cloned();
        if let Some(mut tx) = linked {
            tracing::warn!(tx_id = %tx.id, entry_id = %id, "deleted entry was linked to a transaction");
            tx.journal_entry_id = None;
            self.store.upsert_transaction(tx);
        }

        tracing::info!(entry_id = %id, "journal entry deleted");
        self.audit.record(
            AuditRecord::new(
                actor,
                AuditAction::Delete,
                AuditEntity::JournalEntry,
                id,
                with_reason(format!("Deleted journal entry: {}", old.description), reason),
            )
            .with_values(to_json(&old), None),
        );

        Ok(())
    }

    fn load(&self, id: TransactionId) -> Result<Transaction, LedgerError> {
        self.store
            .find_transaction(id)
            .cloned()
            .ok_or(LedgerError::TransactionNotFound(id))
    }

    fn ensure_ref_no(&self, tx: &mut Transaction) {
        if non_blank(tx.ref_no.clone()).is_some() {
            return;
        }
        let prefix = RefPrefix::for_transaction(tx);
        tx.ref_no = Some(next_ref_no(
            prefix,
            self.store
                .transactions()
                .iter()
                .filter_map(|t| t.ref_no.as_deref()),
        ));
    }

    fn post_lines(
        &mut self,
        tx: &Transaction,
        lines: Vec<JournalLine>,
    ) -> Result<Option<JournalEntryId>, LedgerError> {
        if lines.is_empty() {
            tracing::debug!(tx_id = %tx.id, "no journal lines; stored without entry");
            return Ok(None);
        }

        let draft = EntryDraft {
            description: tx.description.clone(),
            date: tx.date,
            lines,
            ref_no: tx.ref_no.clone(),
        };
        self.poster.post(&mut self.store, draft).map(Some)
    }

    /// Reverses and removes the transaction's entry, if it still exists,
    /// returning it with its former position.
    fn detach_entry(&mut self, tx: &Transaction) -> Option<(usize, JournalEntry)> {
        let entry_id = tx.journal_entry_id?;
        let index = self.store.journal_entry_position(entry_id);
        match self.poster.unpost(&mut self.store, entry_id) {
            Ok(entry) => Some((index.unwrap_or_default(), entry)),
            Err(_) => {
                tracing::warn!(
                    tx_id = %tx.id,
                    entry_id = %entry_id,
                    "journal entry missing; proceeding without reversal"
                );
                None
            }
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn with_reason(details: String, reason: Option<&str>) -> String {
    match reason.map(str::trim).filter(|r| !r.is_empty()) {
        Some(r) => format!("{details} (reason: {r})"),
        None => details,
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Option<String> {
    serde_json::to_string(value).ok()
}
