//! The storage seam the posting engine works against.

use caravan_shared::types::{AccountId, CurrencyCode, JournalEntryId, TransactionId};
use rust_decimal::Decimal;

use super::balance::BalanceKind;
use super::types::JournalEntry;
use crate::posting::{PartyKind, Transaction};

/// Opening balance of a customer or supplier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartyOpening {
    /// Opening amount in the party's currency.
    pub amount: Decimal,
    /// The party's currency, when one was recorded.
    pub currency: Option<CurrencyCode>,
    /// Opening amount converted to base currency.
    pub amount_in_base: Decimal,
}

impl PartyOpening {
    /// The rate implied by the opening balance, if both sides are non-zero.
    #[must_use]
    pub fn implied_rate(&self) -> Option<Decimal> {
        if self.amount.is_zero() || self.amount_in_base.is_zero() {
            return None;
        }
        Some(self.amount_in_base / self.amount)
    }
}

/// Collections and party balances of one tenant.
///
/// Collections are kept in creation order, oldest first. Implementations
/// are single-writer: the engine holds `&mut` for the duration of an
/// operation.
pub trait LedgerStore {
    /// All transactions, oldest first.
    fn transactions(&self) -> &[Transaction];

    /// All journal entries, oldest first.
    fn journal_entries(&self) -> &[JournalEntry];

    /// Looks up a transaction by id.
    fn find_transaction(&self, id: TransactionId) -> Option<&Transaction> {
        self.transactions().iter().find(|t| t.id == id)
    }

    /// Looks up a journal entry by id.
    fn find_journal_entry(&self, id: JournalEntryId) -> Option<&JournalEntry> {
        self.journal_entries().iter().find(|e| e.id == id)
    }

    /// Replaces the transaction with the same id in place, or appends it.
    fn upsert_transaction(&mut self, tx: Transaction);

    /// Removes a transaction, returning it if it existed.
    fn remove_transaction(&mut self, id: TransactionId) -> Option<Transaction>;

    /// Replaces the entry with the same id in place, or appends it.
    fn upsert_journal_entry(&mut self, entry: JournalEntry);

    /// Removes a journal entry, returning it if it existed.
    fn remove_journal_entry(&mut self, id: JournalEntryId) -> Option<JournalEntry>;

    /// Inserts an entry at `index`, or appends it when `index` is past the end.
    fn insert_journal_entry(&mut self, index: usize, entry: JournalEntry);

    /// Position of an entry in creation order.
    fn journal_entry_position(&self, id: JournalEntryId) -> Option<usize> {
        self.journal_entries().iter().position(|e| e.id == id)
    }

    /// Reads a party balance. `None` when the account is unknown or the
    /// balance was never recorded.
    fn balance(&self, kind: BalanceKind, id: &AccountId) -> Option<Decimal>;

    /// Adds `delta` to a party balance. Returns false if the account is unknown.
    fn adjust_balance(&mut self, kind: BalanceKind, id: &AccountId, delta: Decimal) -> bool;

    /// Overwrites a party balance. Returns false if the account is unknown.
    fn set_balance(&mut self, kind: BalanceKind, id: &AccountId, value: Decimal) -> bool;

    /// Ids of every party of the given kind.
    fn party_ids(&self, kind: PartyKind) -> Vec<AccountId>;

    /// Opening balance of a customer or supplier.
    fn party_opening(&self, kind: PartyKind, id: &AccountId) -> Option<PartyOpening>;

    /// Configured rate-to-base of a currency.
    fn currency_rate(&self, code: &CurrencyCode) -> Option<Decimal>;

    /// Default commission rate (percent) of an employee.
    fn employee_commission_rate(&self, id: &AccountId) -> Option<Decimal>;
}
