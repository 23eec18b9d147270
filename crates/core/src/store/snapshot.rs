//! In-memory tenant snapshot: the default [`LedgerStore`].
//!
//! The same shape is what persistence loads and saves, so every field
//! is serde-friendly and collections stay in creation order.

use caravan_shared::types::{AccountId, CurrencyCode, JournalEntryId, TransactionId};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::accounts::{Currency, Employee, Partner, TradingParty, Treasury, find, find_mut};
use crate::ledger::{BalanceKind, JournalEntry, LedgerStore, PartyOpening};
use crate::lifecycle::AuditRecord;
use crate::posting::{PartyKind, Transaction};

/// The whole state of one tenant.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Snapshot {
    /// Reporting currency.
    pub base_currency: Option<CurrencyCode>,
    /// Currency table.
    pub currencies: Vec<Currency>,
    /// Cash boxes and bank accounts.
    pub treasuries: Vec<Treasury>,
    /// Customers.
    pub customers: Vec<TradingParty>,
    /// Suppliers.
    pub suppliers: Vec<TradingParty>,
    /// Employees.
    pub employees: Vec<Employee>,
    /// Partners.
    pub partners: Vec<Partner>,
    /// Transactions, oldest first.
    pub transactions: Vec<Transaction>,
    /// Journal entries, oldest first.
    pub journal_entries: Vec<JournalEntry>,
    /// Audit trail, oldest first.
    pub audit_log: Vec<AuditRecord>,
    /// Last time the snapshot was saved.
    pub last_updated: Option<DateTime<Utc>>,
}

impl Snapshot {
    /// Creates an empty snapshot for a base currency.
    #[must_use]
    pub fn new(base_currency: CurrencyCode) -> Self {
        Self {
            base_currency: Some(base_currency),
            ..Self::default()
        }
    }

    fn balance_mut(&mut self, kind: BalanceKind, id: &AccountId) -> Option<&mut Decimal> {
        match kind {
            BalanceKind::Treasury => find_mut(&mut self.treasuries, id).map(|t| &mut t.balance),
            BalanceKind::Customer => find_mut(&mut self.customers, id).map(|c| &mut c.balance),
            BalanceKind::CustomerCurrency => find_mut(&mut self.customers, id)
                .map(|c| c.currency_balance.get_or_insert(Decimal::ZERO)),
            BalanceKind::Supplier => find_mut(&mut self.suppliers, id).map(|s| &mut s.balance),
            BalanceKind::SupplierCurrency => find_mut(&mut self.suppliers, id)
                .map(|s| s.currency_balance.get_or_insert(Decimal::ZERO)),
            BalanceKind::Employee => find_mut(&mut self.employees, id).map(|e| &mut e.balance),
            BalanceKind::EmployeeAdvances => {
                find_mut(&mut self.employees, id).map(|e| &mut e.advances)
            }
            BalanceKind::Partner => find_mut(&mut self.partners, id).map(|p| &mut p.balance),
        }
    }
}

fn opening_of(party: &TradingParty) -> PartyOpening {
    PartyOpening {
        amount: party.opening_balance,
        currency: party.opening_balance_currency.clone(),
        amount_in_base: party.opening_balance_in_base,
    }
}

impl LedgerStore for Snapshot {
    fn transactions(&self) -> &[Transaction] {
        &self.transactions
    }

    fn journal_entries(&self) -> &[JournalEntry] {
        &self.journal_entries
    }

    fn upsert_transaction(&mut self, tx: Transaction) {
        match self.transactions.iter_mut().find(|t| t.id == tx.id) {
            Some(slot) => *slot = tx,
            None => self.transactions.push(tx),
        }
    }

    fn remove_transaction(&mut self, id: TransactionId) -> Option<Transaction> {
        let index = self.transactions.iter().position(|t| t.id == id)?;
        Some(self.transactions.remove(index))
    }

    fn upsert_journal_entry(&mut self, entry: JournalEntry) {
        match self.journal_entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None => self.journal_entries.push(entry),
        }
    }

    fn remove_journal_entry(&mut self, id: JournalEntryId) -> Option<JournalEntry> {
        let index = self.journal_entries.iter().position(|e| e.id == id)?;
        Some(self.journal_entries.remove(index))
    }

    fn insert_journal_entry(&mut self, index: usize, entry: JournalEntry) {
        let index = index.min(self.journal_entries.len());
        self.journal_entries.insert(index, entry);
    }

    fn balance(&self, kind: BalanceKind, id: &AccountId) -> Option<Decimal> {
        match kind {
            BalanceKind::Treasury => find(&self.treasuries, id).map(|t| t.balance),
            BalanceKind::Customer => find(&self.customers, id).map(|c| c.balance),
            BalanceKind::CustomerCurrency => {
                find(&self.customers, id).and_then(|c| c.currency_balance)
            }
            BalanceKind::Supplier => find(&self.suppliers, id).map(|s| s.balance),
            BalanceKind::SupplierCurrency => {
                find(&self.suppliers, id).and_then(|s| s.currency_balance)
            }
            BalanceKind::Employee => find(&self.employees, id).map(|e| e.balance),
            BalanceKind::EmployeeAdvances => find(&self.employees, id).map(|e| e.advances),
            BalanceKind::Partner => find(&self.partners, id).map(|p| p.balance),
        }
    }

    fn adjust_balance(&mut self, kind: BalanceKind, id: &AccountId, delta: Decimal) -> bool {
        match self.balance_mut(kind, id) {
            Some(balance) => {
                *balance += delta;
                true
            }
            None => false,
        }
    }

    fn set_balance(&mut self, kind: BalanceKind, id: &AccountId, value: Decimal) -> bool {
        match self.balance_mut(kind, id) {
            Some(balance) => {
                *balance = value;
                true
            }
            None => false,
        }
    }

    fn party_ids(&self, kind: PartyKind) -> Vec<AccountId> {
        match kind {
            PartyKind::Customer => self.customers.iter().map(|c| c.id.clone()).collect(),
            PartyKind::Supplier => self.suppliers.iter().map(|s| s.id.clone()).collect(),
            PartyKind::Employee => self.employees.iter().map(|e| e.id.clone()).collect(),
            PartyKind::Partner => self.partners.iter().map(|p| p.id.clone()).collect(),
            PartyKind::Treasury => self.treasuries.iter().map(|t| t.id.clone()).collect(),
        }
    }

    fn party_opening(&self, kind: PartyKind, id: &AccountId) -> Option<PartyOpening> {
        match kind {
            PartyKind::Customer => find(&self.customers, id).map(opening_of),
            PartyKind::Supplier => find(&self.suppliers, id).map(opening_of),
            PartyKind::Employee | PartyKind::Partner | PartyKind::Treasury => None,
        }
    }

    fn currency_rate(&self, code: &CurrencyCode) -> Option<Decimal> {
        self.currencies
            .iter()
            .find(|c| &c.code == code)
            .map(|c| c.rate_to_base)
    }

    fn employee_commission_rate(&self, id: &AccountId) -> Option<Decimal> {
        find(&self.employees, id).map(|e| e.commission_rate)
    }
}
