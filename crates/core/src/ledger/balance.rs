//! Party balance effects of journal lines.
//!
//! Every line that posts to a party account moves one or two running
//! balances on that party:
//! - Treasury: balance += net
//! - Customer: balance += net, currency balance += original amount
//! - Supplier: balance -= net, currency balance -= original amount
//! - Liability (employee): balance -= net
//! - Employee advance: advances += net
//! - Partner: balance -= net
//!
//! where `net = debit - credit`. Revenue, expense, and asset lines have no
//! party effect. Reversal applies the same adjustments with the sign flipped.

use caravan_shared::types::AccountId;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::store::LedgerStore;
use super::types::{AccountType, Direction, JournalEntry, JournalLine};

/// A running balance carried by a party account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BalanceKind {
    /// Treasury balance.
    Treasury,
    /// Customer receivable in base currency.
    Customer,
    /// Customer receivable in the customer's own currency.
    CustomerCurrency,
    /// Supplier payable in base currency.
    Supplier,
    /// Supplier payable in the supplier's own currency.
    SupplierCurrency,
    /// Amount owed to an employee.
    Employee,
    /// Advances held by an employee.
    EmployeeAdvances,
    /// Partner current account.
    Partner,
}

/// A signed change to one party balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BalanceAdjustment {
    /// Which balance moves.
    pub kind: BalanceKind,
    /// Signed delta.
    pub delta: Decimal,
}

impl BalanceAdjustment {
    fn new(kind: BalanceKind, delta: Decimal) -> Self {
        Self { kind, delta }
    }
}

/// Computes the balance adjustments a line causes in the given direction.
#[must_use]
pub fn effect_of(line: &JournalLine, direction: Direction) -> Vec<BalanceAdjustment> {
    let factor = direction.factor();
    let net = line.net() * factor;
    let currency_net = line.original_amount * factor;

    match line.account_type {
        AccountType::Treasury => vec![BalanceAdjustment::new(BalanceKind::Treasury, net)],
        AccountType::Customer => vec![
            BalanceAdjustment::new(BalanceKind::Customer, net),
            BalanceAdjustment::new(BalanceKind::CustomerCurrency, currency_net),
        ],
        AccountType::Supplier => vec![
            BalanceAdjustment::new(BalanceKind::Supplier, -net),
            BalanceAdjustment::new(BalanceKind::SupplierCurrency, -currency_net),
        ],
        AccountType::Liability => vec![BalanceAdjustment::new(BalanceKind::Employee, -net)],
        AccountType::EmployeeAdvance => {
            vec![BalanceAdjustment::new(BalanceKind::EmployeeAdvances, net)]
        }
        AccountType::Partner => vec![BalanceAdjustment::new(BalanceKind::Partner, -net)],
        AccountType::Revenue | AccountType::Expense | AccountType::Asset => Vec::new(),
    }
}

/// Applies (or reverses) a single line's effect on the store's party balances.
///
/// Lines without an account id are skipped with a warning; adjustments on
/// accounts the store does not know are ignored.
pub fn apply_effect<S: LedgerStore + ?Sized>(store: &mut S, line: &JournalLine, direction: Direction) {
    if line.account_id.is_blank() {
        tracing::warn!(
            account_type = ?line.account_type,
            "skipping balance effect for line without account id"
        );
        return;
    }

    for adjustment in effect_of(line, direction) {
        if !store.adjust_balance(adjustment.kind, &line.account_id, adjustment.delta) {
            tracing::debug!(
                account_id = %line.account_id,
                kind = ?adjustment.kind,
                "balance adjustment on unknown account ignored"
            );
        }
    }
}

/// Applies (or reverses) the effect of every line of an entry.
pub fn apply_entry_effect<S: LedgerStore + ?Sized>(
    store: &mut S,
    entry: &JournalEntry,
    direction: Direction,
) {
    for line in &entry.lines {
        apply_effect(store, line, direction);
    }
}

/// Sums the net base-currency effect a set of entries has on one account.
#[must_use]
pub fn net_for_account<'a>(
    entries: impl IntoIterator<Item = &'a JournalEntry>,
    account_id: &AccountId,
) -> Decimal {
    entries
        .into_iter()
        .flat_map(|e| e.lines.iter())
        .filter(|l| &l.account_id == account_id)
        .map(JournalLine::net)
        .sum()
}
