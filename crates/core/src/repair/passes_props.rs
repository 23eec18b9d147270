//! Property-based tests for repair idempotence.

use caravan_shared::types::{AccountId, CurrencyCode, JournalEntryId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::passes::run_all;
use super::types::MigrationState;
use crate::ledger::{AccountType, JournalEntry, JournalLine};
use crate::posting::{Category, Transaction, TransactionType};
use crate::store::{Snapshot, TradingParty, Treasury};

/// Strategy to generate amounts (0.01 to 50,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..5_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy to generate exchange rates (0.5000 to 60.0000).
fn rate() -> impl Strategy<Value = Decimal> {
    (5_000i64..600_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn zero_line(account: &str, account_type: AccountType, rate: Decimal) -> JournalLine {
    JournalLine {
        id: 0,
        account_id: AccountId::from(account),
        account_type,
        account_name: String::new(),
        debit: Decimal::ZERO,
        credit: Decimal::ZERO,
        currency_code: CurrencyCode::new("USD"),
        exchange_rate: rate,
        original_amount: Decimal::ZERO,
        cost_center_id: None,
        program_id: None,
        component_id: None,
    }
}

/// A legacy snapshot: broken purchase and sale entries, refs missing,
/// currency balances absent.
fn legacy_snapshot(purchase: Decimal, selling: Decimal, rate: Decimal) -> Snapshot {
    let mut s = Snapshot::new(CurrencyCode::new("EGP"));
    s.treasuries.push(Treasury::new("T1", "Cash", Decimal::ZERO));
    let mut customer = TradingParty::new("C1", "Customer");
    customer.currency_balance = None;
    s.customers.push(customer);
    let mut supplier = TradingParty::new("S1", "Supplier");
    supplier.currency_balance = None;
    s.suppliers.push(supplier);

    let date = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default();
    let specs = [
        (
            TransactionType::PurchaseOnly,
            vec![
                zero_line("HAJJ_UMRAH_COST", AccountType::Expense, rate),
                zero_line("S1", AccountType::Supplier, rate),
            ],
        ),
        (
            TransactionType::RevenueOnly,
            vec![
                zero_line("C1", AccountType::Customer, rate),
                zero_line("HAJJ_UMRAH_REVENUE", AccountType::Revenue, rate),
            ],
        ),
    ];

    for (tx_type, lines) in specs {
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            ref_no: None,
            description: "legacy".to_string(),
            date,
            total_amount: Decimal::ZERO,
            lines,
        };
        let mut tx = Transaction::new(
            Category::HajjUmrah,
            tx_type,
            date,
            Decimal::ZERO,
            CurrencyCode::new("USD"),
        );
        tx.purchase_price = purchase;
        tx.selling_price = selling;
        tx.exchange_rate = Some(rate);
        tx.journal_entry_id = Some(entry.id);
        s.transactions.push(tx);
        s.journal_entries.push(entry);
    }
    s
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A second run, even with fresh migration flags, changes nothing.
    #[test]
    fn prop_repair_is_idempotent(
        purchase in amount(),
        selling in amount(),
        rate in rate(),
    ) {
        let mut snapshot = legacy_snapshot(purchase, selling, rate);

        let first = run_all(&mut snapshot, &mut MigrationState::default());
        prop_assert!(first.changed());
        let after_first = snapshot.clone();

        let second = run_all(&mut snapshot, &mut MigrationState::default());
        prop_assert!(!second.changed());
        prop_assert_eq!(snapshot, after_first);
    }

    /// Repaired entries balance and contain no zero-valued lines.
    #[test]
    fn prop_repaired_entries_balance(
        purchase in amount(),
        selling in amount(),
        rate in rate(),
    ) {
        let mut snapshot = legacy_snapshot(purchase, selling, rate);
        run_all(&mut snapshot, &mut MigrationState::default());

        for entry in &snapshot.journal_entries {
            prop_assert!(!entry.has_zero_lines());
            prop_assert!(entry.totals(2).is_balanced);
            prop_assert!(entry.ref_no.is_some());
        }
    }
}
