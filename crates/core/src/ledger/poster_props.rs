//! Property-based tests for the ledger poster.
//!
//! Posted entries always balance, and a rejected entry leaves the store
//! exactly as it was.

use caravan_shared::types::{AccountId, CurrencyCode};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::poster::LedgerPoster;
use super::store::LedgerStore;
use super::types::{AccountType, EntryDraft, JournalLine};
use crate::store::{Snapshot, TradingParty, Treasury};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn line(account: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> JournalLine {
    JournalLine {
        id: 0,
        account_id: AccountId::from(account),
        account_type,
        account_name: String::new(),
        debit,
        credit,
        currency_code: CurrencyCode::new("EGP"),
        exchange_rate: Decimal::ONE,
        original_amount: debit - credit,
        cost_center_id: None,
        program_id: None,
        component_id: None,
    }
}

fn draft(lines: Vec<JournalLine>) -> EntryDraft {
    EntryDraft {
        description: "prop".to_string(),
        date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        lines,
        ref_no: None,
    }
}

fn snapshot() -> Snapshot {
    let mut s = Snapshot::new(CurrencyCode::new("EGP"));
    s.treasuries.push(Treasury::new("T1", "Cash", Decimal::ZERO));
    s.customers.push(TradingParty::new("C1", "Customer"));
    s
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A debit split across several lines against one credit posts, and the
    /// stored entry balances with a total equal to the debit side.
    #[test]
    fn prop_posted_entries_balance(parts in prop::collection::vec(positive_amount(), 1..6)) {
        let total: Decimal = parts.iter().copied().sum();
        let mut lines: Vec<_> = parts
            .iter()
            .map(|p| line("C1", AccountType::Customer, *p, Decimal::ZERO))
            .collect();
        lines.push(line("T1", AccountType::Treasury, Decimal::ZERO, total));

        let mut store = snapshot();
        let id = LedgerPoster::default().post(&mut store, draft(lines)).unwrap();

        let entry = store.find_journal_entry(id).unwrap();
        prop_assert!(entry.totals(2).is_balanced);
        prop_assert_eq!(entry.total_amount, total);
        prop_assert_eq!(store.customers[0].balance, total);
        prop_assert_eq!(store.treasuries[0].balance, -total);
    }

    /// Any visible imbalance is rejected without touching the store.
    #[test]
    fn prop_unbalanced_persists_nothing(
        debit in positive_amount(),
        skew in positive_amount(),
    ) {
        let lines = vec![
            line("C1", AccountType::Customer, debit, Decimal::ZERO),
            line("T1", AccountType::Treasury, Decimal::ZERO, debit + skew),
        ];

        let mut store = snapshot();
        let before = store.clone();
        let result = LedgerPoster::default().post(&mut store, draft(lines));

        prop_assert!(result.is_err());
        prop_assert_eq!(store, before);
    }
}
