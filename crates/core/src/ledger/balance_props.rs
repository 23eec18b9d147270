//! Property-based tests for balance effects.
//!
//! Applying then reversing any entry restores every party balance.

use caravan_shared::types::{AccountId, CurrencyCode, JournalEntryId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::{apply_entry_effect, effect_of};
use super::types::{AccountType, Direction, JournalEntry, JournalLine};
use crate::store::{Employee, Partner, Snapshot, TradingParty, Treasury};

/// Strategy to generate line amounts (0.00 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy to pick an account and its type.
fn account() -> impl Strategy<Value = (&'static str, AccountType)> {
    prop_oneof![
        Just(("T1", AccountType::Treasury)),
        Just(("C1", AccountType::Customer)),
        Just(("S1", AccountType::Supplier)),
        Just(("E1", AccountType::Liability)),
        Just(("E1", AccountType::EmployeeAdvance)),
        Just(("P1", AccountType::Partner)),
        Just(("REV", AccountType::Revenue)),
        Just(("UNKNOWN", AccountType::Customer)),
    ]
}

fn line_strategy() -> impl Strategy<Value = JournalLine> {
    (account(), amount(), amount(), (1i64..100_000i64)).prop_map(
        |((id, account_type), debit, credit, rate)| {
            let exchange_rate = Decimal::new(rate, 3);
            JournalLine {
                id: 0,
                account_id: AccountId::from(id),
                account_type,
                account_name: String::new(),
                debit,
                credit,
                currency_code: CurrencyCode::new("USD"),
                exchange_rate,
                original_amount: ((debit - credit) / exchange_rate).round_dp(4),
                cost_center_id: None,
                program_id: None,
                component_id: None,
            }
        },
    )
}

fn snapshot() -> Snapshot {
    let mut s = Snapshot::new(CurrencyCode::new("EGP"));
    s.treasuries.push(Treasury::new("T1", "Cash", Decimal::new(50_000, 0)));
    s.customers.push(TradingParty::new("C1", "Customer"));
    s.suppliers.push(TradingParty::new("S1", "Supplier"));
    s.employees.push(Employee::new("E1", "Employee", Decimal::ZERO));
    s.partners.push(Partner::new("P1", "Partner", Decimal::ZERO));
    s
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Apply followed by reverse leaves every balance unchanged.
    #[test]
    fn prop_reversal_symmetry(lines in prop::collection::vec(line_strategy(), 1..8)) {
        let mut store = snapshot();
        let before = store.clone();
        let entry = JournalEntry {
            id: JournalEntryId::new(),
            ref_no: None,
            description: "prop".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            total_amount: Decimal::ZERO,
            lines,
        };

        apply_entry_effect(&mut store, &entry, Direction::Apply);
        apply_entry_effect(&mut store, &entry, Direction::Reverse);

        prop_assert_eq!(store, before);
    }

    /// Reverse adjustments are the exact negation of apply adjustments.
    #[test]
    fn prop_reverse_negates_apply(line in line_strategy()) {
        let applied = effect_of(&line, Direction::Apply);
        let reversed = effect_of(&line, Direction::Reverse);

        prop_assert_eq!(applied.len(), reversed.len());
        for (a, r) in applied.iter().zip(&reversed) {
            prop_assert_eq!(a.kind, r.kind);
            prop_assert_eq!(a.delta, -r.delta);
        }
    }
}
