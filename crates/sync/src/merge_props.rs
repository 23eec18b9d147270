//! Property-based tests for merge and recomputation.
//!
//! Balances rebuilt from journal lines must equal the balances the engine
//! maintained incrementally, whatever sequence of postings produced them.

use caravan_core::lifecycle::{Actor, NoopAudit, PostingEngine, Role};
use caravan_core::posting::{Category, PartyKind, Transaction, TransactionType};
use caravan_core::store::{Snapshot, TradingParty, Treasury};
use caravan_shared::types::{AccountId, CurrencyCode, UserId};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use crate::delta::Delta;
use crate::merge::{merge_delta, recompute_balances};

/// Strategy to generate amounts (0.01 to 10,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy to generate USD rates (30.00 to 60.00).
fn rate() -> impl Strategy<Value = Decimal> {
    (3_000i64..6_000i64).prop_map(|n| Decimal::new(n, 2))
}

fn base() -> Snapshot {
    let mut s = Snapshot::new(CurrencyCode::new("EGP"));
    s.treasuries.push(Treasury::new("T1", "Cash", Decimal::new(100_000, 0)));
    s.customers.push(TradingParty::new("C1", "Customer"));
    s.suppliers.push(TradingParty::new("S1", "Supplier"));
    s
}

fn cash(income: bool, amount: Decimal, rate: Decimal) -> Transaction {
    let tx_type = if income {
        TransactionType::Income
    } else {
        TransactionType::Expense
    };
    let mut tx = Transaction::new(
        Category::Cash,
        tx_type,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        amount,
        CurrencyCode::new("USD"),
    );
    tx.exchange_rate = Some(rate);
    tx.treasury_id = Some(AccountId::from("T1"));
    if income {
        tx.related_entity_id = Some(AccountId::from("C1"));
        tx.related_entity_type = Some(PartyKind::Customer);
    } else {
        tx.related_entity_id = Some(AccountId::from("S1"));
        tx.related_entity_type = Some(PartyKind::Supplier);
    }
    tx
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Recomputed balances equal incremental ones, voids included.
    #[test]
    fn prop_recompute_equals_incremental(
        postings in prop::collection::vec((any::<bool>(), amount(), rate(), any::<bool>()), 1..10),
    ) {
        let actor = Actor::new(UserId::new(), "Admin", Role::Admin);
        let mut engine = PostingEngine::new(base(), NoopAudit);
        for (income, amount, rate, void) in postings {
            let id = engine.create(cash(income, amount, rate), &actor).unwrap();
            if void {
                engine.void(id, &actor, None).unwrap();
            }
        }

        let incremental = engine.store().clone();
        let mut recomputed = incremental.clone();
        recompute_balances(&mut recomputed);
        prop_assert_eq!(recomputed, incremental);
    }

    /// Merging the delta of a remote session reproduces its balances.
    #[test]
    fn prop_merge_converges(
        postings in prop::collection::vec((any::<bool>(), amount(), rate()), 1..8),
    ) {
        let actor = Actor::new(UserId::new(), "Admin", Role::Admin);
        let mut remote = PostingEngine::new(base(), NoopAudit);
        let local_start = remote.store().clone();
        for (income, amount, rate) in postings {
            remote.create(cash(income, amount, rate), &actor).unwrap();
        }

        let delta = Delta::between(&local_start, remote.store());
        let mut local = local_start;
        merge_delta(&mut local, &delta);

        prop_assert_eq!(&local.treasuries, &remote.store().treasuries);
        prop_assert_eq!(&local.customers, &remote.store().customers);
        prop_assert_eq!(&local.suppliers, &remote.store().suppliers);
    }
}
