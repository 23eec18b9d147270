//! Property-based tests for the posting rule table.
//!
//! Every rule that has all its accounts present must produce a balanced
//! set of lines, whatever the amounts and rate.

use caravan_shared::types::{AccountId, CurrencyCode};
use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::rules::build_lines;
use super::transaction::{Category, FundingKind, PartyKind, Transaction, TransactionType};
use crate::ledger::EntryTotals;

/// Strategy to generate amounts (0.00 to 100,000.00).
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy to generate exchange rates (0.0001 to 100.0000).
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

fn category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Flight),
        Just(Category::FlightRefund),
        Just(Category::FlightReissue),
        Just(Category::HajjUmrah),
        Just(Category::GeneralService),
        Just(Category::ExpenseGen),
        Just(Category::Cash),
        Just(Category::PartnerWithdrawal),
        Just(Category::EmployeeAdvance),
        Just(Category::GuaranteeLetter),
        Just(Category::DoubtfulDebt),
        Just(Category::Transfer),
        Just(Category::RefundService),
    ]
}

fn tx_type() -> impl Strategy<Value = TransactionType> {
    prop_oneof![
        Just(TransactionType::Income),
        Just(TransactionType::Expense),
        Just(TransactionType::Transfer),
        Just(TransactionType::AdvancePayment),
        Just(TransactionType::AdvanceDeduction),
        Just(TransactionType::PurchaseOnly),
        Just(TransactionType::RevenueOnly),
    ]
}

fn funding() -> impl Strategy<Value = Option<FundingKind>> {
    prop::option::of(prop_oneof![
        Just(FundingKind::Supplier),
        Just(FundingKind::Customer),
        Just(FundingKind::Treasury),
    ])
}

#[allow(clippy::too_many_arguments)]
fn transaction(
    category: Category,
    tx_type: TransactionType,
    amount: Decimal,
    selling: Decimal,
    purchase: Decimal,
    discount_pct: u8,
    rate: Decimal,
    funding: Option<FundingKind>,
) -> Transaction {
    let mut tx = Transaction::new(
        category,
        tx_type,
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap_or_default(),
        amount,
        CurrencyCode::new("USD"),
    );
    tx.exchange_rate = Some(rate);
    tx.selling_price = selling;
    tx.purchase_price = purchase;
    tx.discount = selling * Decimal::from(discount_pct) / Decimal::ONE_HUNDRED;
    tx.related_entity_id = Some(AccountId::from("PARTY"));
    tx.related_entity_type = Some(PartyKind::Customer);
    tx.target_entity_id = Some(AccountId::from("TARGET"));
    tx.treasury_id = Some(AccountId::from("CASH"));
    tx.supplier_id = Some(AccountId::from("SUPPLIER"));
    tx.supplier_type = funding;
    tx.expense_category = Some(AccountId::from("RENT"));
    tx.employee_id = Some(AccountId::from("EMP"));
    tx.apply_commission = true;
    tx
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Lines built for a fully-referenced transaction always balance at 2 dp.
    #[test]
    fn prop_rule_output_balances(
        category in category(),
        tx_type in tx_type(),
        amount in amount(),
        selling in amount(),
        purchase in amount(),
        discount_pct in 0u8..=100,
        rate in rate(),
        funding in funding(),
        commission in amount(),
    ) {
        let tx = transaction(category, tx_type, amount, selling, purchase, discount_pct, rate, funding);
        let lines = build_lines(&tx, commission);
        let totals = EntryTotals::from_lines(&lines, 2);
        prop_assert!(totals.is_balanced, "debit {} credit {}", totals.debit, totals.credit);
    }

    /// No line is ever emitted with both sides zero, and values carry 2 dp.
    #[test]
    fn prop_lines_are_non_zero_and_rounded(
        category in category(),
        tx_type in tx_type(),
        amount in amount(),
        selling in amount(),
        purchase in amount(),
        rate in rate(),
    ) {
        let tx = transaction(category, tx_type, amount, selling, purchase, 0, rate, None);
        for line in build_lines(&tx, Decimal::ZERO) {
            prop_assert!(!line.is_zero_valued());
            prop_assert!(line.debit.scale() <= 2);
            prop_assert!(line.credit.scale() <= 2);
            prop_assert_eq!(line.exchange_rate, rate);
        }
    }
}
