//! Property-based tests for commission priority.

use proptest::prelude::*;
use rust_decimal::Decimal;

use super::calculator::{CommissionCalculator, CommissionInput};

/// Strategy to generate positive amounts (0.01 to 10,000.00).
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy to generate percent rates (0.5 to 50.0).
fn percent() -> impl Strategy<Value = Decimal> {
    (5i64..500i64).prop_map(|n| Decimal::new(n, 1))
}

/// Strategy to generate positive exchange rates.
fn rate() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 4))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// A positive explicit amount always wins and is converted at the rate.
    #[test]
    fn prop_explicit_amount_wins(
        explicit in positive_amount(),
        exchange_rate in rate(),
        selling in positive_amount(),
        purchase in positive_amount(),
        pct in percent(),
    ) {
        let input = CommissionInput {
            explicit_amount: Some(explicit),
            has_employee: true,
            apply_commission: true,
            default_rate: Some(pct),
            selling_base: selling,
            purchase_base: purchase,
            exchange_rate,
            ..CommissionInput::default()
        };
        prop_assert_eq!(CommissionCalculator::calculate(&input), explicit * exchange_rate);
    }

    /// Without an explicit amount, a positive margin yields margin * rate / 100.
    #[test]
    fn prop_margin_commission(
        purchase in positive_amount(),
        margin in positive_amount(),
        pct in percent(),
    ) {
        let input = CommissionInput {
            has_employee: true,
            apply_commission: true,
            default_rate: Some(pct),
            selling_base: purchase + margin,
            purchase_base: purchase,
            exchange_rate: Decimal::ONE,
            ..CommissionInput::default()
        };
        prop_assert_eq!(
            CommissionCalculator::calculate(&input),
            margin * pct / Decimal::ONE_HUNDRED
        );
    }

    /// Commission is never negative.
    #[test]
    fn prop_commission_never_negative(
        selling in positive_amount(),
        purchase in positive_amount(),
        pct in percent(),
        purchase_only in any::<bool>(),
    ) {
        let input = CommissionInput {
            has_employee: true,
            apply_commission: true,
            override_rate: Some(pct),
            selling_base: selling,
            purchase_base: purchase,
            purchase_only,
            exchange_rate: Decimal::ONE,
            ..CommissionInput::default()
        };
        prop_assert!(CommissionCalculator::calculate(&input) >= Decimal::ZERO);
    }
}
