//! Property-based tests for rate resolution.

use caravan_shared::types::CurrencyCode;
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::normalizer::CurrencyNormalizer;
use crate::ledger::PartyOpening;

/// Strategy to generate positive exchange rates (0.0001 to 10000.0000).
fn positive_rate() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4))
}

/// Strategy to generate optional rates, including zero and negatives.
fn any_rate() -> impl Strategy<Value = Option<Decimal>> {
    prop::option::of((-1_000_000i64..100_000_000i64).prop_map(|v| Decimal::new(v, 4)))
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The resolved rate is always strictly positive.
    #[test]
    fn prop_resolved_rate_is_positive(
        explicit in any_rate(),
        table in any_rate(),
        opening_amount in -1000i64..1000i64,
        opening_base in -50_000i64..50_000i64,
    ) {
        let usd = CurrencyCode::new("USD");
        let opening = PartyOpening {
            amount: Decimal::from(opening_amount),
            currency: Some(usd.clone()),
            amount_in_base: Decimal::from(opening_base),
        };
        let rate = CurrencyNormalizer::resolve_rate(explicit, Some(&opening), &usd, table);
        prop_assert!(rate > Decimal::ZERO);
    }

    /// A positive explicit rate is returned unchanged whatever else is known.
    #[test]
    fn prop_explicit_rate_has_priority(
        explicit in positive_rate(),
        table in any_rate(),
    ) {
        let rate = CurrencyNormalizer::resolve_rate(
            Some(explicit),
            None,
            &CurrencyCode::new("SAR"),
            table,
        );
        prop_assert_eq!(rate, explicit);
    }
}
