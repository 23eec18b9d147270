//! Currency normalizer: resolves the rate for a transaction and converts
//! amounts into the base currency.
//!
//! Resolution order:
//! 1. an explicit rate greater than zero
//! 2. the rate implied by the related party's opening balance, when that
//!    balance is held in the transaction currency
//! 3. the currency table's rate-to-base
//! 4. one

use caravan_shared::types::CurrencyCode;
use rust_decimal::Decimal;

use crate::ledger::PartyOpening;

/// Stateless currency normalizer.
pub struct CurrencyNormalizer;

impl CurrencyNormalizer {
    /// Resolves the exchange rate to base for a transaction.
    ///
    /// # Arguments
    ///
    /// * `explicit` - Rate given on the transaction, if any
    /// * `party_opening` - Opening balance of the related customer/supplier
    /// * `currency_code` - Transaction currency
    /// * `table_rate` - Rate-to-base from the currency table
    #[must_use]
    pub fn resolve_rate(
        explicit: Option<Decimal>,
        party_opening: Option<&PartyOpening>,
        currency_code: &CurrencyCode,
        table_rate: Option<Decimal>,
    ) -> Decimal {
        if let Some(rate) = explicit.filter(|r| *r > Decimal::ZERO) {
            return rate;
        }

        let implied = party_opening
            .filter(|o| o.currency.as_ref() == Some(currency_code))
            .and_then(PartyOpening::implied_rate)
            .filter(|r| *r > Decimal::ZERO);
        if let Some(rate) = implied {
            return rate;
        }

        table_rate
            .filter(|r| *r > Decimal::ZERO)
            .unwrap_or(Decimal::ONE)
    }

    /// Converts an amount to base currency at full precision.
    #[must_use]
    pub fn normalize(amount: Decimal, rate: Decimal) -> Decimal {
        amount * rate
    }
}
