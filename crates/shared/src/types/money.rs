//! Currency codes and money rounding.
//!
//! CRITICAL: Never use floating-point for money calculations.
//! Amounts are `rust_decimal::Decimal` everywhere.

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// Number of decimal places stored on journal lines.
pub const LINE_DECIMAL_PLACES: u32 = 2;

/// ISO 4217 currency code as configured by the tenant (e.g. "EGP", "SAR").
///
/// Tenants maintain their own currency table, so the code is open-ended
/// rather than a closed enum. Codes are normalized to upper case.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Creates a currency code, upper-casing the input.
    #[must_use]
    pub fn new(code: &str) -> Self {
        Self(code.trim().to_uppercase())
    }

    /// Returns the code as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for CurrencyCode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        if code.len() == 3 && code.chars().all(|c| c.is_ascii_alphabetic()) {
            Ok(Self::new(code))
        } else {
            Err(format!("Unknown currency: {s}"))
        }
    }
}

impl From<&str> for CurrencyCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Rounds a monetary value to the precision stored on journal lines.
///
/// Midpoints round away from zero, matching the amounts already present in
/// tenant ledgers.
#[must_use]
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(LINE_DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}
