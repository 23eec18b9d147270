//! Human-readable reference numbers (`PV-0042`).
//!
//! The next number for a prefix is always derived from persisted records:
//! highest numeric suffix among refs with exactly that prefix, plus one.
//! There is no stored counter, so duplicates can appear under concurrent
//! sessions; they are tolerated and reported by [`duplicate_ref_nos`].

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::posting::{Category, Transaction, TransactionType};

/// Width of the zero-padded numeric part.
pub const REF_NO_DIGITS: usize = 4;

/// Reference number prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RefPrefix {
    /// Receipt voucher.
    Rv,
    /// Payment voucher.
    Pv,
    /// Treasury transfer.
    Trf,
    /// Journal voucher.
    Jv,
    /// Sales invoice.
    Inv,
    /// Anything else.
    Trx,
}

impl RefPrefix {
    /// The textual prefix.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rv => "RV",
            Self::Pv => "PV",
            Self::Trf => "TRF",
            Self::Jv => "JV",
            Self::Inv => "INV",
            Self::Trx => "TRX",
        }
    }

    /// Picks the prefix for a transaction. The type decides first, then
    /// the invoice categories.
    #[must_use]
    pub fn for_transaction(tx: &Transaction) -> Self {
        match tx.tx_type {
            TransactionType::Income => return Self::Rv,
            TransactionType::Expense => return Self::Pv,
            TransactionType::Transfer => return Self::Trf,
            TransactionType::Journal => return Self::Jv,
            _ => {}
        }
        match tx.category {
            Category::Flight
            | Category::FlightRefund
            | Category::FlightReissue
            | Category::HajjUmrah
            | Category::GeneralService => Self::Inv,
            _ => Self::Trx,
        }
    }
}

impl fmt::Display for RefPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Formats `PREFIX-nnnn`.
#[must_use]
pub fn format_ref_no(prefix: RefPrefix, number: u32) -> String {
    format!("{prefix}-{number:0width$}", width = REF_NO_DIGITS)
}

/// Splits a ref into its prefix and numeric suffix.
///
/// Returns `None` for refs without a dash or with a non-numeric suffix.
#[must_use]
pub fn parse_ref_no(ref_no: &str) -> Option<(&str, u32)> {
    let (prefix, number) = ref_no.split_once('-')?;
    Some((prefix, number.parse().ok()?))
}

/// Highest numeric suffix among refs with exactly `prefix`.
#[must_use]
pub fn max_ref_number<'a>(prefix: RefPrefix, existing: impl IntoIterator<Item = &'a str>) -> u32 {
    existing
        .into_iter()
        .filter_map(parse_ref_no)
        .filter(|(p, _)| *p == prefix.as_str())
        .map(|(_, n)| n)
        .max()
        .unwrap_or(0)
}

/// Next ref for `prefix` given the refs already persisted.
///
/// Saturates at `u32::MAX`; the resulting duplicate is left to
/// [`duplicate_ref_nos`].
#[must_use]
pub fn next_ref_no<'a>(prefix: RefPrefix, existing: impl IntoIterator<Item = &'a str>) -> String {
    format_ref_no(prefix, max_ref_number(prefix, existing).saturating_add(1))
}

/// Refs used more than once, with their counts, sorted by ref.
#[must_use]
pub fn duplicate_ref_nos<'a>(refs: impl IntoIterator<Item = &'a str>) -> Vec<(String, usize)> {
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in refs {
        *counts.entry(r).or_default() += 1;
    }
    counts
        .into_iter()
        .filter(|(_, n)| *n > 1)
        .map(|(r, n)| (r.to_string(), n))
        .collect()
}
