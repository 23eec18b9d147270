//! Business events and the rule table that turns them into journal lines.

pub mod accounts;
pub mod rules;
pub mod transaction;

#[cfg(test)]
mod rules_props;

pub use accounts::{ServiceLine, SystemAccount};
pub use rules::build_lines;
pub use transaction::{Category, FundingKind, PartyKind, Transaction, TransactionType};
