//! Ledger error types for posting, lifecycle, and lookup failures.

use caravan_shared::AppError;
use caravan_shared::types::{JournalEntryId, TransactionId};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::lifecycle::TransactionState;

/// Errors that can occur during ledger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // ========== Validation Errors ==========
    /// Debits and credits differ after rounding.
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    UnbalancedEntry {
        /// Total debit amount in base currency.
        debit: Decimal,
        /// Total credit amount in base currency.
        credit: Decimal,
    },

    /// A journal entry must carry at least one line.
    #[error("Journal entry has no lines")]
    NoJournalLines,

    /// Exchange rate on a line must be positive.
    #[error("Exchange rate must be positive, got {0}")]
    InvalidExchangeRate(Decimal),

    // ========== Lookup Errors ==========
    /// Transaction not found.
    #[error("Transaction not found: {0}")]
    TransactionNotFound(TransactionId),

    /// Journal entry not found.
    #[error("Journal entry not found: {0}")]
    JournalEntryNotFound(JournalEntryId),

    // ========== Lifecycle Errors ==========
    /// The requested state change is not allowed.
    #[error("Invalid transition from {from} to {to}")]
    InvalidTransition {
        /// Current state.
        from: TransactionState,
        /// Requested state.
        to: TransactionState,
    },

    /// Non-admin actors must give a reason for destructive changes.
    #[error("A reason is required for this change")]
    ReasonRequired,
}

impl LedgerError {
    /// Returns the error code for callers and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::UnbalancedEntry { .. } => "UNBALANCED_ENTRY",
            Self::NoJournalLines => "NO_JOURNAL_LINES",
            Self::InvalidExchangeRate(_) => "INVALID_EXCHANGE_RATE",
            Self::TransactionNotFound(_) => "TRANSACTION_NOT_FOUND",
            Self::JournalEntryNotFound(_) => "JOURNAL_ENTRY_NOT_FOUND",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
            Self::ReasonRequired => "REASON_REQUIRED",
        }
    }
}

impl From<LedgerError> for AppError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::TransactionNotFound(_) | LedgerError::JournalEntryNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            LedgerError::ReasonRequired | LedgerError::InvalidExchangeRate(_) => {
                Self::Validation(err.to_string())
            }
            LedgerError::InvalidTransition { .. } => Self::Conflict(err.to_string()),
            LedgerError::UnbalancedEntry { .. } | LedgerError::NoJournalLines => {
                Self::LedgerRule(err.to_string())
            }
        }
    }
}
