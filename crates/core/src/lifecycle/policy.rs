//! State machine and reason policy for lifecycle operations.

use super::types::{Actor, LifecycleAction, TransactionState};
use crate::ledger::LedgerError;

/// Stateless lifecycle policy.
pub struct LifecyclePolicy;

impl LifecyclePolicy {
    /// Validates a transition and returns the resulting state.
    ///
    /// # Errors
    ///
    /// Returns `InvalidTransition` when `action` is not allowed from `current`.
    pub fn check_transition(
        current: TransactionState,
        action: LifecycleAction,
    ) -> Result<TransactionState, LedgerError> {
        let allowed = match action {
            LifecycleAction::Edit | LifecycleAction::Void => current == TransactionState::Active,
            LifecycleAction::Delete => {
                matches!(current, TransactionState::Active | TransactionState::Voided)
            }
            LifecycleAction::Restore => current == TransactionState::Voided,
        };

        if allowed {
            Ok(action.target())
        } else {
            Err(LedgerError::InvalidTransition {
                from: current,
                to: action.target(),
            })
        }
    }

    /// Non-admin actors must give a non-blank reason.
    ///
    /// # Errors
    ///
    /// Returns `ReasonRequired` when the reason is missing or blank.
    pub fn require_reason(actor: &Actor, reason: Option<&str>) -> Result<(), LedgerError> {
        if actor.is_admin() || reason.is_some_and(|r| !r.trim().is_empty()) {
            Ok(())
        } else {
            Err(LedgerError::ReasonRequired)
        }
    }
}
