//! Lifecycle domain types: transaction states, actions, and actors.

use std::fmt;

use caravan_shared::types::UserId;
use serde::{Deserialize, Serialize};

use crate::posting::Transaction;

/// Lifecycle state of a transaction.
///
/// Valid transitions:
/// - Active → Active (edit)
/// - Active → Voided (void)
/// - Active | Voided → Deleted (delete)
/// - Voided → Active (restore)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Posted with a live journal entry.
    Active,
    /// Kept for audit with its effect reversed.
    Voided,
    /// Removed from the store.
    Deleted,
}

impl TransactionState {
    /// State of a stored transaction.
    #[must_use]
    pub fn of(tx: &Transaction) -> Self {
        if tx.is_voided { Self::Voided } else { Self::Active }
    }

    /// Returns the string representation of the state.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => "ACTIVE",
            Self::Voided => "VOIDED",
            Self::Deleted => "DELETED",
        }
    }
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state-changing operation on an existing transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Replace the transaction's content, keeping its id.
    Edit,
    /// Reverse the effect but keep the record.
    Void,
    /// Reverse the effect and remove the record.
    Delete,
    /// Re-post a voided transaction.
    Restore,
}

impl LifecycleAction {
    /// State the transaction ends in.
    #[must_use]
    pub fn target(self) -> TransactionState {
        match self {
            Self::Edit | Self::Restore => TransactionState::Active,
            Self::Void => TransactionState::Voided,
            Self::Delete => TransactionState::Deleted,
        }
    }
}

/// Role of the user performing an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// Full access; exempt from the reason requirement.
    Admin,
    /// Books entries.
    Accountant,
    /// Front-office sales agent.
    Agent,
}

/// Read-only identity of whoever performs an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// User id.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Role.
    pub role: Role,
}

impl Actor {
    /// Creates an actor.
    #[must_use]
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
        }
    }

    /// Whether the actor is an administrator.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}
