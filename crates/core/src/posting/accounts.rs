//! Fixed system accounts the posting rules book against.

use caravan_shared::types::AccountId;

use crate::ledger::AccountType;

/// A built-in revenue, expense, or asset account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemAccount {
    /// Stable account id.
    pub id: &'static str,
    /// Display name.
    pub name: &'static str,
    /// Account kind.
    pub account_type: AccountType,
}

impl SystemAccount {
    const fn new(id: &'static str, name: &'static str, account_type: AccountType) -> Self {
        Self {
            id,
            name,
            account_type,
        }
    }

    /// The id as an [`AccountId`].
    #[must_use]
    pub fn account_id(&self) -> AccountId {
        AccountId::from(self.id)
    }
}

/// Bad-debt write-offs.
pub const BAD_DEBT_EXPENSE: SystemAccount =
    SystemAccount::new("EXPENSE_BAD_DEBT", "Bad debt expense", AccountType::Expense);
/// Employee commission expense.
pub const COMMISSION_EXPENSE: SystemAccount = SystemAccount::new(
    "COMMISSION_EXPENSE",
    "Employee commission expense",
    AccountType::Expense,
);
/// Guarantee letters deposited with agents.
pub const GUARANTEES: SystemAccount = SystemAccount::new(
    "ASSET_GUARANTEES",
    "Guarantee letters with agents",
    AccountType::Asset,
);

/// Flight revenue.
pub const FLIGHT_REVENUE: SystemAccount =
    SystemAccount::new("FLIGHT_REVENUE", "Flight revenue", AccountType::Revenue);
/// Flight cost.
pub const FLIGHT_COST: SystemAccount =
    SystemAccount::new("FLIGHT_COST", "Flight cost", AccountType::Expense);
/// Hajj and Umrah revenue.
pub const HAJJ_UMRAH_REVENUE: SystemAccount = SystemAccount::new(
    "HAJJ_UMRAH_REVENUE",
    "Hajj and Umrah revenue",
    AccountType::Revenue,
);
/// Hajj and Umrah cost.
pub const HAJJ_UMRAH_COST: SystemAccount =
    SystemAccount::new("HAJJ_UMRAH_COST", "Hajj and Umrah cost", AccountType::Expense);
/// General service revenue.
pub const SERVICE_REVENUE: SystemAccount =
    SystemAccount::new("SERVICE_REVENUE", "Service revenue", AccountType::Revenue);
/// General service cost.
pub const SERVICE_COST: SystemAccount =
    SystemAccount::new("SERVICE_COST", "Service cost", AccountType::Expense);

/// Product line a sale or refund books to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceLine {
    /// Tickets.
    Flight,
    /// Hajj and Umrah packages.
    HajjUmrah,
    /// Everything else.
    Service,
}

impl ServiceLine {
    /// Revenue account of this line.
    #[must_use]
    pub fn revenue(self) -> SystemAccount {
        match self {
            Self::Flight => FLIGHT_REVENUE,
            Self::HajjUmrah => HAJJ_UMRAH_REVENUE,
            Self::Service => SERVICE_REVENUE,
        }
    }

    /// Cost account of this line.
    #[must_use]
    pub fn cost(self) -> SystemAccount {
        match self {
            Self::Flight => FLIGHT_COST,
            Self::HajjUmrah => HAJJ_UMRAH_COST,
            Self::Service => SERVICE_COST,
        }
    }
}
