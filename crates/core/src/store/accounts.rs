//! Party account records carried in a tenant snapshot.

use caravan_shared::types::{AccountId, CurrencyCode};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Records addressable by account id.
pub(crate) trait Keyed {
    fn key(&self) -> &AccountId;
}

pub(crate) fn find<'a, T: Keyed>(items: &'a [T], id: &AccountId) -> Option<&'a T> {
    items.iter().find(|i| i.key() == id)
}

pub(crate) fn find_mut<'a, T: Keyed>(items: &'a mut [T], id: &AccountId) -> Option<&'a mut T> {
    items.iter_mut().find(|i| i.key() == id)
}

/// A row of the currency table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Currency {
    /// ISO code.
    pub code: CurrencyCode,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Units of base currency per unit of this currency.
    pub rate_to_base: Decimal,
}

/// A cash box or bank account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Treasury {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Opening balance.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Running balance.
    #[serde(default)]
    pub balance: Decimal,
}

impl Treasury {
    /// Creates a treasury whose balance starts at its opening balance.
    #[must_use]
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>, opening_balance: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opening_balance,
            balance: opening_balance,
        }
    }
}

/// A customer or supplier.
///
/// Tracks the running balance in base currency and, separately, in the
/// party's own currency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TradingParty {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Opening balance in the party's currency.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Currency of the opening balance.
    #[serde(default)]
    pub opening_balance_currency: Option<CurrencyCode>,
    /// Opening balance converted to base currency.
    #[serde(default)]
    pub opening_balance_in_base: Decimal,
    /// Running balance in base currency.
    #[serde(default)]
    pub balance: Decimal,
    /// Running balance in the party's currency. Absent on records written
    /// before it was tracked.
    #[serde(default)]
    pub currency_balance: Option<Decimal>,
}

impl TradingParty {
    /// Creates a party with no opening balance.
    #[must_use]
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opening_balance: Decimal::ZERO,
            opening_balance_currency: None,
            opening_balance_in_base: Decimal::ZERO,
            balance: Decimal::ZERO,
            currency_balance: Some(Decimal::ZERO),
        }
    }

    /// Sets the opening balance and starts both running balances from it.
    #[must_use]
    pub fn with_opening(mut self, amount: Decimal, currency: CurrencyCode, in_base: Decimal) -> Self {
        self.opening_balance = amount;
        self.opening_balance_currency = Some(currency);
        self.opening_balance_in_base = in_base;
        self.balance = in_base;
        self.currency_balance = Some(amount);
        self
    }

    /// Opening balance in base currency, falling back to the raw opening
    /// amount when no base value was recorded.
    #[must_use]
    pub fn opening_in_base(&self) -> Decimal {
        if self.opening_balance_in_base.is_zero() {
            self.opening_balance
        } else {
            self.opening_balance_in_base
        }
    }
}

/// An employee.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Employee {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Default commission rate in percent.
    #[serde(default)]
    pub commission_rate: Decimal,
    /// Opening amount owed to the employee.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Opening advances held by the employee.
    #[serde(default)]
    pub opening_advances: Decimal,
    /// Running amount owed to the employee.
    #[serde(default)]
    pub balance: Decimal,
    /// Running advances held by the employee.
    #[serde(default)]
    pub advances: Decimal,
}

impl Employee {
    /// Creates an employee with zero balances.
    #[must_use]
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>, commission_rate: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            commission_rate,
            opening_balance: Decimal::ZERO,
            opening_advances: Decimal::ZERO,
            balance: Decimal::ZERO,
            advances: Decimal::ZERO,
        }
    }
}

/// A partner's current account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Partner {
    /// Account id.
    pub id: AccountId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Opening balance.
    #[serde(default)]
    pub opening_balance: Decimal,
    /// Running balance.
    #[serde(default)]
    pub balance: Decimal,
}

impl Partner {
    /// Creates a partner whose balance starts at its opening balance.
    #[must_use]
    pub fn new(id: impl Into<AccountId>, name: impl Into<String>, opening_balance: Decimal) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            opening_balance,
            balance: opening_balance,
        }
    }
}

impl Keyed for Treasury {
    fn key(&self) -> &AccountId {
        &self.id
    }
}

impl Keyed for TradingParty {
    fn key(&self) -> &AccountId {
        &self.id
    }
}

impl Keyed for Employee {
    fn key(&self) -> &AccountId {
        &self.id
    }
}

impl Keyed for Partner {
    fn key(&self) -> &AccountId {
        &self.id
    }
}
