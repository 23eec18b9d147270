//! Ledger domain types for journal entries and their lines.
//!
//! This module defines the core types used for recording and validating
//! journal entries in the double-entry bookkeeping system.

use caravan_shared::types::{
    AccountId, ComponentId, CostCenterId, CurrencyCode, JournalEntryId, ProgramId,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The closed set of account kinds a journal line can post to.
///
/// Party kinds (treasury, customer, supplier, employee advance, liability,
/// partner) carry a running balance; revenue, expense, and asset accounts
/// only feed report aggregation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AccountType {
    /// Cash box or bank account.
    Treasury,
    /// Customer receivable.
    Customer,
    /// Supplier payable.
    Supplier,
    /// Advances paid out to an employee.
    EmployeeAdvance,
    /// Amounts owed to an employee (salary, commission).
    Liability,
    /// Partner current account.
    Partner,
    /// Income statement revenue account.
    Revenue,
    /// Income statement expense account.
    Expense,
    /// Balance sheet asset account (e.g. guarantee letters).
    Asset,
}

impl AccountType {
    /// Returns true if lines on this account move a party balance.
    #[must_use]
    pub fn has_party_balance(self) -> bool {
        !matches!(self, Self::Revenue | Self::Expense | Self::Asset)
    }
}

/// Whether a line's effect is being applied or undone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// Posting: the line's effect is added.
    Apply,
    /// Reversal: the line's effect is subtracted.
    Reverse,
}

impl Direction {
    /// Sign multiplier for this direction.
    #[must_use]
    pub fn factor(self) -> Decimal {
        match self {
            Self::Apply => Decimal::ONE,
            Self::Reverse => Decimal::NEGATIVE_ONE,
        }
    }
}

/// One leg of a journal entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalLine {
    /// Sequential id local to the entry, assigned at posting time.
    #[serde(default)]
    pub id: u32,
    /// The account posted to.
    pub account_id: AccountId,
    /// Kind of the account posted to.
    pub account_type: AccountType,
    /// Display name of the account.
    #[serde(default)]
    pub account_name: String,
    /// Debit amount in base currency.
    #[serde(default)]
    pub debit: Decimal,
    /// Credit amount in base currency.
    #[serde(default)]
    pub credit: Decimal,
    /// Transaction currency.
    pub currency_code: CurrencyCode,
    /// Rate from transaction currency to base currency.
    pub exchange_rate: Decimal,
    /// Signed amount in transaction currency: positive on debit legs,
    /// negative on credit legs.
    #[serde(default)]
    pub original_amount: Decimal,
    /// Cost center tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_center_id: Option<CostCenterId>,
    /// Program tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub program_id: Option<ProgramId>,
    /// Program component tag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub component_id: Option<ComponentId>,
}

impl JournalLine {
    /// Debit minus credit.
    #[must_use]
    pub fn net(&self) -> Decimal {
        self.debit - self.credit
    }

    /// True for the legacy defect where both sides were stored as zero.
    #[must_use]
    pub fn is_zero_valued(&self) -> bool {
        self.debit.is_zero() && self.credit.is_zero()
    }
}

/// The atomic unit of financial truth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Entry id.
    pub id: JournalEntryId,
    /// Reference number (e.g. `INV-0007`, `JV-0012`).
    #[serde(default)]
    pub ref_no: Option<String>,
    /// Description.
    pub description: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Total debit of the entry.
    pub total_amount: Decimal,
    /// Ordered lines.
    pub lines: Vec<JournalLine>,
}

impl JournalEntry {
    /// Debit/credit totals of the entry.
    #[must_use]
    pub fn totals(&self, decimal_places: u32) -> EntryTotals {
        EntryTotals::from_lines(&self.lines, decimal_places)
    }

    /// True if any line has both debit and credit equal to zero.
    #[must_use]
    pub fn has_zero_lines(&self) -> bool {
        self.lines.iter().any(JournalLine::is_zero_valued)
    }
}

/// Input for posting a journal entry.
#[derive(Debug, Clone)]
pub struct EntryDraft {
    /// Description.
    pub description: String,
    /// Entry date.
    pub date: NaiveDate,
    /// Lines in posting order.
    pub lines: Vec<JournalLine>,
    /// Reference number; a `JV` number is assigned when absent.
    pub ref_no: Option<String>,
}

/// Entry totals for validation and display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntryTotals {
    /// Total debit amount.
    pub debit: Decimal,
    /// Total credit amount.
    pub credit: Decimal,
    /// Whether debits equal credits after rounding.
    pub is_balanced: bool,
}

impl EntryTotals {
    /// Sums the lines and compares totals rounded to `decimal_places`.
    #[must_use]
    pub fn from_lines(lines: &[JournalLine], decimal_places: u32) -> Self {
        let debit: Decimal = lines.iter().map(|l| l.debit).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit).sum();
        Self {
            debit,
            credit,
            is_balanced: debit.round_dp(decimal_places) == credit.round_dp(decimal_places),
        }
    }

    /// Returns the difference between debits and credits.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.debit - self.credit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            id: 0,
            account_id: AccountId::from("A"),
            account_type: AccountType::Treasury,
            account_name: String::new(),
            debit,
            credit,
            currency_code: CurrencyCode::new("EGP"),
            exchange_rate: Decimal::ONE,
            original_amount: debit - credit,
            cost_center_id: None,
            program_id: None,
            component_id: None,
        }
    }

    #[test]
    fn test_totals_balanced() {
        let totals = EntryTotals::from_lines(&[line(dec!(100), dec!(0)), line(dec!(0), dec!(100))], 2);
        assert!(totals.is_balanced);
        assert_eq!(totals.difference(), Decimal::ZERO);
    }

    #[test]
    fn test_totals_tolerate_sub_cent_noise() {
        let totals =
            EntryTotals::from_lines(&[line(dec!(100.001), dec!(0)), line(dec!(0), dec!(100))], 2);
        assert!(totals.is_balanced);
    }

    #[test]
    fn test_totals_unbalanced() {
        let totals = EntryTotals::from_lines(&[line(dec!(100), dec!(0)), line(dec!(0), dec!(50))], 2);
        assert!(!totals.is_balanced);
        assert_eq!(totals.difference(), dec!(50));
    }

    #[test]
    fn test_zero_valued_line() {
        assert!(line(Decimal::ZERO, Decimal::ZERO).is_zero_valued());
        assert!(!line(dec!(1), Decimal::ZERO).is_zero_valued());
    }

    #[test]
    fn test_party_balance_kinds() {
        assert!(AccountType::Treasury.has_party_balance());
        assert!(AccountType::Liability.has_party_balance());
        assert!(!AccountType::Revenue.has_party_balance());
        assert!(!AccountType::Asset.has_party_balance());
    }

    #[test]
    fn test_account_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&AccountType::EmployeeAdvance).unwrap(),
            "\"EMPLOYEE_ADVANCE\""
        );
    }
}
