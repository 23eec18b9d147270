//! Employee commission on sales.

use rust_decimal::Decimal;

use crate::posting::Transaction;

/// Everything the calculator needs, in base currency where it matters.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommissionInput {
    /// Explicit commission in transaction currency.
    pub explicit_amount: Option<Decimal>,
    /// An employee is attached to the sale.
    pub has_employee: bool,
    /// Commission is enabled on the sale.
    pub apply_commission: bool,
    /// Percent rate set on the transaction.
    pub override_rate: Option<Decimal>,
    /// Employee's default percent rate.
    pub default_rate: Option<Decimal>,
    /// Selling price net of discount, in base currency.
    pub selling_base: Decimal,
    /// Purchase price in base currency.
    pub purchase_base: Decimal,
    /// Only the cost side is booked.
    pub purchase_only: bool,
    /// Transaction rate to base.
    pub exchange_rate: Decimal,
}

impl CommissionInput {
    /// Gathers inputs from a rate-resolved transaction.
    #[must_use]
    pub fn from_transaction(tx: &Transaction, default_rate: Option<Decimal>) -> Self {
        Self {
            explicit_amount: tx.commission_amount,
            has_employee: tx.employee_id.is_some(),
            apply_commission: tx.apply_commission,
            override_rate: tx.employee_commission_rate,
            default_rate,
            selling_base: tx.net_selling_base(),
            purchase_base: tx.purchase_base(),
            purchase_only: tx.is_purchase_only(),
            exchange_rate: tx.rate(),
        }
    }

    /// Override when non-zero, else the employee default, else zero.
    #[must_use]
    pub fn effective_rate(&self) -> Decimal {
        self.override_rate
            .filter(|r| !r.is_zero())
            .or(self.default_rate)
            .unwrap_or(Decimal::ZERO)
    }
}

/// Stateless commission calculator.
pub struct CommissionCalculator;

impl CommissionCalculator {
    /// Computes commission in base currency.
    ///
    /// Priority:
    /// 1. an explicit amount, converted at the transaction rate
    /// 2. with an employee and commission enabled, the rate applied to a
    ///    positive margin
    /// 3. in the same branch, for purchase-only sales, the rate applied to
    ///    the purchase price
    /// 4. zero
    #[must_use]
    pub fn calculate(input: &CommissionInput) -> Decimal {
        if let Some(explicit) = input.explicit_amount.filter(|a| *a > Decimal::ZERO) {
            return explicit * input.exchange_rate;
        }

        if !(input.has_employee && input.apply_commission) {
            return Decimal::ZERO;
        }

        let rate = input.effective_rate();
        if rate <= Decimal::ZERO {
            return Decimal::ZERO;
        }

        let margin = input.selling_base - input.purchase_base;
        if margin > Decimal::ZERO {
            return margin * rate / Decimal::ONE_HUNDRED;
        }

        if input.purchase_only && input.purchase_base > Decimal::ZERO {
            return input.purchase_base * rate / Decimal::ONE_HUNDRED;
        }

        Decimal::ZERO
    }
}
