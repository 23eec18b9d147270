//! Posting rule table: maps a normalized transaction to journal lines.
//!
//! Each rule is a small pure function returning the legs it books, in
//! order. [`build_lines`] dispatches on category and type (first match
//! wins) and then turns legs into [`JournalLine`]s:
//! - legs without an account id are dropped
//! - debit and credit are rounded to 2 dp
//! - legs that round to zero on both sides are dropped
//! - every line carries the transaction's currency, rate, signed original
//!   amount, and cost-center/program/component tags

use caravan_shared::types::{AccountId, round_money};
use rust_decimal::Decimal;

use super::accounts::{
    BAD_DEBT_EXPENSE, COMMISSION_EXPENSE, GUARANTEES, ServiceLine, SystemAccount,
};
use super::transaction::{Category, FundingKind, PartyKind, Transaction, TransactionType};
use crate::ledger::{AccountType, JournalLine};

/// Decimal places kept on a line's transaction-currency amount.
pub const ORIGINAL_AMOUNT_DECIMAL_PLACES: u32 = 4;

/// One side of a posting before it becomes a journal line.
#[derive(Debug, Clone, PartialEq)]
struct Leg {
    account_id: Option<AccountId>,
    account_type: AccountType,
    account_name: &'static str,
    debit: Decimal,
    credit: Decimal,
}

impl Leg {
    fn debit(account_id: Option<&AccountId>, account_type: AccountType, amount: Decimal) -> Self {
        Self {
            account_id: account_id.cloned(),
            account_type,
            account_name: "",
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    fn credit(account_id: Option<&AccountId>, account_type: AccountType, amount: Decimal) -> Self {
        Self {
            account_id: account_id.cloned(),
            account_type,
            account_name: "",
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    fn system_debit(account: SystemAccount, amount: Decimal) -> Self {
        Self {
            account_id: Some(account.account_id()),
            account_type: account.account_type,
            account_name: account.name,
            debit: amount,
            credit: Decimal::ZERO,
        }
    }

    fn system_credit(account: SystemAccount, amount: Decimal) -> Self {
        Self {
            account_id: Some(account.account_id()),
            account_type: account.account_type,
            account_name: account.name,
            debit: Decimal::ZERO,
            credit: amount,
        }
    }

    fn named(mut self, name: &'static str) -> Self {
        self.account_name = name;
        self
    }
}

/// Signed transaction-currency amount of a base-currency net.
#[must_use]
pub fn original_amount(signed_base: Decimal, rate: Decimal) -> Decimal {
    if rate <= Decimal::ZERO {
        return signed_base;
    }
    (signed_base / rate).round_dp(ORIGINAL_AMOUNT_DECIMAL_PLACES)
}

/// Builds the journal lines for a transaction whose rate is resolved.
///
/// `commission` is the base-currency commission computed for the
/// transaction; it is only booked by the sale rule.
#[must_use]
pub fn build_lines(tx: &Transaction, commission: Decimal) -> Vec<JournalLine> {
    finish(tx, rule_legs(tx, commission))
}

fn rule_legs(tx: &Transaction, commission: Decimal) -> Vec<Leg> {
    if tx.category == Category::DoubtfulDebt {
        return doubtful_debt_legs(tx);
    }
    if tx.tx_type == TransactionType::Clearing || tx.category == Category::AccountClearing {
        return clearing_legs(tx);
    }
    if tx.category.is_refund() {
        return refund_legs(tx);
    }
    if tx.category.is_sale() {
        return sale_legs(tx, commission);
    }

    match tx.category {
        Category::Cash => cash_legs(tx),
        Category::PartnerWithdrawal => partner_withdrawal_legs(tx),
        Category::EmployeeAdvance => employee_advance_legs(tx),
        Category::GuaranteeLetter => guarantee_letter_legs(tx),
        Category::ExpenseGen => general_expense_legs(tx),
        _ if tx.tx_type == TransactionType::Transfer => transfer_legs(tx),
        _ => Vec::new(),
    }
}

fn finish(tx: &Transaction, legs: Vec<Leg>) -> Vec<JournalLine> {
    let rate = tx.rate();

    legs.into_iter()
        .filter_map(|leg| {
            let Some(account_id) = leg.account_id.filter(|id| !id.is_blank()) else {
                tracing::debug!(
                    tx_id = %tx.id,
                    account_type = ?leg.account_type,
                    "dropping leg without account id"
                );
                return None;
            };

            let debit = round_money(leg.debit);
            let credit = round_money(leg.credit);
            if debit.is_zero() && credit.is_zero() {
                return None;
            }

            Some(JournalLine {
                id: 0,
                account_id,
                account_type: leg.account_type,
                account_name: leg.account_name.to_string(),
                debit,
                credit,
                currency_code: tx.currency_code.clone(),
                exchange_rate: rate,
                original_amount: original_amount(leg.debit - leg.credit, rate),
                cost_center_id: tx.cost_center_id.clone(),
                program_id: tx.program_id.clone(),
                component_id: tx.component_id.clone(),
            })
        })
        .collect()
}

/// Account type of the related party, customer when unspecified.
fn related_type(tx: &Transaction) -> AccountType {
    tx.related_entity_type
        .map_or(AccountType::Customer, PartyKind::account_type)
}

/// Service line of a sale. An Umrah description also selects the
/// Hajj/Umrah accounts.
fn service_line(tx: &Transaction) -> ServiceLine {
    match category_line(tx.category) {
        ServiceLine::Service if tx.mentions_umrah() => ServiceLine::HajjUmrah,
        line => line,
    }
}

/// Service line decided by the category alone, as refunds book it.
fn category_line(category: Category) -> ServiceLine {
    if category.is_flight() {
        ServiceLine::Flight
    } else if category == Category::HajjUmrah {
        ServiceLine::HajjUmrah
    } else {
        ServiceLine::Service
    }
}

fn doubtful_debt_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    vec![
        Leg::system_debit(BAD_DEBT_EXPENSE, amount),
        Leg::credit(tx.related_entity_id.as_ref(), related_type(tx), amount),
    ]
}

/// Clearing between two parties.
///
/// The "to" side is deliberately asymmetric: a customer is credited when
/// the "from" side is a supplier (settlement) and debited otherwise
/// (receivable moved from one customer to another).
fn clearing_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    let from = tx.related_entity_id.as_ref();
    let to = tx.target_entity_id.as_ref();

    let from_leg = if tx.related_entity_type == Some(PartyKind::Customer) {
        Leg::credit(from, AccountType::Customer, amount)
    } else {
        Leg::debit(from, AccountType::Supplier, amount)
    };

    let to_leg = if tx.target_entity_type == Some(PartyKind::Customer) {
        if tx.related_entity_type == Some(PartyKind::Supplier) {
            Leg::credit(to, AccountType::Customer, amount)
        } else {
            Leg::debit(to, AccountType::Customer, amount)
        }
    } else {
        Leg::credit(to, AccountType::Supplier, amount)
    };

    vec![from_leg, to_leg]
}

fn refund_legs(tx: &Transaction) -> Vec<Leg> {
    let rate = tx.rate();
    let selling = tx.selling_price * rate;
    let cost_basis = if tx.purchase_price.is_zero() {
        tx.amount
    } else {
        tx.purchase_price
    };
    let purchase = cost_basis * rate;
    let line = category_line(tx.category);
    let funding_type = tx
        .supplier_type
        .map_or(AccountType::Supplier, FundingKind::account_type);

    vec![
        Leg::credit(tx.related_entity_id.as_ref(), related_type(tx), selling),
        Leg::system_debit(line.revenue(), selling),
        Leg::debit(tx.supplier_id.as_ref(), funding_type, purchase),
        Leg::system_credit(line.cost(), purchase),
    ]
}

fn sale_legs(tx: &Transaction, commission: Decimal) -> Vec<Leg> {
    let line = service_line(tx);

    let mut legs = if tx.is_purchase_only() {
        purchase_only_legs(tx, line)
    } else if tx.is_sale_only() {
        revenue_legs(tx, line)
    } else {
        let mut legs = revenue_legs(tx, line);
        legs.extend(cost_legs(tx, line));
        legs
    };
    legs.extend(commission_legs(tx, commission));
    legs
}

fn revenue_legs(tx: &Transaction, line: ServiceLine) -> Vec<Leg> {
    let selling = tx.net_selling_base();
    if selling <= Decimal::ZERO {
        return Vec::new();
    }
    vec![
        Leg::debit(tx.related_entity_id.as_ref(), related_type(tx), selling),
        Leg::system_credit(line.revenue(), selling),
    ]
}

fn cost_legs(tx: &Transaction, line: ServiceLine) -> Vec<Leg> {
    let purchase = tx.purchase_base();
    if purchase <= Decimal::ZERO {
        return Vec::new();
    }
    let funding_type = tx
        .supplier_type
        .map_or(AccountType::Supplier, FundingKind::account_type);
    vec![
        Leg::system_debit(line.cost(), purchase),
        Leg::credit(tx.supplier_id.as_ref(), funding_type, purchase),
    ]
}

fn purchase_only_legs(tx: &Transaction, line: ServiceLine) -> Vec<Leg> {
    let purchase = tx.purchase_base();
    if purchase <= Decimal::ZERO {
        return Vec::new();
    }

    let funding_id = tx.supplier_id.as_ref().or(tx.related_entity_id.as_ref());
    let funding_type = match (tx.supplier_type, tx.related_entity_type) {
        (Some(FundingKind::Customer), _) => AccountType::Customer,
        (Some(FundingKind::Treasury), _) => AccountType::Treasury,
        (_, Some(PartyKind::Customer)) => AccountType::Customer,
        _ => AccountType::Supplier,
    };

    if tx.is_reversal {
        vec![
            Leg::debit(funding_id, funding_type, purchase),
            Leg::system_credit(line.cost(), purchase),
        ]
    } else {
        vec![
            Leg::system_debit(line.cost(), purchase),
            Leg::credit(funding_id, funding_type, purchase),
        ]
    }
}

/// Mirrored commission lines, booked only when commission is enabled for
/// an attached employee.
fn commission_legs(tx: &Transaction, commission: Decimal) -> Vec<Leg> {
    if commission <= Decimal::ZERO || !tx.apply_commission || tx.employee_id.is_none() {
        return Vec::new();
    }
    vec![
        Leg::system_debit(COMMISSION_EXPENSE, commission),
        Leg::credit(tx.employee_id.as_ref(), AccountType::Liability, commission)
            .named("Commission payable"),
    ]
}

fn cash_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    let treasury = tx.treasury_id.as_ref();
    let party = tx.related_entity_id.as_ref();
    let party_type = related_type(tx);

    if tx.tx_type == TransactionType::Income {
        vec![
            Leg::debit(treasury, AccountType::Treasury, amount),
            Leg::credit(party, party_type, amount),
        ]
    } else {
        vec![
            Leg::credit(treasury, AccountType::Treasury, amount),
            Leg::debit(party, party_type, amount),
        ]
    }
}

fn partner_withdrawal_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    vec![
        Leg::debit(tx.related_entity_id.as_ref(), AccountType::Partner, amount),
        Leg::credit(tx.treasury_id.as_ref(), AccountType::Treasury, amount),
    ]
}

fn employee_advance_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    let employee = tx.related_entity_id.as_ref();

    if tx.tx_type == TransactionType::AdvancePayment {
        vec![
            Leg::debit(employee, AccountType::EmployeeAdvance, amount),
            Leg::credit(tx.treasury_id.as_ref(), AccountType::Treasury, amount),
        ]
    } else {
        vec![
            Leg::debit(employee, AccountType::Liability, amount),
            Leg::credit(employee, AccountType::EmployeeAdvance, amount),
        ]
    }
}

fn guarantee_letter_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    let treasury = tx.treasury_id.as_ref();

    if tx.tx_type == TransactionType::Expense {
        vec![
            Leg::system_debit(GUARANTEES, amount),
            Leg::credit(treasury, AccountType::Treasury, amount),
        ]
    } else {
        vec![
            Leg::debit(treasury, AccountType::Treasury, amount),
            Leg::system_credit(GUARANTEES, amount),
        ]
    }
}

fn general_expense_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    vec![
        Leg::debit(tx.expense_category.as_ref(), AccountType::Expense, amount),
        Leg::credit(tx.treasury_id.as_ref(), AccountType::Treasury, amount),
    ]
}

fn transfer_legs(tx: &Transaction) -> Vec<Leg> {
    let amount = tx.amount_base();
    vec![
        Leg::debit(tx.target_entity_id.as_ref(), AccountType::Treasury, amount),
        Leg::credit(tx.treasury_id.as_ref(), AccountType::Treasury, amount),
    ]
}
