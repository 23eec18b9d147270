//! Business-event types: the transaction and its closed vocabularies.

use caravan_shared::types::{
    AccountId, ComponentId, CostCenterId, CurrencyCode, JournalEntryId, MasterTripId, ProgramId,
    TransactionId, round_money,
};
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger::AccountType;

/// What kind of business event a transaction records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Category {
    /// Ticket sale.
    Flight,
    /// Ticket refund.
    FlightRefund,
    /// Ticket reissue.
    FlightReissue,
    /// Hajj or Umrah package.
    HajjUmrah,
    /// Visa, hotel, transport and similar services.
    GeneralService,
    /// Operating expense paid from a treasury.
    ExpenseGen,
    /// Receipt or payment voucher.
    Cash,
    /// Partner drawing.
    PartnerWithdrawal,
    /// Employee advance paid or deducted.
    EmployeeAdvance,
    /// Guarantee letter deposited with or returned by an agent.
    GuaranteeLetter,
    /// Balance moved between two parties.
    AccountClearing,
    /// Bad-debt write-off.
    DoubtfulDebt,
    /// Inter-treasury transfer.
    Transfer,
    /// Generic refund (legacy records).
    Refund,
    /// Service refund (legacy records).
    RefundService,
}

impl Category {
    /// Refund categories post through the refund rule.
    #[must_use]
    pub fn is_refund(self) -> bool {
        matches!(self, Self::FlightRefund | Self::Refund | Self::RefundService)
    }

    /// Sale categories post through the sale rule.
    #[must_use]
    pub fn is_sale(self) -> bool {
        matches!(
            self,
            Self::Flight | Self::FlightReissue | Self::HajjUmrah | Self::GeneralService
        )
    }

    /// Flight family, which books to the flight revenue/cost accounts.
    #[must_use]
    pub fn is_flight(self) -> bool {
        matches!(self, Self::Flight | Self::FlightRefund | Self::FlightReissue)
    }
}

/// Direction or sub-kind of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionType {
    /// Money in.
    Income,
    /// Money out.
    Expense,
    /// Settlement between parties.
    Settlement,
    /// Treasury to treasury.
    Transfer,
    /// Manual journal.
    Journal,
    /// Clearing between two parties.
    Clearing,
    /// Partner drawing.
    PartnerWithdrawal,
    /// Advance paid to an employee.
    AdvancePayment,
    /// Advance deducted from an employee.
    AdvanceDeduction,
    /// Only the cost side of a sale is booked.
    PurchaseOnly,
    /// Only the revenue side of a sale is booked.
    RevenueOnly,
}

/// Kind of counter-party a transaction refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PartyKind {
    /// Customer.
    Customer,
    /// Supplier.
    Supplier,
    /// Employee.
    Employee,
    /// Partner.
    Partner,
    /// Treasury.
    Treasury,
}

impl PartyKind {
    /// Account type a party of this kind posts to.
    ///
    /// Employees post to their liability (amount owed) account.
    #[must_use]
    pub fn account_type(self) -> AccountType {
        match self {
            Self::Customer => AccountType::Customer,
            Self::Supplier => AccountType::Supplier,
            Self::Employee => AccountType::Liability,
            Self::Partner => AccountType::Partner,
            Self::Treasury => AccountType::Treasury,
        }
    }
}

/// Who funded the purchase side of a sale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FundingKind {
    /// Bought on supplier credit.
    Supplier,
    /// Paid out of a customer's balance.
    Customer,
    /// Paid in cash from a treasury.
    Treasury,
}

impl FundingKind {
    /// Account type the funding leg posts to.
    #[must_use]
    pub fn account_type(self) -> AccountType {
        match self {
            Self::Supplier => AccountType::Supplier,
            Self::Customer => AccountType::Customer,
            Self::Treasury => AccountType::Treasury,
        }
    }
}

/// A business event.
///
/// Created with caller inputs; the engine fills in the id, reference
/// number, resolved exchange rate, the `*_in_base` fields, and the journal
/// back-reference.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// Transaction id.
    pub id: TransactionId,
    /// Reference number (`INV-0007`).
    #[serde(default)]
    pub ref_no: Option<String>,
    /// Business date.
    pub date: NaiveDate,
    /// Free-text description.
    #[serde(default)]
    pub description: String,
    /// Business event kind.
    pub category: Category,
    /// Direction or sub-kind.
    #[serde(rename = "type")]
    pub tx_type: TransactionType,

    /// Amount in transaction currency.
    #[serde(default)]
    pub amount: Decimal,
    /// Transaction currency.
    pub currency_code: CurrencyCode,
    /// Explicit rate on input; the resolved rate once stored.
    #[serde(default)]
    pub exchange_rate: Option<Decimal>,
    /// Cost in transaction currency.
    #[serde(default)]
    pub purchase_price: Decimal,
    /// Gross sale price in transaction currency.
    #[serde(default)]
    pub selling_price: Decimal,
    /// Discount off the selling price.
    #[serde(default)]
    pub discount: Decimal,

    /// Primary counter-party.
    #[serde(default)]
    pub related_entity_id: Option<AccountId>,
    /// Kind of the primary counter-party.
    #[serde(default)]
    pub related_entity_type: Option<PartyKind>,
    /// Second party of a clearing, or destination treasury of a transfer.
    #[serde(default)]
    pub target_entity_id: Option<AccountId>,
    /// Kind of the second party.
    #[serde(default)]
    pub target_entity_type: Option<PartyKind>,
    /// Treasury the money moves through.
    #[serde(default)]
    pub treasury_id: Option<AccountId>,
    /// Party that funded the purchase side.
    #[serde(default)]
    pub supplier_id: Option<AccountId>,
    /// Kind of the funding party.
    #[serde(default)]
    pub supplier_type: Option<FundingKind>,
    /// Expense account of a general expense.
    #[serde(default)]
    pub expense_category: Option<AccountId>,

    /// Book only the revenue side.
    #[serde(default)]
    pub is_sale_only: bool,
    /// Book only the cost side.
    #[serde(default)]
    pub is_purchase_only: bool,
    /// Purchase-only reversal: supplier debited, cost credited.
    #[serde(default)]
    pub is_reversal: bool,

    /// Employee earning commission.
    #[serde(default)]
    pub employee_id: Option<AccountId>,
    /// Percent; overrides the employee's default when non-zero.
    #[serde(default)]
    pub employee_commission_rate: Option<Decimal>,
    /// Explicit commission in transaction currency.
    #[serde(default)]
    pub commission_amount: Option<Decimal>,
    /// Whether commission lines are booked.
    #[serde(default)]
    pub apply_commission: bool,

    /// Program tag.
    #[serde(default)]
    pub program_id: Option<ProgramId>,
    /// Program component tag.
    #[serde(default)]
    pub component_id: Option<ComponentId>,
    /// Master trip tag.
    #[serde(default)]
    pub master_trip_id: Option<MasterTripId>,
    /// Cost center tag.
    #[serde(default)]
    pub cost_center_id: Option<CostCenterId>,

    /// `amount * rate` as resolved at posting time.
    #[serde(default)]
    pub amount_in_base: Decimal,
    /// Purchase price in base currency, rounded.
    #[serde(default)]
    pub purchase_price_in_base: Decimal,
    /// Selling price in base currency, rounded.
    #[serde(default)]
    pub selling_price_in_base: Decimal,

    /// Back-reference to the posted entry.
    #[serde(default)]
    pub journal_entry_id: Option<JournalEntryId>,
    /// Voided transactions are kept for audit without an entry.
    #[serde(default)]
    pub is_voided: bool,
}

impl Transaction {
    /// Creates a transaction with the required inputs; everything else is
    /// empty and can be filled through the public fields.
    #[must_use]
    pub fn new(
        category: Category,
        tx_type: TransactionType,
        date: NaiveDate,
        amount: Decimal,
        currency_code: CurrencyCode,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            ref_no: None,
            date,
            description: String::new(),
            category,
            tx_type,
            amount,
            currency_code,
            exchange_rate: None,
            purchase_price: Decimal::ZERO,
            selling_price: Decimal::ZERO,
            discount: Decimal::ZERO,
            related_entity_id: None,
            related_entity_type: None,
            target_entity_id: None,
            target_entity_type: None,
            treasury_id: None,
            supplier_id: None,
            supplier_type: None,
            expense_category: None,
            is_sale_only: false,
            is_purchase_only: false,
            is_reversal: false,
            employee_id: None,
            employee_commission_rate: None,
            commission_amount: None,
            apply_commission: false,
            program_id: None,
            component_id: None,
            master_trip_id: None,
            cost_center_id: None,
            amount_in_base: Decimal::ZERO,
            purchase_price_in_base: Decimal::ZERO,
            selling_price_in_base: Decimal::ZERO,
            journal_entry_id: None,
            is_voided: false,
        }
    }

    /// The exchange rate in effect, 1 when none is set.
    #[must_use]
    pub fn rate(&self) -> Decimal {
        self.exchange_rate
            .filter(|r| *r > Decimal::ZERO)
            .unwrap_or(Decimal::ONE)
    }

    /// Only the cost side is booked.
    #[must_use]
    pub fn is_purchase_only(&self) -> bool {
        self.is_purchase_only || self.tx_type == TransactionType::PurchaseOnly
    }

    /// Only the revenue side is booked.
    #[must_use]
    pub fn is_sale_only(&self) -> bool {
        self.is_sale_only || self.tx_type == TransactionType::RevenueOnly
    }

    /// `amount * rate`, unrounded.
    #[must_use]
    pub fn amount_base(&self) -> Decimal {
        self.amount * self.rate()
    }

    /// `purchase * rate`, unrounded.
    #[must_use]
    pub fn purchase_base(&self) -> Decimal {
        self.purchase_price * self.rate()
    }

    /// `(selling - discount) * rate`, unrounded.
    #[must_use]
    pub fn net_selling_base(&self) -> Decimal {
        (self.selling_price - self.discount) * self.rate()
    }

    /// Whether the description refers to an Umrah trip.
    #[must_use]
    pub fn mentions_umrah(&self) -> bool {
        self.description.contains("عمرة") || self.description.to_lowercase().contains("umrah")
    }

    /// Stores the resolved rate and the base-currency amounts.
    pub fn apply_rate(&mut self, rate: Decimal) {
        self.exchange_rate = Some(rate);
        self.amount_in_base = self.amount * rate;
        self.purchase_price_in_base = round_money(self.purchase_price * rate);
        self.selling_price_in_base = round_money(self.selling_price * rate);
    }
}
