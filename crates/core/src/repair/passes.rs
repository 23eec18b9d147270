//! Repair and migration passes.

use std::collections::{HashMap, HashSet};

use caravan_shared::types::{JournalEntryId, round_money};
use rust_decimal::Decimal;

use super::types::{MigrationState, RefMigration, RepairReport, ZeroLineRepair};
use crate::ledger::reference::{format_ref_no, max_ref_number, parse_ref_no};
use crate::ledger::{
    AccountType, BalanceKind, Direction, JournalLine, LedgerStore, RefPrefix, apply_effect,
    duplicate_ref_nos, effect_of,
};
use crate::posting::rules::original_amount;
use crate::posting::{PartyKind, Transaction, TransactionType};

/// Runs every pass that has not run yet and reports what changed.
///
/// Currency balances are backfilled first: a line repair on a party whose
/// currency balance was never recorded would otherwise start it at the
/// repair delta and hide it from the backfill.
pub fn run_all<S: LedgerStore + ?Sized>(store: &mut S, state: &mut MigrationState) -> RepairReport {
    let currency_balances_backfilled = backfill_currency_balances(store, state);
    let zero_lines = repair_zero_lines(store, state);
    let refs = migrate_ref_nos(store, state);

    let duplicates = duplicate_ref_report(store);
    for (ref_no, count) in &duplicates {
        tracing::warn!(ref_no = %ref_no, count, "duplicate reference number");
    }

    let report = RepairReport {
        zero_lines,
        refs,
        currency_balances_backfilled,
        duplicate_ref_nos: duplicates,
    };

    tracing::info!(
        lines_repaired = report.zero_lines.lines,
        stale_entries = report.zero_lines.stale_entries,
        transactions_renumbered = report.refs.transactions,
        entries_renumbered = report.refs.journal_entries,
        currency_balances_backfilled = report.currency_balances_backfilled,
        "repair passes finished"
    );

    report
}

/// How a broken line is refilled, decided by the owning transaction.
#[derive(Debug, Clone, Copy)]
enum RepairTarget {
    /// Cost booking: expense debit, funding party credit.
    Purchase(Decimal),
    /// Revenue booking: customer or treasury debit, revenue credit.
    Sale(Decimal),
    /// Nothing can be inferred.
    Unknown,
}

impl RepairTarget {
    fn for_transaction(tx: &Transaction) -> Self {
        let rate = tx.rate();
        if tx.is_purchase_only() || tx.tx_type == TransactionType::Expense {
            let cost = if tx.purchase_price.is_zero() {
                tx.amount
            } else {
                tx.purchase_price
            };
            Self::Purchase(cost * rate)
        } else if tx.is_sale_only() || tx.tx_type == TransactionType::Income {
            Self::Sale(tx.net_selling_base())
        } else {
            Self::Unknown
        }
    }

    /// Unrounded `(debit, credit)` for a line of the given type.
    fn values_for(self, account_type: AccountType) -> Option<(Decimal, Decimal)> {
        match (self, account_type) {
            (Self::Purchase(buy), AccountType::Expense) => Some((buy, Decimal::ZERO)),
            (
                Self::Purchase(buy),
                AccountType::Supplier | AccountType::Customer | AccountType::Treasury,
            ) => Some((Decimal::ZERO, buy)),
            (Self::Sale(sell), AccountType::Revenue) => Some((Decimal::ZERO, sell)),
            (Self::Sale(sell), AccountType::Customer | AccountType::Treasury) => {
                Some((sell, Decimal::ZERO))
            }
            _ => None,
        }
    }
}

/// Rewrites lines stored with zero debit and credit from their owning
/// transaction.
///
/// Only the difference between the rewritten and the stored line reaches
/// party balances. Entries no transaction points at are left untouched.
pub fn repair_zero_lines<S: LedgerStore + ?Sized>(
    store: &mut S,
    state: &mut MigrationState,
) -> ZeroLineRepair {
    let mut outcome = ZeroLineRepair::default();
    if state.repaired {
        return outcome;
    }
    state.repaired = true;

    let broken: Vec<_> = store
        .journal_entries()
        .iter()
        .filter(|e| e.has_zero_lines())
        .cloned()
        .collect();
    if broken.is_empty() {
        return outcome;
    }
    tracing::info!(entries = broken.len(), "entries with zero-valued lines found");

    for mut entry in broken {
        let owner = store
            .transactions()
            .iter()
            .find(|t| t.journal_entry_id == Some(entry.id));
        let Some(tx) = owner else {
            tracing::warn!(entry_id = %entry.id, "no transaction references entry; left untouched");
            outcome.stale_entries += 1;
            continue;
        };

        let target = RepairTarget::for_transaction(tx);
        let rate = tx.rate();
        let mut deltas = Vec::new();

        for line in entry.lines.iter_mut().filter(|l| l.is_zero_valued()) {
            let Some((debit, credit)) = target.values_for(line.account_type) else {
                continue;
            };
            let rewritten = JournalLine {
                debit: round_money(debit),
                credit: round_money(credit),
                original_amount: original_amount(debit - credit, rate),
                ..line.clone()
            };
            if rewritten.is_zero_valued() {
                continue;
            }

            deltas.push(JournalLine {
                debit: rewritten.debit - line.debit,
                credit: rewritten.credit - line.credit,
                original_amount: rewritten.original_amount - line.original_amount,
                ..rewritten.clone()
            });
            *line = rewritten;
        }

        if deltas.is_empty() {
            continue;
        }

        entry.total_amount = entry.lines.iter().map(|l| l.debit).sum();
        tracing::debug!(entry_id = %entry.id, lines = deltas.len(), "entry repaired");
        outcome.lines += deltas.len();
        store.upsert_journal_entry(entry);
        for delta in &deltas {
            apply_effect(store, delta, Direction::Apply);
        }
    }

    outcome
}

/// Gives legacy records reference numbers.
///
/// Transactions are walked oldest first with a running counter per
/// prefix, raised by every existing ref passed on the way. Entries without
/// a ref take their transaction's ref, or the next `JV` number.
pub fn migrate_ref_nos<S: LedgerStore + ?Sized>(
    store: &mut S,
    state: &mut MigrationState,
) -> RefMigration {
    let mut outcome = RefMigration::default();
    if state.ref_nos_migrated {
        return outcome;
    }
    state.ref_nos_migrated = true;

    let mut counters: HashMap<String, u32> = HashMap::new();
    let mut renumbered = Vec::new();
    for tx in store.transactions() {
        match present(tx.ref_no.as_deref()) {
            Some(existing) => {
                if let Some((prefix, number)) = parse_ref_no(existing) {
                    let counter = counters.entry(prefix.to_string()).or_default();
                    *counter = (*counter).max(number);
                }
            }
            None => {
                let prefix = RefPrefix::for_transaction(tx);
                let counter = counters.entry(prefix.as_str().to_string()).or_default();
                *counter = counter.saturating_add(1);
                let mut tx = tx.clone();
                tx.ref_no = Some(format_ref_no(prefix, *counter));
                renumbered.push(tx);
            }
        }
    }
    outcome.transactions = renumbered.len();
    for tx in renumbered {
        store.upsert_transaction(tx);
    }

    let mut jv_max = max_ref_number(
        RefPrefix::Jv,
        store
            .journal_entries()
            .iter()
            .filter_map(|e| e.ref_no.as_deref()),
    );
    let mut entries = Vec::new();
    for entry in store
        .journal_entries()
        .iter()
        .filter(|e| present(e.ref_no.as_deref()).is_none())
    {
        let linked = store
            .transactions()
            .iter()
            .find(|t| t.journal_entry_id == Some(entry.id))
            .and_then(|t| present(t.ref_no.as_deref()))
            .map(str::to_string);
        let ref_no = linked.unwrap_or_else(|| {
            jv_max = jv_max.saturating_add(1);
            format_ref_no(RefPrefix::Jv, jv_max)
        });
        let mut entry = entry.clone();
        entry.ref_no = Some(ref_no);
        entries.push(entry);
    }
    outcome.journal_entries = entries.len();
    for entry in entries {
        store.upsert_journal_entry(entry);
    }

    if outcome.transactions + outcome.journal_entries > 0 {
        tracing::info!(
            transactions = outcome.transactions,
            entries = outcome.journal_entries,
            "reference numbers migrated"
        );
    }
    outcome
}

/// Fills currency balances missing on customers and suppliers: opening
/// balance plus the currency movement of their journal lines.
pub fn backfill_currency_balances<S: LedgerStore + ?Sized>(
    store: &mut S,
    state: &mut MigrationState,
) -> usize {
    if state.currency_balances_backfilled {
        return 0;
    }
    state.currency_balances_backfilled = true;

    let mut filled = 0;
    for (party, kind) in [
        (PartyKind::Customer, BalanceKind::CustomerCurrency),
        (PartyKind::Supplier, BalanceKind::SupplierCurrency),
    ] {
        for id in store.party_ids(party) {
            if store.balance(kind, &id).is_some() {
                continue;
            }
            let opening = store
                .party_opening(party, &id)
                .map_or(Decimal::ZERO, |o| o.amount);
            let movement: Decimal = store
                .journal_entries()
                .iter()
                .flat_map(|e| &e.lines)
                .filter(|l| l.account_id == id)
                .flat_map(|l| effect_of(l, Direction::Apply))
                .filter(|a| a.kind == kind)
                .map(|a| a.delta)
                .sum();
            if store.set_balance(kind, &id, opening + movement) {
                filled += 1;
            }
        }
    }

    if filled > 0 {
        tracing::info!(parties = filled, "currency balances backfilled");
    }
    filled
}

/// Duplicate refs among transactions and manual journal entries.
///
/// An entry posted for a transaction shares its ref, so only entries no
/// transaction points at are counted.
pub fn duplicate_ref_report<S: LedgerStore + ?Sized>(store: &S) -> Vec<(String, usize)> {
    let linked: HashSet<JournalEntryId> = store
        .transactions()
        .iter()
        .filter_map(|t| t.journal_entry_id)
        .collect();

    let tx_refs = store.transactions().iter().filter_map(|t| t.ref_no.as_deref());
    let manual_refs = store
        .journal_entries()
        .iter()
        .filter(|e| !linked.contains(&e.id))
        .filter_map(|e| e.ref_no.as_deref());

    duplicate_ref_nos(tx_refs.chain(manual_refs))
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::JournalEntry;
    use crate::posting::Category;
    use crate::store::{Snapshot, TradingParty, Treasury};
    use caravan_shared::types::{AccountId, CurrencyCode};
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2023, 11, 5).unwrap()
    }

    fn line(account: &str, account_type: AccountType, debit: Decimal, credit: Decimal) -> JournalLine {
        JournalLine {
            id: 0,
            account_id: AccountId::from(account),
            account_type,
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

    fn entry(ref_no: Option<&str>, lines: Vec<JournalLine>) -> JournalEntry {
        JournalEntry {
            id: JournalEntryId::new(),
            ref_no: ref_no.map(str::to_string),
            description: "legacy".to_string(),
            date: date(),
            total_amount: lines.iter().map(|l| l.debit).sum(),
            lines,
        }
    }

    fn tx(category: Category, tx_type: TransactionType, ref_no: Option<&str>) -> Transaction {
        let mut tx = Transaction::new(category, tx_type, date(), dec!(100), CurrencyCode::new("EGP"));
        tx.ref_no = ref_no.map(str::to_string);
        tx.exchange_rate = Some(Decimal::ONE);
        tx
    }

    fn snapshot() -> Snapshot {
        let mut s = Snapshot::new(CurrencyCode::new("EGP"));
        s.treasuries.push(Treasury::new("T1", "Cash", Decimal::ZERO));
        s.customers.push(TradingParty::new("C1", "Customer"));
        s.suppliers.push(TradingParty::new("S1", "Supplier"));
        s
    }

    #[test]
    fn test_purchase_lines_repaired_with_delta() {
        let mut s = snapshot();
        let broken = entry(
            Some("PV-0001"),
            vec![
                line("COST", AccountType::Expense, Decimal::ZERO, Decimal::ZERO),
                line("S1", AccountType::Supplier, Decimal::ZERO, Decimal::ZERO),
            ],
        );
        let mut t = tx(Category::HajjUmrah, TransactionType::PurchaseOnly, Some("PV-0001"));
        t.purchase_price = dec!(750);
        t.journal_entry_id = Some(broken.id);
        s.journal_entries.push(broken);
        s.transactions.push(t);
        s.suppliers[0].balance = dec!(40);

        let mut state = MigrationState::default();
        let outcome = repair_zero_lines(&mut s, &mut state);

        assert_eq!(outcome.lines, 2);
        let fixed = &s.journal_entries[0];
        assert_eq!(fixed.lines[0].debit, dec!(750));
        assert_eq!(fixed.lines[1].credit, dec!(750));
        assert_eq!(fixed.lines[1].original_amount, dec!(-750));
        assert_eq!(fixed.total_amount, dec!(750));
        assert_eq!(s.suppliers[0].balance, dec!(790));
        assert!(state.repaired);
    }

    #[test]
    fn test_expense_without_purchase_uses_amount() {
        let mut s = snapshot();
        let broken = entry(
            None,
            vec![
                line("EXP", AccountType::Expense, Decimal::ZERO, Decimal::ZERO),
                line("T1", AccountType::Treasury, Decimal::ZERO, Decimal::ZERO),
            ],
        );
        let mut t = tx(Category::ExpenseGen, TransactionType::Expense, None);
        t.exchange_rate = Some(dec!(2));
        t.journal_entry_id = Some(broken.id);
        s.journal_entries.push(broken);
        s.transactions.push(t);

        repair_zero_lines(&mut s, &mut MigrationState::default());
        assert_eq!(s.journal_entries[0].lines[0].debit, dec!(200));
        assert_eq!(s.journal_entries[0].lines[1].original_amount, dec!(-100));
        assert_eq!(s.treasuries[0].balance, dec!(-200));
    }

    #[test]
    fn test_sale_lines_repaired() {
        let mut s = snapshot();
        let broken = entry(
            None,
            vec![
                line("C1", AccountType::Customer, Decimal::ZERO, Decimal::ZERO),
                line("FLIGHT_REVENUE", AccountType::Revenue, Decimal::ZERO, Decimal::ZERO),
            ],
        );
        let mut t = tx(Category::Flight, TransactionType::RevenueOnly, None);
        t.selling_price = dec!(1200);
        t.discount = dec!(200);
        t.journal_entry_id = Some(broken.id);
        s.journal_entries.push(broken);
        s.transactions.push(t);

        let outcome = repair_zero_lines(&mut s, &mut MigrationState::default());
        assert_eq!(outcome.lines, 2);
        assert_eq!(s.journal_entries[0].lines[0].debit, dec!(1000));
        assert_eq!(s.journal_entries[0].lines[1].credit, dec!(1000));
        assert_eq!(s.customers[0].balance, dec!(1000));
        assert_eq!(s.customers[0].currency_balance, Some(dec!(1000)));
    }

    #[test]
    fn test_stale_entry_left_untouched() {
        let mut s = snapshot();
        let broken = entry(
            None,
            vec![line("S1", AccountType::Supplier, Decimal::ZERO, Decimal::ZERO)],
        );
        s.journal_entries.push(broken.clone());

        let outcome = repair_zero_lines(&mut s, &mut MigrationState::default());
        assert_eq!(outcome, ZeroLineRepair { lines: 0, stale_entries: 1 });
        assert_eq!(s.journal_entries[0], broken);
    }

    #[test]
    fn test_repair_runs_once_per_state() {
        let mut s = snapshot();
        let mut state = MigrationState {
            repaired: true,
            ..MigrationState::default()
        };
        let broken = entry(
            None,
            vec![line("S1", AccountType::Supplier, Decimal::ZERO, Decimal::ZERO)],
        );
        s.journal_entries.push(broken);
        assert_eq!(repair_zero_lines(&mut s, &mut state), ZeroLineRepair::default());
    }

    #[test]
    fn test_ref_migration_running_counter() {
        let mut s = snapshot();
        s.transactions.push(tx(Category::Cash, TransactionType::Income, None));
        s.transactions.push(tx(Category::Cash, TransactionType::Income, Some("RV-0007")));
        s.transactions.push(tx(Category::Cash, TransactionType::Income, None));
        s.transactions.push(tx(Category::Flight, TransactionType::PurchaseOnly, None));
        s.transactions.push(tx(Category::Cash, TransactionType::Expense, Some("   ")));

        let outcome = migrate_ref_nos(&mut s, &mut MigrationState::default());
        assert_eq!(outcome.transactions, 4);
        let refs: Vec<_> = s.transactions.iter().map(|t| t.ref_no.as_deref().unwrap()).collect();
        assert_eq!(refs, vec!["RV-0001", "RV-0007", "RV-0008", "INV-0001", "PV-0001"]);
    }

    #[test]
    fn test_ref_migration_saturates_counter() {
        let mut s = snapshot();
        s.transactions.push(tx(Category::Cash, TransactionType::Expense, Some("PV-4294967295")));
        s.transactions.push(tx(Category::Cash, TransactionType::Expense, None));
        s.journal_entries.push(entry(Some("JV-4294967295"), vec![]));
        s.journal_entries.push(entry(None, vec![]));

        migrate_ref_nos(&mut s, &mut MigrationState::default());
        assert_eq!(s.transactions[1].ref_no.as_deref(), Some("PV-4294967295"));
        assert_eq!(s.journal_entries[1].ref_no.as_deref(), Some("JV-4294967295"));
        assert_eq!(
            duplicate_ref_report(&s),
            vec![("JV-4294967295".to_string(), 2), ("PV-4294967295".to_string(), 2)]
        );
    }

    #[test]
    fn test_ref_migration_for_entries() {
        let mut s = snapshot();
        let linked = entry(None, vec![]);
        let manual = entry(None, vec![]);
        s.journal_entries.push(entry(Some("JV-0003"), vec![]));
        s.journal_entries.push(linked.clone());
        s.journal_entries.push(manual.clone());
        let mut t = tx(Category::Cash, TransactionType::Income, None);
        t.journal_entry_id = Some(linked.id);
        s.transactions.push(t);

        let outcome = migrate_ref_nos(&mut s, &mut MigrationState::default());
        assert_eq!(outcome, RefMigration { transactions: 1, journal_entries: 2 });
        assert_eq!(s.journal_entries[1].ref_no.as_deref(), Some("RV-0001"));
        assert_eq!(s.journal_entries[2].ref_no.as_deref(), Some("JV-0004"));
    }

    #[test]
    fn test_backfill_from_opening_and_lines() {
        let mut s = snapshot();
        s.customers[0] = TradingParty::new("C1", "Customer").with_opening(
            dec!(50),
            CurrencyCode::new("USD"),
            dec!(2400),
        );
        s.customers[0].currency_balance = None;
        s.suppliers[0].currency_balance = None;
        let mut usd_line = line("C1", AccountType::Customer, dec!(960), Decimal::ZERO);
        usd_line.original_amount = dec!(20);
        let mut supplier_line = line("S1", AccountType::Supplier, Decimal::ZERO, dec!(480));
        supplier_line.original_amount = dec!(-10);
        s.journal_entries.push(entry(None, vec![usd_line, supplier_line]));

        let filled = backfill_currency_balances(&mut s, &mut MigrationState::default());
        assert_eq!(filled, 2);
        assert_eq!(s.customers[0].currency_balance, Some(dec!(70)));
        assert_eq!(s.suppliers[0].currency_balance, Some(dec!(10)));
    }

    #[test]
    fn test_backfill_keeps_existing_balances() {
        let mut s = snapshot();
        s.customers[0].currency_balance = Some(dec!(5));
        s.suppliers[0].currency_balance = Some(dec!(6));
        assert_eq!(backfill_currency_balances(&mut s, &mut MigrationState::default()), 0);
        assert_eq!(s.customers[0].currency_balance, Some(dec!(5)));
    }

    #[test]
    fn test_duplicates_ignore_linked_entries() {
        let mut s = snapshot();
        let posted = entry(Some("RV-0001"), vec![]);
        let mut t = tx(Category::Cash, TransactionType::Income, Some("RV-0001"));
        t.journal_entry_id = Some(posted.id);
        s.transactions.push(t);
        s.journal_entries.push(posted);
        assert!(duplicate_ref_report(&s).is_empty());

        s.transactions.push(tx(Category::Cash, TransactionType::Income, Some("RV-0001")));
        s.journal_entries.push(entry(Some("JV-0001"), vec![]));
        s.journal_entries.push(entry(Some("JV-0001"), vec![]));
        assert_eq!(
            duplicate_ref_report(&s),
            vec![("JV-0001".to_string(), 2), ("RV-0001".to_string(), 2)]
        );
    }

    #[test]
    fn test_run_all_reports_changes() {
        let mut s = snapshot();
        s.transactions.push(tx(Category::Cash, TransactionType::Income, None));
        let mut state = MigrationState::default();

        let first = run_all(&mut s, &mut state);
        assert!(first.changed());
        assert_eq!(
            state,
            MigrationState {
                repaired: true,
                ref_nos_migrated: true,
                currency_balances_backfilled: true,
            }
        );

        let second = run_all(&mut s, &mut state);
        assert!(!second.changed());
    }

    #[test]
    fn test_run_all_backfills_before_repairing() {
        let mut s = snapshot();
        s.suppliers[0] = TradingParty::new("S1", "Supplier").with_opening(
            dec!(1000),
            CurrencyCode::new("EGP"),
            dec!(1000),
        );
        s.suppliers[0].currency_balance = None;

        s.journal_entries.push(entry(
            Some("PV-0001"),
            vec![
                line("COST", AccountType::Expense, dec!(200), Decimal::ZERO),
                line("S1", AccountType::Supplier, Decimal::ZERO, dec!(200)),
            ],
        ));
        let broken = entry(
            Some("PV-0002"),
            vec![
                line("COST", AccountType::Expense, Decimal::ZERO, Decimal::ZERO),
                line("S1", AccountType::Supplier, Decimal::ZERO, Decimal::ZERO),
            ],
        );
        let mut t = tx(Category::Flight, TransactionType::PurchaseOnly, Some("PV-0002"));
        t.purchase_price = dec!(300);
        t.journal_entry_id = Some(broken.id);
        s.journal_entries.push(broken);
        s.transactions.push(t);

        let report = run_all(&mut s, &mut MigrationState::default());
        assert_eq!(report.currency_balances_backfilled, 1);
        assert_eq!(report.zero_lines.lines, 2);
        assert_eq!(s.suppliers[0].currency_balance, Some(dec!(1500)));
    }
}
