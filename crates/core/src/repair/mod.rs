//! Self-healing passes run over a loaded tenant snapshot.
//!
//! - `repair_zero_lines` - rewrites legacy lines stored with zero debit
//!   and credit, feeding only the delta into party balances
//! - `migrate_ref_nos` - assigns reference numbers to legacy records
//! - `backfill_currency_balances` - fills missing party-currency balances
//!
//! Every pass is idempotent and runs at most once per [`MigrationState`].

pub mod passes;
pub mod types;

#[cfg(test)]
mod passes_props;

pub use passes::{
    backfill_currency_balances, duplicate_ref_report, migrate_ref_nos, repair_zero_lines, run_all,
};
pub use types::{MigrationState, RefMigration, RepairReport, ZeroLineRepair};
