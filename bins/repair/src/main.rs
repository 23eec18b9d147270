//! Repair and migration runner for Caravan.
//!
//! Usage:
//!   repair            - Repair the configured snapshot and save it if anything changed
//!   repair --dry-run  - Report what would change without saving

use caravan_core::repair::{MigrationState, run_all};
use caravan_shared::AppConfig;
use caravan_shared::types::CurrencyCode;
use caravan_sync::{Delta, JsonFileSync, SyncCollaborator};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.logging.filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let dry_run = std::env::args().skip(1).any(|arg| arg == "--dry-run");

    let sync = JsonFileSync::from_config(&config.storage);
    let mut snapshot = sync.load_all().await?;
    info!(
        path = %sync.path().display(),
        transactions = snapshot.transactions.len(),
        entries = snapshot.journal_entries.len(),
        "snapshot loaded"
    );

    let before = snapshot.clone();
    if snapshot.base_currency.is_none() {
        snapshot.base_currency = Some(CurrencyCode::new(&config.engine.base_currency));
    }

    let mut state = MigrationState::default();
    let report = run_all(&mut snapshot, &mut state);
    println!("{}", serde_json::to_string_pretty(&report)?);

    if !report.changed() {
        info!("nothing to repair");
        return Ok(());
    }
    if dry_run {
        info!("dry run; snapshot left untouched");
        return Ok(());
    }

    snapshot.last_updated = Some(chrono::Utc::now());
    sync.save_all(&snapshot).await?;
    sync.broadcast_delta(Delta::between(&before, &snapshot)).await?;
    info!(path = %sync.path().display(), "repaired snapshot saved");

    Ok(())
}
