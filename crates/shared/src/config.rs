//! Application configuration management.

use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Posting engine configuration.
    #[serde(default)]
    pub engine: EngineConfig,
    /// Snapshot storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Posting engine configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct EngineConfig {
    /// The tenant's base (reporting) currency.
    #[serde(default = "default_base_currency")]
    pub base_currency: String,
    /// Decimal places used when comparing debit and credit totals.
    #[serde(default = "default_balance_tolerance_dp")]
    pub balance_tolerance_dp: u32,
}

fn default_base_currency() -> String {
    "EGP".to_string()
}

fn default_balance_tolerance_dp() -> u32 {
    2
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_currency: default_base_currency(),
            balance_tolerance_dp: default_balance_tolerance_dp(),
        }
    }
}

/// Snapshot storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON snapshot file.
    #[serde(default = "default_snapshot_path")]
    pub snapshot_path: String,
}

fn default_snapshot_path() -> String {
    "data/snapshot.json".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            snapshot_path: default_snapshot_path(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `tracing` env-filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

fn default_log_filter() -> String {
    "caravan=info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("CARAVAN").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
