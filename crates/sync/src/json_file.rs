//! Snapshot persisted as a single JSON file.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use caravan_core::store::Snapshot;
use caravan_shared::config::StorageConfig;
use tokio::sync::broadcast;

use crate::collaborator::SyncCollaborator;
use crate::delta::Delta;
use crate::error::SyncError;

/// Deltas buffered per subscriber before the slowest one starts lagging.
pub const DELTA_CHANNEL_CAPACITY: usize = 64;

/// File-backed collaborator with an in-process delta channel.
///
/// Writes go to a sibling temp file first and are renamed over the
/// snapshot, so a crash never leaves a half-written file behind.
#[derive(Debug, Clone)]
pub struct JsonFileSync {
    path: PathBuf,
    updates: broadcast::Sender<Delta>,
}

impl JsonFileSync {
    /// Creates a collaborator for the snapshot at `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let (updates, _) = broadcast::channel(DELTA_CHANNEL_CAPACITY);
        Self {
            path: path.into(),
            updates,
        }
    }

    /// Creates a collaborator from storage configuration.
    #[must_use]
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(&config.snapshot_path)
    }

    /// Path of the snapshot file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

#[async_trait]
impl SyncCollaborator for JsonFileSync {
    async fn load_all(&self) -> Result<Snapshot, SyncError> {
        let raw = match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no snapshot yet; starting empty");
                return Ok(Snapshot::default());
            }
            Err(err) => return Err(SyncError::io(&self.path, err)),
        };

        let snapshot: Snapshot = serde_json::from_str(&raw).map_err(|source| SyncError::Decode {
            path: self.path.clone(),
            source,
        })?;

        tracing::debug!(
            path = %self.path.display(),
            transactions = snapshot.transactions.len(),
            entries = snapshot.journal_entries.len(),
            "snapshot loaded"
        );
        Ok(snapshot)
    }

    async fn save_all(&self, snapshot: &Snapshot) -> Result<(), SyncError> {
        let body = serde_json::to_vec_pretty(snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|err| SyncError::io(parent, err))?;
        }

        let temp = self.temp_path();
        tokio::fs::write(&temp, &body)
            .await
            .map_err(|err| SyncError::io(&temp, err))?;
        tokio::fs::rename(&temp, &self.path)
            .await
            .map_err(|err| SyncError::io(&self.path, err))?;

        tracing::debug!(path = %self.path.display(), bytes = body.len(), "snapshot saved");
        Ok(())
    }

    async fn broadcast_delta(&self, delta: Delta) -> Result<(), SyncError> {
        if delta.is_empty() {
            return Ok(());
        }
        match self.updates.send(delta) {
            Ok(receivers) => tracing::debug!(receivers, "delta broadcast"),
            Err(_) => tracing::debug!("delta dropped; no subscribers"),
        }
        Ok(())
    }

    fn on_remote_update(&self) -> broadcast::Receiver<Delta> {
        self.updates.subscribe()
    }
}
