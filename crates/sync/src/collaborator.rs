//! The persistence and sync boundary the application talks to.

use async_trait::async_trait;
use caravan_core::store::Snapshot;
use tokio::sync::broadcast;

use crate::delta::Delta;
use crate::error::SyncError;

/// Loads and saves tenant snapshots and relays deltas between sessions.
///
/// Implementations own all I/O. The engine only ever sees the
/// [`Snapshot`] they return.
#[async_trait]
pub trait SyncCollaborator: Send + Sync {
    /// Loads the full tenant state.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read or decoded.
    async fn load_all(&self) -> Result<Snapshot, SyncError>;

    /// Persists the full tenant state.
    ///
    /// # Errors
    ///
    /// Returns an error if the state cannot be encoded or written.
    async fn save_all(&self, snapshot: &Snapshot) -> Result<(), SyncError>;

    /// Publishes a local change to other sessions.
    ///
    /// # Errors
    ///
    /// Returns an error if the delta cannot be delivered.
    async fn broadcast_delta(&self, delta: Delta) -> Result<(), SyncError>;

    /// Subscribes to deltas published by other sessions.
    fn on_remote_update(&self) -> broadcast::Receiver<Delta>;
}
