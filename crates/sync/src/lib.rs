//! Persistence and sync collaborator for Caravan.
//!
//! The engine itself never touches the disk or the network. This crate
//! loads and saves whole tenant snapshots, exchanges deltas between
//! sessions, and recomputes party balances locally after a merge instead
//! of trusting balance fields written elsewhere.
//!
//! # Modules
//!
//! - `collaborator` - The async `SyncCollaborator` boundary
//! - `json_file` - Snapshot file on local disk
//! - `delta` - Record-level changes exchanged between sessions
//! - `merge` - Delta merge and balance recomputation
//! - `error` - Sync error types

pub mod collaborator;
pub mod delta;
pub mod error;
pub mod json_file;
pub mod merge;

#[cfg(test)]
mod merge_props;

pub use collaborator::SyncCollaborator;
pub use delta::Delta;
pub use error::SyncError;
pub use json_file::JsonFileSync;
pub use merge::{MergeOutcome, merge_delta, recompute_balances};
