//! Configuration source subsystem.
//!
//! # Data Flow
//! ```text
//! property file (TOML)
//!     → snapshot.rs (parse & flatten into `a.b.list[n].field` keys)
//!     → diff.rs (old vs new snapshot, filtered by key prefix)
//!     → ConfigChangeEvent
//!
//! On file change:
//!     watcher.rs detects change
//!     → snapshot.rs loads new snapshot
//!     → diff.rs builds batch against the watcher's own baseline
//!     → SourceUpdate { batch, snapshot } sent to the reconcile loop
//!     → loop publishes the snapshot (atomic swap) right before reconciling
//! ```
//!
//! # Design Decisions
//! - The shared snapshot only advances when its batch is reconciled, so the
//!   binder rebinds from exactly the state the batch describes even when
//!   several updates are queued
//! - A file that fails to load keeps the previous snapshot
//! - Empty diffs produce no batch

pub mod diff;
pub mod snapshot;
pub mod watcher;

use std::sync::Arc;

use arc_swap::ArcSwap;
use thiserror::Error;

pub use diff::calculate_changes;
pub use snapshot::{flatten, load_snapshot, PropertySnapshot};
pub use watcher::{SourceUpdate, SourceWatcher};

/// Snapshot of the batch being reconciled, read by the binder.
pub type SharedSnapshot = Arc<ArcSwap<PropertySnapshot>>;

/// Error type for reading the configuration source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Watch error: {0}")]
    Watch(#[from] notify::Error),
}
