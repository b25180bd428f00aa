//! Property file watcher.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use crate::change::ConfigChangeEvent;
use crate::observability::metrics;
use crate::source::diff::calculate_changes;
use crate::source::snapshot::{load_snapshot, PropertySnapshot};
use crate::source::{SharedSnapshot, SourceError};

/// One effective change to the property file.
///
/// Carries the snapshot the batch was computed against, so the rebind that
/// follows sees exactly the state the batch describes.
#[derive(Debug, Clone)]
pub struct SourceUpdate {
    pub batch: ConfigChangeEvent,
    pub snapshot: Arc<PropertySnapshot>,
}

impl SourceUpdate {
    /// Make this update's snapshot the one the binder reads from.
    pub fn publish(&self, current: &SharedSnapshot) {
        current.store(Arc::clone(&self.snapshot));
    }
}

/// Watches the property file and emits one update per effective change.
#[derive(Clone)]
pub struct SourceWatcher {
    path: PathBuf,
    key_prefix: String,
    /// Last snapshot a batch was computed from. Never read by the binder.
    baseline: Arc<Mutex<Arc<PropertySnapshot>>>,
    update_tx: mpsc::UnboundedSender<SourceUpdate>,
}

impl SourceWatcher {
    /// Create a new SourceWatcher diffing against `initial`.
    ///
    /// Returns the watcher and a receiver for source updates.
    pub fn new(
        path: &Path,
        key_prefix: impl Into<String>,
        initial: Arc<PropertySnapshot>,
    ) -> (Self, mpsc::UnboundedReceiver<SourceUpdate>) {
        let (update_tx, update_rx) = mpsc::unbounded_channel();

        (
            Self {
                path: path.to_path_buf(),
                key_prefix: key_prefix.into(),
                baseline: Arc::new(Mutex::new(initial)),
                update_tx,
            },
            update_rx,
        )
    }

    /// Reload the file and send the resulting update.
    ///
    /// The shared snapshot is left alone; the receiver publishes
    /// `SourceUpdate::snapshot` when it reconciles the batch.
    /// Returns `Ok(false)` when nothing under the key prefix changed.
    pub fn reload(&self) -> Result<bool, SourceError> {
        let new_snapshot = Arc::new(load_snapshot(&self.path)?);

        // Held across diff and send so concurrent reloads queue in file order.
        let mut baseline = self.baseline.lock().unwrap_or_else(PoisonError::into_inner);
        let changes = calculate_changes(&baseline, &new_snapshot, &self.key_prefix);
        *baseline = Arc::clone(&new_snapshot);

        if changes.is_empty() {
            tracing::debug!(path = ?self.path, "Source reloaded without relevant changes");
            return Ok(false);
        }

        let batch = ConfigChangeEvent::new(self.path.display().to_string(), changes);
        tracing::info!(path = ?self.path, batch_keys = batch.len(), "Source change detected");

        let update = SourceUpdate {
            batch,
            snapshot: new_snapshot,
        };
        if self.update_tx.send(update).is_err() {
            tracing::warn!("Source update receiver dropped");
        }
        Ok(true)
    }

    /// Start watching the file in a background thread.
    ///
    /// The parent directory is watched so editors that replace the file on
    /// save are still observed.
    pub fn run(self, poll_interval: Duration) -> Result<RecommendedWatcher, SourceError> {
        let watch_dir = self
            .path
            .parent()
            .filter(|dir| !dir.as_os_str().is_empty())
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        let file_name = self.path.file_name().map(|name| name.to_os_string());
        let this = self.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: notify::Result<Event>| match res {
                Ok(event) => {
                    let touches_file = event
                        .paths
                        .iter()
                        .any(|p| p.file_name().map(|n| n.to_os_string()) == file_name);
                    if !(event.kind.is_modify() || event.kind.is_create()) || !touches_file {
                        return;
                    }
                    match this.reload() {
                        Ok(_) => metrics::record_source_reload("success"),
                        Err(e) => {
                            metrics::record_source_reload("failure");
                            tracing::error!(
                                "Failed to reload source: {}. Keeping current snapshot.",
                                e
                            );
                        }
                    }
                }
                Err(e) => tracing::error!("Watch error: {:?}", e),
            },
            Config::default().with_poll_interval(poll_interval),
        )?;

        watcher.watch(&watch_dir, RecursiveMode::NonRecursive)?;

        tracing::info!(path = ?self.path, "Source watcher started");
        Ok(watcher)
    }
}
