//! File system watcher using notify-rs.

use std::path::{Path, PathBuf};

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;

use super::translate::EventTranslator;
use crate::engine::VaultEvent;
use crate::error::WatcherError;
use crate::vault::VaultFilter;
use crate::Result;

/// Default capacity of the event channel.
pub const DEFAULT_EVENT_CAPACITY: usize = 1024;

/// Watches a vault directory and yields [`VaultEvent`]s in arrival order.
pub struct FileWatcher {
    _watcher: RecommendedWatcher,
    event_rx: mpsc::Receiver<VaultEvent>,
    root: PathBuf,
}

impl FileWatcher {
    /// Start watching `root` recursively.
    ///
    /// `root` must be the canonical vault directory the filter was built for.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher cannot be created or the directory
    /// cannot be watched.
    pub fn new(root: impl AsRef<Path>, filter: VaultFilter, capacity: usize) -> Result<Self> {
        let root = root.as_ref().to_path_buf();

        if !root.is_dir() {
            return Err(WatcherError::WatchFailed {
                path: root.display().to_string(),
                reason: "directory does not exist".to_string(),
            }
            .into());
        }

        let (event_tx, event_rx) = mpsc::channel(capacity.max(1));
        let mut translator = EventTranslator::new(&root, filter);

        let mut watcher = notify::recommended_watcher(
            move |result: std::result::Result<notify::Event, notify::Error>| match result {
                Ok(event) => {
                    for vault_event in translator.translate(&event) {
                        tracing::trace!(?vault_event, "Queued vault event");
                        if event_tx.blocking_send(vault_event).is_err() {
                            tracing::debug!("Event channel closed, dropping events");
                            return;
                        }
                    }
                }
                Err(e) => {
                    tracing::error!("Watch error: {:?}", e);
                }
            },
        )
        .map_err(|e| WatcherError::WatchFailed {
            path: "init".to_string(),
            reason: e.to_string(),
        })?;

        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| WatcherError::WatchFailed {
                path: root.display().to_string(),
                reason: e.to_string(),
            })?;

        tracing::info!(path = %root.display(), "Watching vault");

        Ok(Self {
            _watcher: watcher,
            event_rx,
            root,
        })
    }

    /// Receive the next event.
    ///
    /// Returns `None` if the watcher has stopped.
    pub async fn recv(&mut self) -> Option<VaultEvent> {
        self.event_rx.recv().await
    }

    /// Watched directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }
}
