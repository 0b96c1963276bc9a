//! Engine lifecycle: start, enable/disable, rebuild, teardown.

use std::sync::Arc;

use serde::Serialize;

use super::context::EngineContext;
use super::stats::{EngineStats, EngineStatsSnapshot};
use crate::index::{naming, rebuild_all, RebuildReport};
use crate::observability::spans;
use crate::vault::{path, Folder, Vault};

/// Outcome of removing every index document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CleanReport {
    pub deleted: usize,
    pub failures: Vec<CleanFailure>,
}

/// An index document that could not be deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CleanFailure {
    pub path: String,
    pub error: String,
}

/// Result of a toggle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Toggled {
    /// Incremental mode was switched on after a rebuild.
    Enabled(RebuildReport),
    /// Incremental mode was switched off and every index document removed.
    Disabled(CleanReport),
}

/// The index synchronization engine for one vault.
pub struct Engine<V: Vault> {
    pub(super) vault: V,
    pub(super) root: Folder,
    pub(super) context: EngineContext,
    pub(super) stats: Arc<EngineStats>,
}

impl<V: Vault> Engine<V> {
    /// Create a disabled engine over `vault`.
    pub fn new(vault: V) -> Self {
        let root = Folder::root(vault.root_name());
        Self {
            vault,
            root,
            context: EngineContext::new(),
            stats: EngineStats::new(),
        }
    }

    /// The underlying vault.
    pub const fn vault(&self) -> &V {
        &self.vault
    }

    /// The vault's root folder.
    pub const fn root(&self) -> &Folder {
        &self.root
    }

    /// Engine flags.
    pub const fn context(&self) -> &EngineContext {
        &self.context
    }

    /// Whether incremental event handling is on.
    pub fn is_enabled(&self) -> bool {
        self.context.is_enabled()
    }

    /// Whether a rebuild is running.
    pub fn is_rebuilding(&self) -> bool {
        self.context.is_rebuilding()
    }

    /// Shared counters.
    pub fn stats(&self) -> Arc<EngineStats> {
        Arc::clone(&self.stats)
    }

    /// Snapshot of the counters.
    pub fn stats_snapshot(&self) -> EngineStatsSnapshot {
        self.stats.snapshot()
    }

    /// Process start: one rebuild regardless of the enabled flag.
    pub fn start(&self) -> RebuildReport {
        tracing::info!(vault = %self.root.name, "Starting index engine");
        self.rebuild()
    }

    /// Synchronize every folder's index document.
    ///
    /// Events handled while this runs are suppressed.
    pub fn rebuild(&self) -> RebuildReport {
        let span = spans::rebuild_span(&self.root.name);
        let _enter = span.enter();
        let _guard = self.context.rebuild_guard();

        EngineStats::bump(&self.stats.rebuilds);
        let report = rebuild_all(&self.vault, &self.root);
        if !report.is_clean() {
            EngineStats::bump(&self.stats.errors);
        }
        report
    }

    /// Rebuild, then start handling events.
    pub fn enable(&self) -> RebuildReport {
        let report = self.rebuild();
        self.context.set_enabled(true);
        tracing::info!("Indexes enabled");
        report
    }

    /// Remove every index document, then stop handling events.
    pub fn disable(&self) -> CleanReport {
        let report = self.delete_all_indexes();
        self.context.set_enabled(false);
        tracing::info!(deleted = report.deleted, "Indexes disabled");
        report
    }

    /// Flip between enabled and disabled.
    pub fn toggle(&self) -> Toggled {
        if self.is_enabled() {
            Toggled::Disabled(self.disable())
        } else {
            Toggled::Enabled(self.enable())
        }
    }

    /// Process teardown: remove every index document whatever the flags say.
    pub fn teardown(&self) -> CleanReport {
        tracing::info!(vault = %self.root.name, "Tearing down index engine");
        let report = self.delete_all_indexes();
        self.context.set_enabled(false);
        report
    }

    /// Delete every file named like an index document.
    ///
    /// Failures are logged and collected; the scan continues.
    pub fn delete_all_indexes(&self) -> CleanReport {
        let mut report = CleanReport::default();

        let files = match self.vault.list_files() {
            Ok(files) => files,
            Err(e) => {
                tracing::error!(error = %e, "Failed to scan vault for index documents");
                EngineStats::bump(&self.stats.errors);
                report.failures.push(CleanFailure {
                    path: path::ROOT.to_string(),
                    error: e.to_string(),
                });
                return report;
            }
        };

        for file in files
            .iter()
            .filter(|f| naming::is_index_document(path::file_name(f)))
        {
            match self.vault.delete(file) {
                Ok(()) => {
                    report.deleted += 1;
                    EngineStats::bump(&self.stats.documents_deleted);
                }
                Err(e) => {
                    tracing::warn!(path = %file, error = %e, "Failed to delete index document");
                    EngineStats::bump(&self.stats.errors);
                    report.failures.push(CleanFailure {
                        path: file.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        tracing::debug!(deleted = report.deleted, "Removed index documents");
        report
    }
}
