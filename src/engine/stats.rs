//! Engine counters.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;

/// Counters updated by the engine.
#[derive(Debug, Default)]
pub struct EngineStats {
    pub events_received: AtomicU64,
    pub events_applied: AtomicU64,
    pub events_ignored: AtomicU64,
    pub rebuilds: AtomicU64,
    pub documents_deleted: AtomicU64,
    pub errors: AtomicU64,
}

impl EngineStats {
    /// Create new stats tracker.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get snapshot of current stats.
    #[must_use]
    pub fn snapshot(&self) -> EngineStatsSnapshot {
        EngineStatsSnapshot {
            events_received: self.events_received.load(Ordering::Relaxed),
            events_applied: self.events_applied.load(Ordering::Relaxed),
            events_ignored: self.events_ignored.load(Ordering::Relaxed),
            rebuilds: self.rebuilds.load(Ordering::Relaxed),
            documents_deleted: self.documents_deleted.load(Ordering::Relaxed),
            errors: self.errors.load(Ordering::Relaxed),
        }
    }
}

/// Snapshot of engine stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EngineStatsSnapshot {
    pub events_received: u64,
    pub events_applied: u64,
    pub events_ignored: u64,
    pub rebuilds: u64,
    pub documents_deleted: u64,
    pub errors: u64,
}
