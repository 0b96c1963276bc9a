//! Engine flags.

use std::sync::atomic::{AtomicBool, Ordering};

/// The `enabled` and `rebuilding` flags shared by every engine operation.
///
/// Both start cleared.
#[derive(Debug, Default)]
pub struct EngineContext {
    enabled: AtomicBool,
    rebuilding: AtomicBool,
}

impl EngineContext {
    /// Create a context with both flags cleared.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether incremental event handling is on.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Switch incremental event handling on or off.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::SeqCst);
    }

    /// Whether a full rebuild is running.
    #[must_use]
    pub fn is_rebuilding(&self) -> bool {
        self.rebuilding.load(Ordering::SeqCst)
    }

    /// Mark a rebuild as running until the returned guard is dropped.
    #[must_use = "the rebuild flag is cleared as soon as the guard is dropped"]
    pub fn rebuild_guard(&self) -> RebuildGuard<'_> {
        let nested = self.rebuilding.swap(true, Ordering::SeqCst);
        RebuildGuard {
            context: self,
            nested,
        }
    }
}

/// Keeps the `rebuilding` flag set while alive.
///
/// A guard taken while another is alive leaves the flag to the outer one.
#[derive(Debug)]
pub struct RebuildGuard<'a> {
    context: &'a EngineContext,
    nested: bool,
}

impl Drop for RebuildGuard<'_> {
    fn drop(&mut self) {
        if !self.nested {
            self.context.rebuilding.store(false, Ordering::SeqCst);
        }
    }
}
