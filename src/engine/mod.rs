//! The index synchronization engine.
//!
//! This module provides:
//! - Engine flags with a scoped rebuild guard
//! - The vault event model
//! - Incremental event handling
//! - Start / enable / disable / teardown

mod context;
mod dispatcher;
mod events;
mod lifecycle;
mod stats;

pub use context::{EngineContext, RebuildGuard};
pub use dispatcher::Handled;
pub use events::VaultEvent;
pub use lifecycle::{CleanFailure, CleanReport, Engine, Toggled};
pub use stats::{EngineStats, EngineStatsSnapshot};
