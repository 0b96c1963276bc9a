//! File system watching.
//!
//! This module provides:
//! - Directory watching using notify-rs
//! - Translation of native events into vault events

mod translate;
#[allow(clippy::module_inception)]
mod watcher;

pub use translate::EventTranslator;
pub use watcher::{FileWatcher, DEFAULT_EVENT_CAPACITY};
