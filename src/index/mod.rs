//! Index document synchronization.
//!
//! This module provides:
//! - Index document naming and link formatting
//! - A line-oriented store over a vault
//! - Per-folder synchronization
//! - Full-tree rebuilds

pub mod naming;
mod store;
mod updater;
mod walker;

pub use store::IndexStore;
pub use updater::{sync_folder_index, FolderSync};
pub use walker::{
    rebuild_all, sync_subtree, FolderArena, FolderFailure, FolderRecord, RebuildReport,
};
