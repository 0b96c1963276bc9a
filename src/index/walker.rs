//! Full-tree rebuild.
//!
//! The tree is first collected into an arena of folder records with an
//! explicit queue (root first, then breadth first), then every record is
//! synchronized in that order. A folder whose listing fails is reported and
//! its subtree skipped; its siblings are unaffected.

use std::collections::{HashMap, VecDeque};

use serde::Serialize;

use super::updater::sync_with_children;
use crate::vault::{ChildKind, ChildRef, Folder, Vault};

/// A folder and its direct children, as listed during collection.
#[derive(Debug, Clone)]
pub struct FolderRecord {
    pub folder: Folder,
    pub children: Vec<ChildRef>,
}

/// Every reachable folder of a vault, indexed by path.
#[derive(Debug, Default)]
pub struct FolderArena {
    records: Vec<FolderRecord>,
    by_path: HashMap<String, usize>,
    failures: Vec<FolderFailure>,
}

impl FolderArena {
    /// Walk the vault from `root`, listing each folder exactly once.
    pub fn collect<V: Vault + ?Sized>(vault: &V, root: &Folder) -> Self {
        let mut arena = Self::default();
        let vault_name = root.name.clone();
        let mut queue = VecDeque::from([root.clone()]);

        while let Some(folder) = queue.pop_front() {
            if arena.by_path.contains_key(&folder.path) {
                continue;
            }

            let children = match vault.list_children(&folder.path) {
                Ok(children) => children,
                Err(e) => {
                    tracing::warn!(folder = %folder.path, error = %e, "Failed to list folder");
                    arena.failures.push(FolderFailure::new(&folder.path, &e));
                    continue;
                }
            };

            for child in &children {
                if child.kind == ChildKind::Folder {
                    queue.push_back(Folder::at(&folder.child_path(&child.name), &vault_name));
                }
            }

            arena.by_path.insert(folder.path.clone(), arena.records.len());
            arena.records.push(FolderRecord { folder, children });
        }

        arena
    }

    /// Records in visiting order.
    pub fn iter(&self) -> impl Iterator<Item = &FolderRecord> {
        self.records.iter()
    }

    /// Record for a folder path.
    #[must_use]
    pub fn get(&self, folder_path: &str) -> Option<&FolderRecord> {
        self.by_path.get(folder_path).map(|&idx| &self.records[idx])
    }

    /// Number of collected folders.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Whether nothing was collected.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Folders that could not be listed.
    #[must_use]
    pub fn failures(&self) -> &[FolderFailure] {
        &self.failures
    }
}

/// A folder whose index could not be listed or synchronized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderFailure {
    pub folder: String,
    pub error: String,
}

impl FolderFailure {
    fn new(folder: &str, error: &crate::Error) -> Self {
        Self {
            folder: folder.to_string(),
            error: error.to_string(),
        }
    }
}

/// Outcome of a full rebuild.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
    pub folders_visited: usize,
    pub documents_created: usize,
    pub links_appended: usize,
    pub failures: Vec<FolderFailure>,
}

impl RebuildReport {
    /// Whether every folder was synchronized.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Synchronize the index document of `root` and every descendant folder.
///
/// Never fails as a whole: per-folder errors are logged and collected in the
/// report.
pub fn rebuild_all<V: Vault + ?Sized>(vault: &V, root: &Folder) -> RebuildReport {
    let report = sync_subtree(vault, root, root);

    tracing::info!(
        folders = report.folders_visited,
        created = report.documents_created,
        appended = report.links_appended,
        failures = report.failures.len(),
        "Rebuild complete"
    );

    report
}

/// Synchronize `top` and every folder below it.
///
/// `root` is the vault root, which decides how index documents are named.
pub fn sync_subtree<V: Vault + ?Sized>(vault: &V, top: &Folder, root: &Folder) -> RebuildReport {
    let arena = FolderArena::collect(vault, top);
    let mut report = RebuildReport {
        failures: arena.failures().to_vec(),
        ..RebuildReport::default()
    };

    for record in arena.iter() {
        report.folders_visited += 1;
        match sync_with_children(vault, &record.folder, &record.children, root) {
            Ok(sync) => {
                report.documents_created += usize::from(sync.created);
                report.links_appended += sync.appended;
            }
            Err(e) => {
                tracing::warn!(folder = %record.folder.path, error = %e, "Failed to sync folder index");
                report.failures.push(FolderFailure::new(&record.folder.path, &e));
            }
        }
    }

    report
}
