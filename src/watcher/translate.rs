//! Native file system events to vault events.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};
use notify::{Event, EventKind};
use walkdir::WalkDir;

use crate::engine::VaultEvent;
use crate::vault::{path, ChildKind, VaultFilter};

/// Turns `notify` events into [`VaultEvent`]s with vault-relative paths.
///
/// Removed paths cannot be inspected any more, so the translator keeps the
/// set of folders it knows about to tell a deleted folder from a deleted file
/// when the native event does not say.
#[derive(Debug)]
pub struct EventTranslator {
    root: PathBuf,
    filter: VaultFilter,
    known_folders: HashSet<String>,
}

impl EventTranslator {
    /// Create a translator for the vault at `root`, seeding known folders
    /// from the current tree.
    pub fn new(root: impl Into<PathBuf>, filter: VaultFilter) -> Self {
        let root = root.into();
        let known_folders = seed_folders(&root, &filter);

        Self {
            root,
            filter,
            known_folders,
        }
    }

    /// Whether `relative` is a folder the translator knows about.
    #[must_use]
    pub fn knows_folder(&self, relative: &str) -> bool {
        self.known_folders.contains(relative)
    }

    /// Translate one native event. Content modifications yield nothing.
    ///
    /// An event flagged for rescan means the backend dropped events; it
    /// becomes [`VaultEvent::Rescan`] and the known folders are re-seeded.
    pub fn translate(&mut self, event: &Event) -> Vec<VaultEvent> {
        if event.need_rescan() {
            tracing::warn!(paths = ?event.paths, "File system events were dropped, resynchronizing");
            self.known_folders = seed_folders(&self.root, &self.filter);
            return vec![VaultEvent::Rescan];
        }

        match event.kind {
            EventKind::Create(create) => event
                .paths
                .iter()
                .filter_map(|p| {
                    let kind = match create {
                        CreateKind::Folder => ChildKind::Folder,
                        CreateKind::File => ChildKind::File,
                        _ => kind_on_disk(p),
                    };
                    self.created(p, kind)
                })
                .collect(),
            EventKind::Remove(remove) => event
                .paths
                .iter()
                .filter_map(|p| {
                    let kind = match remove {
                        RemoveKind::Folder => Some(ChildKind::Folder),
                        RemoveKind::File => Some(ChildKind::File),
                        _ => None,
                    };
                    self.removed(p, kind)
                })
                .collect(),
            EventKind::Modify(ModifyKind::Name(mode)) => self.renamed(mode, &event.paths),
            EventKind::Other => {
                tracing::warn!(paths = ?event.paths, attrs = ?event.attrs, "Ignoring unrecognized file system event");
                Vec::new()
            }
            _ => Vec::new(),
        }
    }

    fn renamed(&mut self, mode: RenameMode, paths: &[PathBuf]) -> Vec<VaultEvent> {
        match (mode, paths) {
            (RenameMode::Both, [from, to]) => {
                let old = self.visible(from, self.kind_of_removed(from));
                let kind = kind_on_disk(to);
                let new = self.visible(to, kind);
                match (old, new) {
                    (Some(old_path), Some(new_path)) => {
                        self.forget(&old_path);
                        self.remember(&new_path, kind);
                        vec![VaultEvent::renamed(old_path, new_path, kind)]
                    }
                    (Some(_), None) => self.removed(from, None).into_iter().collect(),
                    (None, Some(_)) => self.created(to, kind).into_iter().collect(),
                    (None, None) => Vec::new(),
                }
            }
            (RenameMode::From, _) => paths
                .iter()
                .filter_map(|p| self.removed(p, None))
                .collect(),
            (RenameMode::To, _) => paths
                .iter()
                .filter_map(|p| self.created(p, kind_on_disk(p)))
                .collect(),
            _ => paths
                .iter()
                .filter_map(|p| {
                    if p.exists() {
                        self.created(p, kind_on_disk(p))
                    } else {
                        self.removed(p, None)
                    }
                })
                .collect(),
        }
    }

    fn created(&mut self, absolute: &Path, kind: ChildKind) -> Option<VaultEvent> {
        let relative = self.visible(absolute, kind)?;
        self.remember(&relative, kind);
        Some(VaultEvent::Create {
            path: relative,
            kind,
        })
    }

    fn removed(&mut self, absolute: &Path, kind: Option<ChildKind>) -> Option<VaultEvent> {
        let kind = kind.unwrap_or_else(|| self.kind_of_removed(absolute));
        let relative = self.visible(absolute, kind)?;
        self.forget(&relative);
        Some(VaultEvent::Delete {
            path: relative,
            kind,
        })
    }

    fn kind_of_removed(&self, absolute: &Path) -> ChildKind {
        match path::relative_to(&self.root, absolute) {
            Some(relative) if self.known_folders.contains(&relative) => ChildKind::Folder,
            _ => ChildKind::File,
        }
    }

    /// Vault-relative path, unless the entry is the root or filtered out.
    fn visible(&self, absolute: &Path, kind: ChildKind) -> Option<String> {
        if self.filter.is_ignored(absolute, kind == ChildKind::Folder) {
            return None;
        }
        path::relative_to(&self.root, absolute).filter(|relative| !relative.is_empty())
    }

    fn remember(&mut self, relative: &str, kind: ChildKind) {
        if kind == ChildKind::Folder {
            self.known_folders.insert(relative.to_string());
        }
    }

    fn forget(&mut self, relative: &str) {
        self.known_folders
            .retain(|folder| folder != relative && !path::is_within(folder, relative));
    }
}

fn seed_folders(root: &Path, filter: &VaultFilter) -> HashSet<String> {
    WalkDir::new(root)
        .min_depth(1)
        .into_iter()
        .filter_entry(|e| !filter.is_ignored(e.path(), e.file_type().is_dir()))
        .filter_map(std::result::Result::ok)
        .filter(|e| e.file_type().is_dir())
        .filter_map(|e| path::relative_to(root, e.path()))
        .collect()
}

fn kind_on_disk(absolute: &Path) -> ChildKind {
    if absolute.is_dir() {
        ChildKind::Folder
    } else {
        ChildKind::File
    }
}
