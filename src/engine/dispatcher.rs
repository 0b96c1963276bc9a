//! Incremental event handling.
//!
//! Create and delete patch a single line in the parent folder's index
//! document. A created folder has its whole subtree synchronized, since it
//! may have been moved or copied in with content. Rename cannot be patched
//! reliably (a subtree may have moved across folders) and falls back to a
//! full rebuild.

use super::events::VaultEvent;
use super::lifecycle::Engine;
use super::stats::EngineStats;
use crate::error::IndexError;
use crate::index::{naming, sync_subtree, FolderArena, IndexStore, RebuildReport};
use crate::observability::spans;
use crate::vault::{path, ChildKind, Folder, Vault};
use crate::Result;

/// What handling one event did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    /// Incremental mode is off.
    Disabled,
    /// A rebuild is running; the event is treated as its side effect.
    Suppressed,
    /// The event concerns an index document or a vanished parent.
    Skipped,
    /// A link line was appended.
    Appended,
    /// The expected link was already present (create) or absent (delete).
    Unchanged,
    /// This many link lines were removed.
    Removed(usize),
    /// A full rebuild ran.
    Resynced(RebuildReport),
    /// The event could not be applied; the error has been logged.
    Failed(String),
}

impl<V: Vault> Engine<V> {
    /// Apply one vault event.
    ///
    /// Never fails: errors are logged and reported as [`Handled::Failed`].
    /// A missing index document is not recreated here; re-enable or rebuild.
    pub fn handle(&self, event: VaultEvent) -> Handled {
        EngineStats::bump(&self.stats.events_received);

        if !self.context.is_enabled() {
            EngineStats::bump(&self.stats.events_ignored);
            return Handled::Disabled;
        }
        if self.context.is_rebuilding() {
            EngineStats::bump(&self.stats.events_ignored);
            return Handled::Suppressed;
        }

        let span = spans::event_span(event.label(), event.path());
        let _enter = span.enter();

        let outcome = match &event {
            VaultEvent::Create { path, kind } => self.on_create(path, *kind),
            VaultEvent::Delete { path, kind } => self.on_delete(path, *kind),
            VaultEvent::Rename {
                path,
                old_path,
                kind,
            } => Ok(self.on_rename(path, old_path, *kind)),
            VaultEvent::Rescan => Ok(Handled::Resynced(self.rebuild())),
        };

        match outcome {
            Ok(Handled::Skipped) => {
                EngineStats::bump(&self.stats.events_ignored);
                Handled::Skipped
            }
            Ok(handled) => {
                EngineStats::bump(&self.stats.events_applied);
                tracing::debug!(?handled, "Event applied");
                handled
            }
            Err(e) => {
                EngineStats::bump(&self.stats.errors);
                if matches!(e, crate::Error::Index(ref inner) if inner.is_not_found()) {
                    tracing::warn!(error = %e, "Index document missing, restart the indexes");
                } else {
                    tracing::error!(error = %e, "Failed to apply event");
                }
                Handled::Failed(e.to_string())
            }
        }
    }

    fn on_create(&self, entry: &str, kind: ChildKind) -> Result<Handled> {
        let Some(parent) = self.parent_folder(entry) else {
            return Ok(Handled::Skipped);
        };
        let name = path::file_name(entry);
        if kind == ChildKind::File && naming::is_self_reference(&parent, name) {
            return Ok(Handled::Skipped);
        }

        let store = IndexStore::new(&self.vault);
        let index_path = naming::index_path_for(&parent, &self.root);
        if !store.exists(&index_path) {
            return Err(IndexError::not_found(index_path).into());
        }

        let appended = store.append_line_if_absent(&index_path, &naming::link_for(kind, name))?;
        tracing::info!(index = %index_path, appended, "Added link");

        if kind == ChildKind::Folder {
            let folder = Folder::at(entry, &self.root.name);
            self.remove_carried_indexes(&folder);
            let report = sync_subtree(&self.vault, &folder, &self.root);
            if let Some(failure) = report.failures.first() {
                return Err(IndexError::read_write(&failure.folder, &failure.error).into());
            }
        }

        Ok(if appended {
            Handled::Appended
        } else {
            Handled::Unchanged
        })
    }

    fn on_delete(&self, entry: &str, kind: ChildKind) -> Result<Handled> {
        let Some(parent) = self.parent_folder(entry) else {
            return Ok(Handled::Skipped);
        };
        if !self.vault.is_folder(&parent.path) {
            return Ok(Handled::Skipped);
        }
        let name = path::file_name(entry);
        if kind == ChildKind::File && naming::is_self_reference(&parent, name) {
            return Ok(Handled::Skipped);
        }

        let store = IndexStore::new(&self.vault);
        let index_path = naming::index_path_for(&parent, &self.root);
        if !store.exists(&index_path) {
            return Err(IndexError::not_found(index_path).into());
        }

        let removed = store.remove_line(&index_path, &naming::link_for(kind, name))?;
        tracing::info!(index = %index_path, removed, "Removed link");

        Ok(if removed > 0 {
            Handled::Removed(removed)
        } else {
            Handled::Unchanged
        })
    }

    fn on_rename(&self, entry: &str, old_path: &str, kind: ChildKind) -> Handled {
        match self.detach_old_location(entry, old_path, kind) {
            Ok(removed) => {
                tracing::debug!(old_path, removed, "Detached old location");
            }
            Err(e) => {
                tracing::warn!(old_path, error = %e, "Could not detach old location, relying on rebuild");
            }
        }

        if kind == ChildKind::Folder {
            self.remove_carried_indexes(&Folder::at(entry, &self.root.name));
        }

        Handled::Resynced(self.rebuild())
    }

    /// Remove the link to `old_path` from its former parent's index.
    fn detach_old_location(&self, entry: &str, old_path: &str, kind: ChildKind) -> Result<usize> {
        let ambiguity = || IndexError::StructuralAmbiguity {
            from: old_path.to_string(),
            to: entry.to_string(),
        };

        let parent = self.parent_folder(old_path).ok_or_else(ambiguity)?;
        if !self.vault.is_folder(&parent.path) {
            return Err(ambiguity().into());
        }

        let name = path::file_name(old_path);
        if kind == ChildKind::File && naming::is_self_reference(&parent, name) {
            return Ok(0);
        }

        let store = IndexStore::new(&self.vault);
        let index_path = naming::index_path_for(&parent, &self.root);
        if !store.exists(&index_path) {
            return Ok(0);
        }
        store.remove_line(&index_path, &naming::link_for(kind, name))
    }

    /// Delete index documents a moved or renamed folder brought along under
    /// a name that is no longer its own (`new/old_index.md`), at any depth.
    fn remove_carried_indexes(&self, top: &Folder) -> usize {
        let arena = FolderArena::collect(&self.vault, top);
        let mut removed = 0;

        for record in arena.iter() {
            let stale = record.children.iter().filter(|child| {
                child.kind == ChildKind::File
                    && naming::is_index_document(&child.name)
                    && !naming::is_self_reference(&record.folder, &child.name)
            });
            for child in stale {
                let stale_path = record.folder.child_path(&child.name);
                match self.vault.delete(&stale_path) {
                    Ok(()) => {
                        removed += 1;
                        EngineStats::bump(&self.stats.documents_deleted);
                        tracing::info!(path = %stale_path, "Removed stale index document");
                    }
                    Err(e) => {
                        tracing::warn!(path = %stale_path, error = %e, "Failed to remove stale index document");
                    }
                }
            }
        }

        removed
    }

    fn parent_folder(&self, entry: &str) -> Option<Folder> {
        path::parent_of(entry).map(|parent| Folder::at(parent, &self.root.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    fn enabled_engine() -> Engine<MemoryVault> {
        let engine = Engine::new(
            MemoryVault::new("Vault")
                .with_file("inbox.md", "")
                .with_file("f/one.md", "")
                .with_file("f/two.md", "")
                .with_folder("f/sub"),
        );
        engine.enable();
        engine
    }

    #[test]
    fn test_events_ignored_while_disabled() {
        let engine = Engine::new(MemoryVault::new("Vault").with_file("f/one.md", ""));
        engine.start();
        engine.vault().add_file("f/new.md", "");

        assert_eq!(engine.handle(VaultEvent::created_file("f/new.md")), Handled::Disabled);
        assert_eq!(engine.vault().body("f/f_index.md").as_deref(), Some("[[one]]\n"));
        assert_eq!(engine.stats_snapshot().events_ignored, 1);
    }

    #[test]
    fn test_events_suppressed_during_rebuild() {
        let engine = enabled_engine();
        engine.vault().add_file("f/new.md", "");

        let guard = engine.context().rebuild_guard();
        assert_eq!(engine.handle(VaultEvent::created_file("f/new.md")), Handled::Suppressed);
        assert_eq!(engine.handle(VaultEvent::deleted_file("f/one.md")), Handled::Suppressed);
        drop(guard);

        assert!(!engine.vault().body("f/f_index.md").unwrap().contains("[[new]]"));
    }

    #[test]
    fn test_create_appends_one_line() {
        let engine = enabled_engine();
        let before = engine.vault().body("f/f_index.md").unwrap();
        engine.vault().add_file("f/note.md", "");

        assert_eq!(engine.handle(VaultEvent::created_file("f/note.md")), Handled::Appended);
        assert_eq!(
            engine.vault().body("f/f_index.md").unwrap(),
            format!("{before}[[note]]\n")
        );

        // delivered twice
        assert_eq!(engine.handle(VaultEvent::created_file("f/note.md")), Handled::Unchanged);
    }

    #[test]
    fn test_create_at_root_uses_root_document() {
        let engine = enabled_engine();
        engine.vault().add_file("top.md", "");

        assert_eq!(engine.handle(VaultEvent::created_file("top.md")), Handled::Appended);
        assert!(engine
            .vault()
            .body("Vault_index.md")
            .unwrap()
            .ends_with("[[top]]\n"));
    }

    #[test]
    fn test_create_index_document_is_skipped() {
        let engine = enabled_engine();
        let writes = engine.vault().write_count();

        assert_eq!(engine.handle(VaultEvent::created_file("f/f_index.md")), Handled::Skipped);
        assert_eq!(engine.handle(VaultEvent::created_file("Vault_index.md")), Handled::Skipped);
        assert_eq!(engine.handle(VaultEvent::created_file("f/index.md")), Handled::Skipped);
        assert_eq!(engine.vault().write_count(), writes);
    }

    #[test]
    fn test_create_folder_embeds_and_creates_document() {
        let engine = enabled_engine();
        engine.vault().add_file("f/fresh/idea.md", "");

        assert_eq!(engine.handle(VaultEvent::created_folder("f/fresh")), Handled::Appended);
        assert!(engine
            .vault()
            .body("f/f_index.md")
            .unwrap()
            .contains("![[fresh_index.md]]"));
        assert_eq!(
            engine.vault().body("f/fresh/fresh_index.md").as_deref(),
            Some("[[idea]]\n")
        );

        engine.vault().add_file("f/fresh/later.md", "");
        assert_eq!(
            engine.handle(VaultEvent::created_file("f/fresh/later.md")),
            Handled::Appended
        );
    }

    #[test]
    fn test_create_folder_indexes_nested_subtree() {
        let engine = enabled_engine();
        engine.vault().add_file("f/moved/inner/deep.md", "");

        assert_eq!(engine.handle(VaultEvent::created_folder("f/moved")), Handled::Appended);
        assert_eq!(
            engine.vault().body("f/moved/moved_index.md").as_deref(),
            Some("![[inner_index.md]]\n")
        );
        assert_eq!(
            engine.vault().body("f/moved/inner/inner_index.md").as_deref(),
            Some("[[deep]]\n")
        );

        engine.vault().add_file("f/moved/inner/later.md", "");
        assert_eq!(
            engine.handle(VaultEvent::created_file("f/moved/inner/later.md")),
            Handled::Appended
        );
    }

    #[test]
    fn test_folder_rename_as_delete_then_create() {
        let engine = Engine::new(MemoryVault::new("Vault").with_file("old/n.md", ""));
        engine.enable();
        engine.vault().rename("old", "new");

        assert_eq!(
            engine.handle(VaultEvent::deleted_folder("old")),
            Handled::Removed(1)
        );
        assert_eq!(engine.handle(VaultEvent::created_folder("new")), Handled::Appended);

        assert!(!engine.vault().is_file("new/old_index.md"));
        assert_eq!(engine.vault().body("new/new_index.md").as_deref(), Some("[[n]]\n"));
        assert_eq!(
            engine.vault().body("Vault_index.md").as_deref(),
            Some("![[new_index.md]]\n")
        );
        assert_eq!(engine.stats_snapshot().documents_deleted, 1);
    }

    #[test]
    fn test_delete_without_document_fails() {
        let engine = enabled_engine();
        engine.vault().delete("f/f_index.md").unwrap();
        engine.vault().remove("f/one.md");

        let handled = engine.handle(VaultEvent::deleted_file("f/one.md"));
        assert!(matches!(handled, Handled::Failed(ref msg) if msg.contains("f/f_index.md")));
        assert!(!engine.vault().is_file("f/f_index.md"));
        assert_eq!(engine.stats_snapshot().errors, 1);
    }

    #[test]
    fn test_rescan_rebuilds_missed_changes() {
        let engine = enabled_engine();
        engine.vault().add_file("f/missed.md", "");

        let handled = engine.handle(VaultEvent::Rescan);
        assert!(matches!(handled, Handled::Resynced(ref r) if r.is_clean()));
        assert!(engine
            .vault()
            .body("f/f_index.md")
            .unwrap()
            .ends_with("[[missed]]\n"));

        engine.context().set_enabled(false);
        assert_eq!(engine.handle(VaultEvent::Rescan), Handled::Disabled);
    }

    #[test]
    fn test_create_without_document_fails() {
        let engine = enabled_engine();
        engine.vault().add_file("g/orphan.md", "");

        let handled = engine.handle(VaultEvent::created_file("g/orphan.md"));
        assert!(matches!(handled, Handled::Failed(ref msg) if msg.contains("g/g_index.md")));
        assert!(!engine.vault().is_file("g/g_index.md"));
        assert_eq!(engine.stats_snapshot().errors, 1);
    }

    #[test]
    fn test_delete_removes_exact_line() {
        let engine = enabled_engine();
        engine.vault().remove("f/one.md");

        assert_eq!(
            engine.handle(VaultEvent::deleted_file("f/one.md")),
            Handled::Removed(1)
        );
        assert_eq!(
            engine.vault().body("f/f_index.md").as_deref(),
            Some("![[sub_index.md]]\n[[two]]\n")
        );
        assert_eq!(engine.handle(VaultEvent::deleted_file("f/one.md")), Handled::Unchanged);
    }

    #[test]
    fn test_delete_folder_removes_embed() {
        let engine = enabled_engine();
        engine.vault().remove("f/sub");

        assert_eq!(
            engine.handle(VaultEvent::deleted_folder("f/sub")),
            Handled::Removed(1)
        );
        assert_eq!(
            engine.vault().body("f/f_index.md").as_deref(),
            Some("[[one]]\n[[two]]\n")
        );
    }

    #[test]
    fn test_delete_inside_vanished_folder_is_noop() {
        let engine = enabled_engine();
        engine.vault().remove("f");
        let writes = engine.vault().write_count();

        assert_eq!(engine.handle(VaultEvent::deleted_file("f/one.md")), Handled::Skipped);
        assert_eq!(engine.handle(VaultEvent::deleted_folder("f/sub")), Handled::Skipped);
        assert_eq!(engine.vault().write_count(), writes);
    }

    #[test]
    fn test_rename_moves_link_between_folders() {
        let engine = Engine::new(
            MemoryVault::new("Vault")
                .with_file("a/x.md", "")
                .with_file("a/y.md", "")
                .with_folder("b"),
        );
        engine.enable();
        engine.vault().rename("a/x.md", "b/x.md");

        let handled = engine.handle(VaultEvent::renamed("a/x.md", "b/x.md", ChildKind::File));
        assert!(matches!(handled, Handled::Resynced(ref r) if r.is_clean()));
        assert_eq!(engine.vault().body("a/a_index.md").as_deref(), Some("[[y]]\n"));
        assert_eq!(engine.vault().body("b/b_index.md").as_deref(), Some("[[x]]\n"));
        assert!(!engine.is_rebuilding());
    }

    #[test]
    fn test_rename_folder_replaces_stale_document() {
        let engine = Engine::new(MemoryVault::new("Vault").with_file("old/note.md", ""));
        engine.enable();
        engine.vault().rename("old", "new");

        engine.handle(VaultEvent::renamed("old", "new", ChildKind::Folder));

        let root = engine.vault().body("Vault_index.md").unwrap();
        assert_eq!(root, "![[new_index.md]]\n");
        assert!(!engine.vault().is_file("new/old_index.md"));
        assert_eq!(
            engine.vault().body("new/new_index.md").as_deref(),
            Some("[[note]]\n")
        );
    }

    #[test]
    fn test_rename_from_vanished_folder_still_rebuilds() {
        let engine = Engine::new(MemoryVault::new("Vault").with_file("a/x.md", ""));
        engine.enable();
        engine.vault().rename("a/x.md", "x.md");
        engine.vault().remove("a");

        let handled = engine.handle(VaultEvent::renamed("a/x.md", "x.md", ChildKind::File));
        assert!(matches!(handled, Handled::Resynced(_)));
        assert!(engine
            .vault()
            .body("Vault_index.md")
            .unwrap()
            .contains("[[x]]"));
    }
}
