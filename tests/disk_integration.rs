//! Integration tests for index synchronization on a real directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tempfile::TempDir;
use vaultindex::engine::Handled;
use vaultindex::vault::{ChildKind, DiskVault};
use vaultindex::watcher::FileWatcher;
use vaultindex::{Engine, VaultEvent};

/// Create a vault directory named `Notes` inside a temp dir.
fn notes_vault() -> (TempDir, PathBuf) {
    let tmp = TempDir::new().unwrap();
    let root = tmp.path().join("Notes");
    fs::create_dir_all(root.join("projects/rust")).unwrap();
    fs::create_dir_all(root.join("journal")).unwrap();
    fs::create_dir_all(root.join(".obsidian")).unwrap();
    fs::write(root.join("readme.md"), "# Notes\n").unwrap();
    fs::write(root.join("projects/roadmap.md"), "").unwrap();
    fs::write(root.join("projects/rust/borrowck.md"), "").unwrap();
    fs::write(root.join("journal/2024-01-01.md"), "").unwrap();
    fs::write(root.join(".obsidian/workspace.json"), "{}").unwrap();
    (tmp, root)
}

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_default()
}

fn has_line(path: &Path, line: &str) -> bool {
    read(path).lines().any(|l| l == line)
}

#[test]
fn test_rebuild_writes_expected_documents() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());

    let report = engine.rebuild();
    assert!(report.is_clean());
    assert_eq!(report.folders_visited, 4);

    let root_index = root.join("Notes_index.md");
    assert!(has_line(&root_index, "[[readme]]"));
    assert!(has_line(&root_index, "![[projects_index.md]]"));
    assert!(has_line(&root_index, "![[journal_index.md]]"));
    assert!(!read(&root_index).contains("obsidian"));

    let projects = root.join("projects/projects_index.md");
    assert!(has_line(&projects, "[[roadmap]]"));
    assert!(has_line(&projects, "![[rust_index.md]]"));
    assert!(has_line(&root.join("projects/rust/rust_index.md"), "[[borrowck]]"));
    assert!(has_line(&root.join("journal/journal_index.md"), "[[2024-01-01]]"));
    assert!(!root.join(".obsidian/.obsidian_index.md").exists());

    let snapshot = read(&projects);
    assert!(engine.rebuild().is_clean());
    assert_eq!(read(&projects), snapshot);
}

#[test]
fn test_ignore_patterns_hide_folders() {
    let (_tmp, root) = notes_vault();
    fs::create_dir_all(root.join("templates")).unwrap();
    fs::write(root.join("templates/daily.md"), "").unwrap();

    let engine = Engine::new(DiskVault::with_patterns(&root, &["templates/"]).unwrap());
    engine.rebuild();

    assert!(!has_line(&root.join("Notes_index.md"), "![[templates_index.md]]"));
    assert!(!root.join("templates/templates_index.md").exists());
}

#[test]
fn test_incremental_create_and_delete() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());
    engine.enable();

    let journal = root.join("journal/journal_index.md");
    fs::write(root.join("journal/2024-01-02.md"), "").unwrap();
    assert_eq!(
        engine.handle(VaultEvent::created_file("journal/2024-01-02.md")),
        Handled::Appended
    );
    assert_eq!(
        read(&journal),
        "[[2024-01-01]]\n[[2024-01-02]]\n"
    );

    fs::remove_file(root.join("journal/2024-01-01.md")).unwrap();
    assert_eq!(
        engine.handle(VaultEvent::deleted_file("journal/2024-01-01.md")),
        Handled::Removed(1)
    );
    assert_eq!(read(&journal), "[[2024-01-02]]\n");
}

#[test]
fn test_hand_edited_index_keeps_user_lines() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());
    engine.enable();

    let journal = root.join("journal/journal_index.md");
    fs::write(&journal, "# Journal\n[[2024-01-01]]\nsee also").unwrap();

    fs::write(root.join("journal/later.md"), "").unwrap();
    engine.handle(VaultEvent::created_file("journal/later.md"));
    assert_eq!(read(&journal), "# Journal\n[[2024-01-01]]\nsee also\n[[later]]\n");
}

#[test]
fn test_rename_folder_on_disk() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());
    engine.enable();

    fs::rename(root.join("projects/rust"), root.join("journal/rustlang")).unwrap();
    let handled = engine.handle(VaultEvent::renamed(
        "projects/rust",
        "journal/rustlang",
        ChildKind::Folder,
    ));
    assert!(matches!(handled, Handled::Resynced(_)));

    assert!(!has_line(&root.join("projects/projects_index.md"), "![[rust_index.md]]"));
    assert!(has_line(&root.join("journal/journal_index.md"), "![[rustlang_index.md]]"));
    assert!(root.join("journal/rustlang/rustlang_index.md").exists());
    assert!(!root.join("journal/rustlang/rust_index.md").exists());
}

#[test]
fn test_disable_leaves_notes_untouched() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());
    engine.enable();

    let report = engine.disable();
    assert_eq!(report.deleted, 4);
    assert!(!root.join("Notes_index.md").exists());
    assert!(!root.join("projects/projects_index.md").exists());
    assert_eq!(read(&root.join("readme.md")), "# Notes\n");
    assert!(root.join(".obsidian/workspace.json").exists());
}

#[tokio::test]
async fn test_watcher_drives_engine() {
    let (_tmp, root) = notes_vault();
    let vault = DiskVault::open(&root).unwrap();
    let mut watcher = FileWatcher::new(vault.root_dir(), vault.filter().clone(), 64).unwrap();
    let engine = Engine::new(vault);
    engine.enable();

    fs::write(root.join("projects/ideas.md"), "").unwrap();
    let projects = root.join("projects/projects_index.md");

    let found = tokio::time::timeout(Duration::from_secs(10), async {
        while let Some(event) = watcher.recv().await {
            engine.handle(event);
            if has_line(&projects, "[[ideas]]") {
                return true;
            }
        }
        false
    })
    .await
    .unwrap_or(false);

    assert!(found, "watcher event never reached the index");
}

#[test]
fn test_folder_copied_in_with_content() {
    let (_tmp, root) = notes_vault();
    let engine = Engine::new(DiskVault::open(&root).unwrap());
    engine.enable();

    fs::create_dir_all(root.join("journal/archive/2023")).unwrap();
    fs::write(root.join("journal/archive/2023/dec.md"), "").unwrap();
    fs::write(root.join("journal/archive/archive_old_index.md"), "[[gone]]\n").unwrap();

    engine.handle(VaultEvent::created_folder("journal/archive"));

    assert!(has_line(&root.join("journal/journal_index.md"), "![[archive_index.md]]"));
    assert!(has_line(
        &root.join("journal/archive/archive_index.md"),
        "![[2023_index.md]]"
    ));
    assert!(has_line(&root.join("journal/archive/2023/2023_index.md"), "[[dec]]"));
    assert!(!root.join("journal/archive/archive_old_index.md").exists());
}
