//! Host file-system abstraction.
//!
//! This module provides:
//! - The `Vault` trait the index engine talks to
//! - A directory-backed implementation (`DiskVault`)
//! - An in-process implementation for tests and benchmarks (`MemoryVault`)
//! - Hidden/ignored entry filtering shared with the watcher

mod disk;
mod filter;
mod memory;
pub mod path;

pub use disk::DiskVault;
pub use filter::VaultFilter;
pub use memory::MemoryVault;

use serde::Serialize;

use crate::Result;

/// Kind of a directory entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChildKind {
    File,
    Folder,
}

/// A direct child of a folder as returned by [`Vault::list_children`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildRef {
    pub name: String,
    pub kind: ChildKind,
}

impl ChildRef {
    /// Create a file child.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ChildKind::File,
        }
    }

    /// Create a folder child.
    pub fn folder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ChildKind::Folder,
        }
    }
}

/// A folder identified by its vault-relative path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Folder {
    /// Vault-relative path; empty for the root.
    pub path: String,
    /// Last path segment, or the vault name for the root.
    pub name: String,
}

impl Folder {
    /// The root folder of a vault named `vault_name`.
    pub fn root(vault_name: impl Into<String>) -> Self {
        Self {
            path: path::ROOT.to_string(),
            name: vault_name.into(),
        }
    }

    /// Build a folder from its path. The root takes the vault's name.
    #[must_use]
    pub fn at(folder_path: &str, vault_name: &str) -> Self {
        if folder_path.is_empty() {
            Self::root(vault_name)
        } else {
            Self {
                path: folder_path.to_string(),
                name: path::file_name(folder_path).to_string(),
            }
        }
    }

    /// Whether this is the vault root.
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.path.is_empty()
    }

    /// Path of a direct child of this folder.
    #[must_use]
    pub fn child_path(&self, name: &str) -> String {
        path::join(&self.path, name)
    }
}

/// Operations the index engine needs from the host file system.
///
/// All paths are vault-relative (see [`path`]). Implementations take `&self`
/// and use interior mutability where they need it.
pub trait Vault {
    /// Name of the root folder.
    fn root_name(&self) -> String;

    /// Whether a file exists at `path`.
    fn is_file(&self, path: &str) -> bool;

    /// Whether a folder exists at `path`. The root always exists.
    fn is_folder(&self, path: &str) -> bool;

    /// Read a file's full text.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the file is missing, `ReadWrite` otherwise.
    fn read(&self, path: &str) -> Result<String>;

    /// Create a new file with the given text.
    ///
    /// # Errors
    ///
    /// `ReadWrite` if the file already exists or cannot be written.
    fn create(&self, path: &str, text: &str) -> Result<()>;

    /// Append text to an existing file.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the file is missing, `ReadWrite` otherwise.
    fn append(&self, path: &str, text: &str) -> Result<()>;

    /// Replace a file's text.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the file is missing, `ReadWrite` otherwise.
    fn overwrite(&self, path: &str, text: &str) -> Result<()>;

    /// Delete a file.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the file is missing, `ReadWrite` otherwise.
    fn delete(&self, path: &str) -> Result<()>;

    /// Direct children of a folder, ordered by name.
    ///
    /// # Errors
    ///
    /// `DocumentNotFound` if the folder is missing, `ReadWrite` otherwise.
    fn list_children(&self, folder: &str) -> Result<Vec<ChildRef>>;

    /// Every file in the vault, at any depth.
    ///
    /// # Errors
    ///
    /// `ReadWrite` if the tree cannot be scanned.
    fn list_files(&self) -> Result<Vec<String>>;
}
