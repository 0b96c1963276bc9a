//! Vault change events.

#![allow(clippy::missing_const_for_fn)]

use crate::vault::{path, ChildKind};

/// A change in the vault, with vault-relative paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VaultEvent {
    /// A file or folder appeared.
    Create { path: String, kind: ChildKind },
    /// A file or folder disappeared.
    Delete { path: String, kind: ChildKind },
    /// A file or folder moved from `old_path` to `path`.
    Rename {
        path: String,
        old_path: String,
        kind: ChildKind,
    },
    /// Events were lost; the whole vault must be resynchronized.
    Rescan,
}

impl VaultEvent {
    /// Create event for a file.
    pub fn created_file(path: impl Into<String>) -> Self {
        Self::Create {
            path: path.into(),
            kind: ChildKind::File,
        }
    }

    /// Create event for a folder.
    pub fn created_folder(path: impl Into<String>) -> Self {
        Self::Create {
            path: path.into(),
            kind: ChildKind::Folder,
        }
    }

    /// Delete event for a file.
    pub fn deleted_file(path: impl Into<String>) -> Self {
        Self::Delete {
            path: path.into(),
            kind: ChildKind::File,
        }
    }

    /// Delete event for a folder.
    pub fn deleted_folder(path: impl Into<String>) -> Self {
        Self::Delete {
            path: path.into(),
            kind: ChildKind::Folder,
        }
    }

    /// Rename event.
    pub fn renamed(old_path: impl Into<String>, path: impl Into<String>, kind: ChildKind) -> Self {
        Self::Rename {
            path: path.into(),
            old_path: old_path.into(),
            kind,
        }
    }

    /// Current path of the affected entry.
    #[must_use]
    pub fn path(&self) -> &str {
        match self {
            Self::Create { path, .. } | Self::Delete { path, .. } | Self::Rename { path, .. } => {
                path
            }
            Self::Rescan => path::ROOT,
        }
    }

    /// Kind of the affected entry.
    #[must_use]
    pub fn kind(&self) -> ChildKind {
        match self {
            Self::Create { kind, .. } | Self::Delete { kind, .. } | Self::Rename { kind, .. } => {
                *kind
            }
            Self::Rescan => ChildKind::Folder,
        }
    }

    /// Name of the affected entry.
    #[must_use]
    pub fn name(&self) -> &str {
        path::file_name(self.path())
    }

    /// Short label for logs.
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::Create { .. } => "create",
            Self::Delete { .. } => "delete",
            Self::Rename { .. } => "rename",
            Self::Rescan => "rescan",
        }
    }
}
