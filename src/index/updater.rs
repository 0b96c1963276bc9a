//! Per-folder index synchronization.

use serde::Serialize;

use super::naming;
use super::store::IndexStore;
use crate::vault::{ChildKind, ChildRef, Folder, Vault};
use crate::Result;

/// What a single folder synchronization changed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FolderSync {
    /// The index document did not exist and was created.
    pub created: bool,
    /// Number of link lines appended.
    pub appended: usize,
}

impl FolderSync {
    /// Whether the document was left untouched.
    #[must_use]
    pub const fn is_noop(&self) -> bool {
        !self.created && self.appended == 0
    }
}

/// Bring `folder`'s index document up to date with its direct children.
///
/// Creates the document if needed, then appends a link for every child that
/// is missing one. Existing lines are never removed or reordered, so calling
/// this twice without an intervening change writes nothing the second time.
///
/// # Errors
///
/// Returns the first listing, read or write failure. Whatever was written
/// before the failure stays in the document.
pub fn sync_folder_index<V: Vault + ?Sized>(
    vault: &V,
    folder: &Folder,
    root: &Folder,
) -> Result<FolderSync> {
    let children = vault.list_children(&folder.path)?;
    sync_with_children(vault, folder, &children, root)
}

/// Same as [`sync_folder_index`] with an already listed set of children.
pub(crate) fn sync_with_children<V: Vault + ?Sized>(
    vault: &V,
    folder: &Folder,
    children: &[ChildRef],
    root: &Folder,
) -> Result<FolderSync> {
    let store = IndexStore::new(vault);
    let index_path = naming::index_path_for(folder, root);

    let created = store.ensure(&index_path)?;
    let appended = store.append_missing(&index_path, expected_links(folder, children))?;

    if appended > 0 || created {
        tracing::debug!(
            folder = %folder.path,
            index = %index_path,
            created,
            appended,
            "Synchronized folder index"
        );
    }

    Ok(FolderSync { created, appended })
}

/// Link lines `folder`'s index should contain, in enumeration order.
pub(crate) fn expected_links(folder: &Folder, children: &[ChildRef]) -> Vec<String> {
    children
        .iter()
        .filter(|child| match child.kind {
            ChildKind::File => !naming::is_self_reference(folder, &child.name),
            ChildKind::Folder => true,
        })
        .map(naming::child_link)
        .collect()
}
