//! Index document paths and link lines.
//!
//! The on-disk contract: a folder `F` owns `F_index.md` directly inside it;
//! the root folder's document sits at the top level. File children appear as
//! `[[stem]]` and subfolders as `![[name_index.md]]`. Names are not escaped.

use crate::vault::{path, ChildKind, ChildRef, Folder};

/// Suffix identifying an index document by name.
pub const INDEX_SUFFIX: &str = "_index.md";

/// Generic index name that is never linked from any folder.
pub const GENERIC_INDEX: &str = "index.md";

/// File name of the index document owned by a folder called `folder_name`.
#[must_use]
pub fn index_name(folder_name: &str) -> String {
    format!("{folder_name}{INDEX_SUFFIX}")
}

/// Vault-relative path of `folder`'s index document.
///
/// The root's document lives at the top level; every other folder's lives
/// inside the folder itself.
#[must_use]
pub fn index_path_for(folder: &Folder, root: &Folder) -> String {
    if folder.path == root.path {
        index_name(&folder.name)
    } else {
        path::join(&folder.path, &index_name(&folder.name))
    }
}

/// Direct link line for a file child.
#[must_use]
pub fn file_link(child_name: &str) -> String {
    format!("[[{}]]", path::file_stem(child_name))
}

/// Embed link line for a subfolder's index document.
#[must_use]
pub fn folder_embed_link(child_folder_name: &str) -> String {
    format!("![[{}]]", index_name(child_folder_name))
}

/// Link line for a child of either kind.
#[must_use]
pub fn link_for(kind: ChildKind, name: &str) -> String {
    match kind {
        ChildKind::File => file_link(name),
        ChildKind::Folder => folder_embed_link(name),
    }
}

/// Link line for a listed child.
#[must_use]
pub fn child_link(child: &ChildRef) -> String {
    link_for(child.kind, &child.name)
}

/// Whether a file name follows the index document naming convention.
#[must_use]
pub fn is_index_document(name: &str) -> bool {
    name.ends_with(INDEX_SUFFIX)
}

/// Whether `name`, as a file inside `folder`, must never be linked from it.
#[must_use]
pub fn is_self_reference(folder: &Folder, name: &str) -> bool {
    name == GENERIC_INDEX || name == index_name(&folder.name)
}
