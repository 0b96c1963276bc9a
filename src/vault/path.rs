//! Vault-relative path helpers.
//!
//! Paths inside a vault are `/`-separated and relative to the vault root.
//! The root folder itself is the empty string.

use std::path::Path;

/// Path of the vault root folder.
pub const ROOT: &str = "";

/// Segment separator.
pub const SEPARATOR: &str = "/";

/// Parent folder of `path`, or `None` when `path` is the root.
///
/// Top-level entries have the root (`""`) as parent.
#[must_use]
pub fn parent_of(path: &str) -> Option<&str> {
    if path.is_empty() {
        return None;
    }
    Some(path.rfind('/').map_or(ROOT, |idx| &path[..idx]))
}

/// Last segment of `path`.
#[must_use]
pub fn file_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// Join a child name onto a folder path.
#[must_use]
pub fn join(folder: &str, name: &str) -> String {
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{folder}/{name}")
    }
}

/// Name without its extension.
///
/// Dotfiles such as `.env` keep their full name.
#[must_use]
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(idx) if idx > 0 => &name[..idx],
        _ => name,
    }
}

/// Whether `path` lies inside `folder` (at any depth).
#[must_use]
pub fn is_within(path: &str, folder: &str) -> bool {
    folder.is_empty()
        || path
            .strip_prefix(folder)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Convert an absolute path under `root` into a vault-relative path.
#[must_use]
pub fn relative_to(root: &Path, absolute: &Path) -> Option<String> {
    let relative = absolute.strip_prefix(root).ok()?;
    let segments: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(segments.join(SEPARATOR))
}
