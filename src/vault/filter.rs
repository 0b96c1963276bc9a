//! Entry filtering with gitignore support.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};

use crate::Result;

/// Decides which entries of a vault directory the engine may see.
///
/// Hidden entries (leading `.`, e.g. `.git`, `.obsidian`, `.trash`) are always
/// excluded. A `.gitignore` at the vault root and any extra patterns are
/// applied on top.
#[derive(Debug, Clone)]
pub struct VaultFilter {
    gitignore: Option<Gitignore>,
    base_path: PathBuf,
}

impl VaultFilter {
    /// Create a new filter.
    ///
    /// If a `.gitignore` exists in `base_path`, it will be used for filtering.
    pub fn new(base_path: impl AsRef<Path>) -> Self {
        let base_path = base_path.as_ref().to_path_buf();
        let gitignore_path = base_path.join(".gitignore");

        let gitignore = if gitignore_path.exists() {
            let mut builder = GitignoreBuilder::new(&base_path);
            if builder.add(&gitignore_path).is_none() {
                builder.build().ok()
            } else {
                None
            }
        } else {
            None
        };

        Self {
            gitignore,
            base_path,
        }
    }

    /// Create a filter with additional ignore patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if patterns are invalid.
    pub fn with_patterns(base_path: impl AsRef<Path>, patterns: &[&str]) -> Result<Self> {
        let base_path = base_path.as_ref().to_path_buf();
        let mut builder = GitignoreBuilder::new(&base_path);

        let gitignore_path = base_path.join(".gitignore");
        if gitignore_path.exists() {
            if let Some(e) = builder.add(&gitignore_path) {
                tracing::warn!(error = %e, "Ignoring unreadable .gitignore");
            }
        }

        for pattern in patterns {
            builder
                .add_line(None, pattern)
                .map_err(|e| crate::Error::config(format!("invalid pattern: {e}")))?;
        }

        let gitignore = builder
            .build()
            .map_err(|e| crate::Error::config(format!("failed to build gitignore: {e}")))?;

        Ok(Self {
            gitignore: Some(gitignore),
            base_path,
        })
    }

    /// Root directory this filter applies to.
    #[must_use]
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    /// Check if an absolute path should be invisible to the engine.
    ///
    /// Paths outside the base directory are always ignored.
    #[must_use]
    pub fn is_ignored(&self, path: &Path, is_dir: bool) -> bool {
        let Ok(relative) = path.strip_prefix(&self.base_path) else {
            return true;
        };

        if relative.as_os_str().is_empty() {
            return false;
        }

        if Self::is_hidden(relative) {
            return true;
        }

        self.gitignore.as_ref().is_some_and(|gi| {
            gi.matched_path_or_any_parents(relative, is_dir)
                .is_ignore()
        })
    }

    /// Whether any component of the path is a dotfile or dot-directory.
    fn is_hidden(relative: &Path) -> bool {
        relative.components().any(|component| {
            if let std::path::Component::Normal(name) = component {
                name.to_string_lossy().starts_with('.')
            } else {
                false
            }
        })
    }
}
