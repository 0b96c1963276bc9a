//! Directory-backed vault.

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::filter::VaultFilter;
use super::{path, ChildRef, Vault};
use crate::error::IndexError;
use crate::Result;

/// A vault rooted at a directory on the local file system.
#[derive(Debug, Clone)]
pub struct DiskVault {
    root: PathBuf,
    name: String,
    filter: VaultFilter,
}

impl DiskVault {
    /// Open a vault at `root` using the default filter.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not an existing directory.
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = canonical_dir(root.as_ref())?;
        let filter = VaultFilter::new(&root);
        Ok(Self::from_parts(root, filter))
    }

    /// Open a vault at `root` with extra gitignore-style patterns.
    ///
    /// # Errors
    ///
    /// Returns an error if `root` is not a directory or a pattern is invalid.
    pub fn with_patterns(root: impl AsRef<Path>, patterns: &[&str]) -> Result<Self> {
        let root = canonical_dir(root.as_ref())?;
        let filter = VaultFilter::with_patterns(&root, patterns)?;
        Ok(Self::from_parts(root, filter))
    }

    fn from_parts(root: PathBuf, filter: VaultFilter) -> Self {
        let name = root
            .file_name()
            .map_or_else(|| "vault".to_string(), |n| n.to_string_lossy().into_owned());
        Self { root, name, filter }
    }

    /// Absolute directory of the vault.
    #[must_use]
    pub fn root_dir(&self) -> &Path {
        &self.root
    }

    /// Filter deciding which entries are visible.
    #[must_use]
    pub const fn filter(&self) -> &VaultFilter {
        &self.filter
    }

    /// Absolute path for a vault-relative path.
    #[must_use]
    pub fn absolute(&self, relative: &str) -> PathBuf {
        relative
            .split('/')
            .filter(|segment| !segment.is_empty())
            .fold(self.root.clone(), |acc, segment| acc.join(segment))
    }

    /// Vault-relative path for an absolute path, if it lies inside the vault.
    #[must_use]
    pub fn relative(&self, absolute: &Path) -> Option<String> {
        path::relative_to(&self.root, absolute)
    }

    fn existing_file(&self, relative: &str) -> Result<PathBuf> {
        let abs = self.absolute(relative);
        if abs.is_file() {
            Ok(abs)
        } else {
            Err(IndexError::not_found(relative).into())
        }
    }
}

impl Vault for DiskVault {
    fn root_name(&self) -> String {
        self.name.clone()
    }

    fn is_file(&self, path: &str) -> bool {
        self.absolute(path).is_file()
    }

    fn is_folder(&self, path: &str) -> bool {
        self.absolute(path).is_dir()
    }

    fn read(&self, path: &str) -> Result<String> {
        let abs = self.existing_file(path)?;
        fs::read_to_string(&abs).map_err(|e| io_failure(path, &e))
    }

    fn create(&self, path: &str, text: &str) -> Result<()> {
        let abs = self.absolute(path);
        let mut file = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&abs)
            .map_err(|e| io_failure(path, &e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| io_failure(path, &e))
    }

    fn append(&self, path: &str, text: &str) -> Result<()> {
        let abs = self.existing_file(path)?;
        let mut file = OpenOptions::new()
            .append(true)
            .open(&abs)
            .map_err(|e| io_failure(path, &e))?;
        file.write_all(text.as_bytes())
            .map_err(|e| io_failure(path, &e))
    }

    fn overwrite(&self, path: &str, text: &str) -> Result<()> {
        let abs = self.existing_file(path)?;
        fs::write(&abs, text).map_err(|e| io_failure(path, &e))
    }

    fn delete(&self, path: &str) -> Result<()> {
        let abs = self.existing_file(path)?;
        fs::remove_file(&abs).map_err(|e| io_failure(path, &e))
    }

    fn list_children(&self, folder: &str) -> Result<Vec<ChildRef>> {
        let abs = self.absolute(folder);
        if !abs.is_dir() {
            return Err(IndexError::not_found(folder).into());
        }

        let mut children = Vec::new();
        for entry in fs::read_dir(&abs).map_err(|e| io_failure(folder, &e))? {
            let entry = entry.map_err(|e| io_failure(folder, &e))?;
            let file_type = entry.file_type().map_err(|e| io_failure(folder, &e))?;
            let is_dir = file_type.is_dir();

            if self.filter.is_ignored(&entry.path(), is_dir) {
                continue;
            }

            let name = entry.file_name().to_string_lossy().into_owned();
            if is_dir {
                children.push(ChildRef::folder(name));
            } else if file_type.is_file() {
                children.push(ChildRef::file(name));
            }
        }

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.root)
            .min_depth(1)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| !self.filter.is_ignored(e.path(), e.file_type().is_dir()));

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() => {
                    if let Some(relative) = self.relative(entry.path()) {
                        files.push(relative);
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(error = %e, "Error walking vault");
                }
            }
        }

        Ok(files)
    }
}

fn canonical_dir(root: &Path) -> Result<PathBuf> {
    if !root.is_dir() {
        return Err(crate::Error::config(format!(
            "vault directory '{}' does not exist or is not a directory",
            root.display()
        )));
    }
    Ok(root.canonicalize()?)
}

fn io_failure(path: &str, err: &io::Error) -> crate::Error {
    if err.kind() == io::ErrorKind::NotFound {
        IndexError::not_found(path).into()
    } else {
        IndexError::read_write(path, err).into()
    }
}
