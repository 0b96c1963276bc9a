//! In-process vault for tests and benchmarks.

use std::collections::BTreeMap;

use parking_lot::Mutex;

use super::{path, ChildRef, Vault};
use crate::error::IndexError;
use crate::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Entry {
    File(String),
    Folder,
}

#[derive(Debug, Default)]
struct State {
    entries: BTreeMap<String, Entry>,
    writes: u64,
    fail_prefix: Option<String>,
}

impl State {
    fn is_folder(&self, folder: &str) -> bool {
        folder.is_empty() || self.entries.get(folder) == Some(&Entry::Folder)
    }

    fn ensure_folders(&mut self, file_path: &str) {
        let mut current = path::parent_of(file_path);
        while let Some(folder) = current {
            if folder.is_empty() {
                break;
            }
            self.entries
                .entry(folder.to_string())
                .or_insert(Entry::Folder);
            current = path::parent_of(folder);
        }
    }

    fn check_writable(&self, target: &str) -> Result<()> {
        match &self.fail_prefix {
            Some(prefix) if target == prefix || path::is_within(target, prefix) => {
                Err(IndexError::read_write(target, "injected write failure").into())
            }
            _ => Ok(()),
        }
    }

    fn file_mut(&mut self, target: &str) -> Result<&mut String> {
        match self.entries.get_mut(target) {
            Some(Entry::File(body)) => Ok(body),
            _ => Err(IndexError::not_found(target).into()),
        }
    }
}

/// A vault kept entirely in memory.
///
/// Mutations made through the [`Vault`] trait are counted so callers can
/// assert that an operation wrote nothing. Setup helpers (`with_file`,
/// `add_file`, `remove`, `rename`) stand in for the user and are not counted.
#[derive(Debug)]
pub struct MemoryVault {
    name: String,
    state: Mutex<State>,
}

impl MemoryVault {
    /// Create an empty vault whose root folder is called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            state: Mutex::new(State::default()),
        }
    }

    /// Builder form of [`MemoryVault::add_folder`].
    #[must_use]
    pub fn with_folder(self, folder: &str) -> Self {
        self.add_folder(folder);
        self
    }

    /// Builder form of [`MemoryVault::add_file`].
    #[must_use]
    pub fn with_file(self, file: &str, text: &str) -> Self {
        self.add_file(file, text);
        self
    }

    /// Add a folder (and any missing ancestors).
    pub fn add_folder(&self, folder: &str) {
        if folder.is_empty() {
            return;
        }
        let mut state = self.state.lock();
        state.ensure_folders(folder);
        state.entries.insert(folder.to_string(), Entry::Folder);
    }

    /// Add or replace a file (creating any missing ancestor folders).
    pub fn add_file(&self, file: &str, text: &str) {
        let mut state = self.state.lock();
        state.ensure_folders(file);
        state
            .entries
            .insert(file.to_string(), Entry::File(text.to_string()));
    }

    /// Remove an entry and, for folders, everything below it.
    pub fn remove(&self, target: &str) {
        let mut state = self.state.lock();
        state.entries.remove(target);
        state.entries.retain(|key, _| !path::is_within(key, target));
    }

    /// Move an entry (and its subtree) to a new path.
    pub fn rename(&self, from: &str, to: &str) {
        let mut state = self.state.lock();
        let moved: Vec<(String, Entry)> = state
            .entries
            .iter()
            .filter(|(key, _)| key.as_str() == from || path::is_within(key, from))
            .map(|(key, entry)| (key.clone(), entry.clone()))
            .collect();

        for (key, _) in &moved {
            state.entries.remove(key);
        }
        state.ensure_folders(to);
        for (key, entry) in moved {
            let new_key = format!("{to}{}", &key[from.len()..]);
            state.entries.insert(new_key, entry);
        }
    }

    /// Current text of a file, if it exists.
    #[must_use]
    pub fn body(&self, file: &str) -> Option<String> {
        match self.state.lock().entries.get(file) {
            Some(Entry::File(body)) => Some(body.clone()),
            _ => None,
        }
    }

    /// Number of create/append/overwrite/delete calls that succeeded.
    #[must_use]
    pub fn write_count(&self) -> u64 {
        self.state.lock().writes
    }

    /// Make every write at or below `prefix` fail with a read/write error.
    pub fn fail_writes_under(&self, prefix: &str) {
        self.state.lock().fail_prefix = Some(prefix.to_string());
    }

    /// Stop injecting write failures.
    pub fn clear_failures(&self) {
        self.state.lock().fail_prefix = None;
    }
}

impl Vault for MemoryVault {
    fn root_name(&self) -> String {
        self.name.clone()
    }

    fn is_file(&self, target: &str) -> bool {
        matches!(self.state.lock().entries.get(target), Some(Entry::File(_)))
    }

    fn is_folder(&self, target: &str) -> bool {
        self.state.lock().is_folder(target)
    }

    fn read(&self, target: &str) -> Result<String> {
        self.body(target)
            .ok_or_else(|| IndexError::not_found(target).into())
    }

    fn create(&self, target: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_writable(target)?;

        let parent = path::parent_of(target).unwrap_or(path::ROOT);
        if !state.is_folder(parent) {
            return Err(IndexError::not_found(parent).into());
        }
        if state.entries.contains_key(target) {
            return Err(IndexError::read_write(target, "already exists").into());
        }

        state
            .entries
            .insert(target.to_string(), Entry::File(text.to_string()));
        state.writes += 1;
        Ok(())
    }

    fn append(&self, target: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_writable(target)?;
        state.file_mut(target)?.push_str(text);
        state.writes += 1;
        Ok(())
    }

    fn overwrite(&self, target: &str, text: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_writable(target)?;
        *state.file_mut(target)? = text.to_string();
        state.writes += 1;
        Ok(())
    }

    fn delete(&self, target: &str) -> Result<()> {
        let mut state = self.state.lock();
        state.check_writable(target)?;
        state.file_mut(target)?;
        state.entries.remove(target);
        state.writes += 1;
        Ok(())
    }

    fn list_children(&self, folder: &str) -> Result<Vec<ChildRef>> {
        let state = self.state.lock();
        if !state.is_folder(folder) {
            return Err(IndexError::not_found(folder).into());
        }

        let mut children: Vec<ChildRef> = state
            .entries
            .iter()
            .filter(|(key, _)| path::parent_of(key) == Some(folder))
            .map(|(key, entry)| {
                let name = path::file_name(key);
                match entry {
                    Entry::File(_) => ChildRef::file(name),
                    Entry::Folder => ChildRef::folder(name),
                }
            })
            .collect();

        children.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(children)
    }

    fn list_files(&self) -> Result<Vec<String>> {
        Ok(self
            .state
            .lock()
            .entries
            .iter()
            .filter(|(_, entry)| matches!(entry, Entry::File(_)))
            .map(|(key, _)| key.clone())
            .collect())
    }
}
