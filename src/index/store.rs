//! Index document store.
//!
//! Thin adapter over a [`Vault`] that reads and patches index documents one
//! line at a time.

use crate::vault::Vault;
use crate::Result;

/// Line-oriented access to index documents.
pub struct IndexStore<'a, V: Vault + ?Sized> {
    vault: &'a V,
}

impl<'a, V: Vault + ?Sized> IndexStore<'a, V> {
    /// Wrap a vault.
    pub const fn new(vault: &'a V) -> Self {
        Self { vault }
    }

    /// Whether a document exists at `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.vault.is_file(path)
    }

    /// Create an empty document if none exists. Returns `true` if created.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be created.
    pub fn ensure(&self, path: &str) -> Result<bool> {
        if self.exists(path) {
            return Ok(false);
        }
        self.vault.create(path, "")?;
        tracing::debug!(path, "Created index document");
        Ok(true)
    }

    /// Current body split into lines.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read.
    pub fn lines(&self, path: &str) -> Result<Vec<String>> {
        Ok(self.vault.read(path)?.lines().map(str::to_string).collect())
    }

    /// Append `line` unless the body already contains it. Returns `true` if
    /// something was written.
    ///
    /// A newline is written first when the body ends mid-line, so the link
    /// never fuses with manual text.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or appended to.
    pub fn append_line_if_absent(&self, path: &str, line: &str) -> Result<bool> {
        Ok(self.append_missing(path, std::iter::once(line.to_string()))? > 0)
    }

    /// Append every line of `lines` missing from the body, one append per
    /// line, in order. Returns how many were written.
    ///
    /// The body is read once; lines repeated inside `lines` are written once.
    ///
    /// # Errors
    ///
    /// Returns the first read or append failure. Lines appended before the
    /// failure stay in place.
    pub fn append_missing<I>(&self, path: &str, lines: I) -> Result<usize>
    where
        I: IntoIterator<Item = String>,
    {
        let body = self.vault.read(path)?;
        let mut present: Vec<String> = body.lines().map(str::to_string).collect();
        let mut ends_mid_line = !body.is_empty() && !body.ends_with('\n');
        let mut appended = 0;

        for line in lines {
            if present.contains(&line) {
                continue;
            }
            let text = if ends_mid_line {
                format!("\n{line}\n")
            } else {
                format!("{line}\n")
            };
            self.vault.append(path, &text)?;
            ends_mid_line = false;
            present.push(line);
            appended += 1;
        }

        Ok(appended)
    }

    /// Remove every line equal to `line`, keeping all other lines in order.
    /// Returns how many lines were removed; nothing is written when none match.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be read or rewritten.
    pub fn remove_line(&self, path: &str, line: &str) -> Result<usize> {
        let body = self.vault.read(path)?;
        let segments: Vec<&str> = body.split('\n').collect();
        let kept: Vec<&str> = segments
            .iter()
            .copied()
            .filter(|segment| segment.trim_end_matches('\r') != line)
            .collect();

        let removed = segments.len() - kept.len();
        if removed > 0 {
            self.vault.overwrite(path, &kept.join("\n"))?;
        }
        Ok(removed)
    }

    /// Delete a document.
    ///
    /// # Errors
    ///
    /// Returns an error if the document cannot be deleted.
    pub fn delete(&self, path: &str) -> Result<()> {
        self.vault.delete(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    const DOC: &str = "a/a_index.md";

    fn vault_with_doc(body: &str) -> MemoryVault {
        MemoryVault::new("Vault").with_file(DOC, body)
    }

    #[test]
    fn test_ensure_creates_once() {
        let vault = MemoryVault::new("Vault").with_folder("a");
        let store = IndexStore::new(&vault);

        assert!(store.ensure(DOC).unwrap());
        assert!(!store.ensure(DOC).unwrap());
        assert_eq!(vault.body(DOC).as_deref(), Some(""));
        assert_eq!(vault.write_count(), 1);
    }

    #[test]
    fn test_append_line_if_absent() {
        let vault = vault_with_doc("");
        let store = IndexStore::new(&vault);

        assert!(store.append_line_if_absent(DOC, "[[x]]").unwrap());
        assert!(!store.append_line_if_absent(DOC, "[[x]]").unwrap());
        assert_eq!(vault.body(DOC).as_deref(), Some("[[x]]\n"));
        assert_eq!(vault.write_count(), 1);
    }

    #[test]
    fn test_append_after_manual_text_without_newline() {
        let vault = vault_with_doc("# My notes");
        let store = IndexStore::new(&vault);

        store.append_line_if_absent(DOC, "[[x]]").unwrap();
        assert_eq!(vault.body(DOC).as_deref(), Some("# My notes\n[[x]]\n"));
        assert_eq!(store.lines(DOC).unwrap(), vec!["# My notes", "[[x]]"]);
    }

    #[test]
    fn test_append_missing_preserves_order_and_dedups() {
        let vault = vault_with_doc("[[b]]\n");
        let store = IndexStore::new(&vault);

        let lines = ["[[a]]", "[[b]]", "[[c]]", "[[a]]"].map(String::from);
        assert_eq!(store.append_missing(DOC, lines).unwrap(), 2);
        assert_eq!(vault.body(DOC).as_deref(), Some("[[b]]\n[[a]]\n[[c]]\n"));
        // one append per new line
        assert_eq!(vault.write_count(), 2);
    }

    #[test]
    fn test_remove_line_keeps_others_in_order() {
        let vault = vault_with_doc("intro\n[[x]]\n[[y]]\n[[x]]\n![[s_index.md]]\n");
        let store = IndexStore::new(&vault);

        assert_eq!(store.remove_line(DOC, "[[x]]").unwrap(), 2);
        assert_eq!(
            vault.body(DOC).as_deref(),
            Some("intro\n[[y]]\n![[s_index.md]]\n")
        );
    }

    #[test]
    fn test_remove_line_missing_writes_nothing() {
        let vault = vault_with_doc("[[y]]\n");
        let store = IndexStore::new(&vault);

        assert_eq!(store.remove_line(DOC, "[[x]]").unwrap(), 0);
        assert_eq!(vault.write_count(), 0);
    }

    #[test]
    fn test_remove_line_handles_crlf() {
        let vault = vault_with_doc("[[x]]\r\n[[y]]\r\n");
        let store = IndexStore::new(&vault);

        assert_eq!(store.remove_line(DOC, "[[x]]").unwrap(), 1);
        assert_eq!(vault.body(DOC).as_deref(), Some("[[y]]\r\n"));
    }

    #[test]
    fn test_missing_document_errors() {
        let vault = MemoryVault::new("Vault");
        let store = IndexStore::new(&vault);

        assert!(store.lines(DOC).is_err());
        assert!(store.append_line_if_absent(DOC, "[[x]]").is_err());
        assert!(store.remove_line(DOC, "[[x]]").is_err());
        assert!(store.delete(DOC).is_err());
    }
}
