//! Configuration settings and validation.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::vault::VaultFilter;
use crate::{Error, Result};

/// Upper bound for the watcher event channel.
pub const MAX_EVENT_CAPACITY: usize = 65_536;

/// What the process does once the vault is open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RunMode {
    /// Rebuild, watch the vault and accept control commands until shutdown.
    #[default]
    Watch,
    /// Rebuild every index document once and exit.
    Rebuild,
    /// Delete every index document once and exit.
    Clean,
}

impl FromStr for RunMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "watch" => Ok(Self::Watch),
            "rebuild" => Ok(Self::Rebuild),
            "clean" => Ok(Self::Clean),
            other => Err(Error::config(format!(
                "invalid mode '{other}', must be one of: watch, rebuild, clean"
            ))),
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Watch => "watch",
            Self::Rebuild => "rebuild",
            Self::Clean => "clean",
        };
        f.write_str(name)
    }
}

/// Main configuration for the index engine.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vault directory to index.
    pub vault_dir: PathBuf,

    /// What to do with the vault.
    pub mode: RunMode,

    /// Handle events incrementally from the start.
    pub incremental: bool,

    /// Extra gitignore-style patterns hidden from the engine.
    pub ignore_patterns: Vec<String>,

    /// Capacity of the watcher event channel.
    pub event_capacity: usize,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub log_json: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vault_dir: PathBuf::from("."),
            mode: RunMode::default(),
            incremental: false,
            ignore_patterns: Vec::new(),
            event_capacity: crate::watcher::DEFAULT_EVENT_CAPACITY,
            log_level: "info".to_string(),
            log_json: false,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if !self.vault_dir.is_dir() {
            return Err(Error::config(format!(
                "vault directory '{}' does not exist or is not a directory",
                self.vault_dir.display()
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.event_capacity == 0 {
            return Err(Error::config("event_capacity cannot be 0"));
        }

        if self.event_capacity > MAX_EVENT_CAPACITY {
            return Err(Error::config(format!(
                "event_capacity cannot exceed {MAX_EVENT_CAPACITY}"
            )));
        }

        VaultFilter::with_patterns(&self.vault_dir, &self.patterns())?;

        Ok(())
    }

    /// Ignore patterns as string slices.
    #[must_use]
    pub fn patterns(&self) -> Vec<&str> {
        self.ignore_patterns.iter().map(String::as_str).collect()
    }

    /// Name of the vault's root folder, taken from the directory name.
    #[must_use]
    pub fn vault_name(&self) -> String {
        let dir = self
            .vault_dir
            .canonicalize()
            .unwrap_or_else(|_| self.vault_dir.clone());
        dir.file_name()
            .map_or_else(|| "vault".to_string(), |n| n.to_string_lossy().into_owned())
    }
}
