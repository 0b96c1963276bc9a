//! Configuration management for vaultindex.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables (`VAULTINDEX_*`)
//! - Built-in defaults (lowest priority)

mod settings;

pub use settings::{Config, RunMode};
