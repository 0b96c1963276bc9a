//! vaultindex
//!
//! Keeps a folder-index document in every folder of a notes vault, linking
//! the folder's files and embedding its subfolders' index documents.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod daemon;
pub mod engine;
pub mod error;
pub mod index;
pub mod observability;
pub mod vault;
pub mod watcher;

pub use config::Config;
pub use engine::{Engine, VaultEvent};
pub use error::{Error, Result};
