//! vaultindex - folder index documents for notes vaults
//!
//! Entry point for the index daemon and its one-shot modes.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use clap::Parser;
use serde::Serialize;
use vaultindex::config::RunMode;
use vaultindex::daemon::App;
use vaultindex::observability::{init_tracing, TracingConfig};
use vaultindex::vault::DiskVault;
use vaultindex::{Config, Engine, Result};

/// vaultindex - folder index documents for notes vaults
#[derive(Parser, Debug)]
#[command(name = "vaultindex")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Vault directory to index
    #[arg(short, long, env = "VAULTINDEX_VAULT", default_value = ".")]
    vault: std::path::PathBuf,

    /// What to do: watch, rebuild or clean
    #[arg(short, long, env = "VAULTINDEX_MODE", default_value = "watch")]
    mode: RunMode,

    /// Handle file events incrementally from the start
    #[arg(short, long, env = "VAULTINDEX_INCREMENTAL")]
    incremental: bool,

    /// Extra gitignore-style patterns to hide from the index
    #[arg(long, env = "VAULTINDEX_IGNORE", value_delimiter = ',')]
    ignore: Vec<String>,

    /// Capacity of the file event channel
    #[arg(long, env = "VAULTINDEX_EVENT_CAPACITY", default_value = "1024")]
    event_capacity: usize,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "VAULTINDEX_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "VAULTINDEX_LOG_JSON")]
    log_json: bool,

    /// Print the rebuild or clean report as JSON on stdout
    #[arg(long, env = "VAULTINDEX_PRINT_REPORT")]
    print_report: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(&TracingConfig {
        level: cli.log_level.clone(),
        json: cli.log_json,
    });

    tracing::info!("vaultindex v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = Config {
        vault_dir: cli.vault,
        mode: cli.mode,
        incremental: cli.incremental,
        ignore_patterns: cli.ignore,
        event_capacity: cli.event_capacity,
        log_level: cli.log_level,
        log_json: cli.log_json,
    };

    tracing::debug!(?config, "Configuration loaded");

    config.validate()?;

    tracing::info!(
        vault = %config.vault_name(),
        mode = %config.mode,
        "Vault at {:?}",
        config.vault_dir
    );

    match config.mode {
        RunMode::Watch => {
            let report = App::new(&config)?.run().await?;
            if cli.print_report {
                print_json(&report)?;
            }
        }
        RunMode::Rebuild => {
            let engine = open_engine(&config)?;
            let report = engine.rebuild();
            if cli.print_report {
                print_json(&report)?;
            }
        }
        RunMode::Clean => {
            let engine = open_engine(&config)?;
            let report = engine.delete_all_indexes();
            if cli.print_report {
                print_json(&report)?;
            }
        }
    }

    Ok(())
}

fn open_engine(config: &Config) -> Result<Engine<DiskVault>> {
    let vault = DiskVault::with_patterns(&config.vault_dir, &config.patterns())?;
    Ok(Engine::new(vault))
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| vaultindex::Error::internal(format!("failed to encode report: {e}")))?;
    println!("{json}");
    Ok(())
}
