//! Long-running watch loop.
//!
//! Drives the engine from a single task so events are handled in arrival
//! order, interleaved with control commands and the shutdown signal.

use serde::Serialize;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tokio::signal;

use super::control::{execute, ControlCommand, Reply};
use crate::config::Config;
use crate::engine::{CleanReport, Engine};
use crate::error::WatcherError;
use crate::vault::DiskVault;
use crate::watcher::FileWatcher;
use crate::Result;

/// Watches one vault and keeps its index documents in sync.
pub struct App {
    engine: Engine<DiskVault>,
    watcher: FileWatcher,
    incremental: bool,
}

impl App {
    /// Open the vault and start watching it.
    ///
    /// The watcher is attached before the first rebuild so nothing that
    /// happens during startup is missed.
    ///
    /// # Errors
    ///
    /// Returns an error if the vault cannot be opened or watched.
    pub fn new(config: &Config) -> Result<Self> {
        let vault = DiskVault::with_patterns(&config.vault_dir, &config.patterns())?;
        let watcher = FileWatcher::new(
            vault.root_dir(),
            vault.filter().clone(),
            config.event_capacity,
        )?;

        Ok(Self {
            engine: Engine::new(vault),
            watcher,
            incremental: config.incremental,
        })
    }

    /// The engine driven by this app.
    #[must_use]
    pub const fn engine(&self) -> &Engine<DiskVault> {
        &self.engine
    }

    /// Run with control commands read from stdin.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher stops delivering events.
    pub async fn run(self) -> Result<CleanReport> {
        self.run_with(BufReader::new(tokio::io::stdin())).await
    }

    /// Run until `quit`, a shutdown signal, or the watcher closing.
    ///
    /// Every index document is removed on the way out.
    ///
    /// # Errors
    ///
    /// Returns an error if the watcher stops delivering events.
    pub async fn run_with<R>(self, input: R) -> Result<CleanReport>
    where
        R: AsyncBufRead + Unpin,
    {
        let Self {
            engine,
            mut watcher,
            incremental,
        } = self;

        let report = engine.start();
        log_rebuild(&report);
        if incremental {
            engine.enable();
        }

        let mut lines = input.lines();
        let mut input_open = true;
        let shutdown = shutdown_signal();
        tokio::pin!(shutdown);

        let outcome: Result<()> = loop {
            tokio::select! {
                event = watcher.recv() => match event {
                    Some(event) => {
                        engine.handle(event);
                    }
                    None => {
                        tracing::error!("Watcher stopped delivering events");
                        break Err(WatcherError::Channel.into());
                    }
                },
                line = lines.next_line(), if input_open => match line {
                    Ok(Some(line)) if line.trim().is_empty() => {}
                    Ok(Some(line)) => match line.parse::<ControlCommand>() {
                        Ok(command) => {
                            let reply = execute(&engine, command);
                            print_reply(&reply);
                            if reply == Reply::Quit {
                                break Ok(());
                            }
                        }
                        Err(e) => tracing::warn!(error = %e, "Ignoring control input"),
                    },
                    Ok(None) => {
                        tracing::debug!("Control input closed");
                        input_open = false;
                    }
                    Err(e) => {
                        tracing::warn!(error = %e, "Failed to read control input");
                        input_open = false;
                    }
                },
                () = &mut shutdown => break Ok(()),
            }
        };

        let cleaned = engine.teardown();
        tracing::info!(
            deleted = cleaned.deleted,
            failures = cleaned.failures.len(),
            "Index documents removed"
        );
        outcome.map(|()| cleaned)
    }
}

fn log_rebuild(report: &crate::index::RebuildReport) {
    tracing::info!(
        folders = report.folders_visited,
        created = report.documents_created,
        appended = report.links_appended,
        failures = report.failures.len(),
        "Initial rebuild finished"
    );
}

fn print_reply<T: Serialize>(reply: &T) {
    match serde_json::to_string(reply) {
        Ok(json) => println!("{json}"),
        Err(e) => tracing::error!(error = %e, "Failed to encode reply"),
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C).
///
/// A handler that cannot be installed never fires.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}
