//! Line-based control commands.

use std::str::FromStr;

use serde::Serialize;

use crate::engine::{CleanReport, Engine, EngineStatsSnapshot, Toggled};
use crate::index::RebuildReport;
use crate::vault::Vault;
use crate::Error;

/// A command read from the control input, one per line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    Toggle,
    Enable,
    Disable,
    Rebuild,
    Status,
    Quit,
}

impl FromStr for ControlCommand {
    type Err = Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "toggle" => Ok(Self::Toggle),
            "enable" => Ok(Self::Enable),
            "disable" => Ok(Self::Disable),
            "rebuild" => Ok(Self::Rebuild),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            other => Err(Error::config(format!(
                "unknown command '{other}', expected one of: toggle, enable, disable, rebuild, status, quit"
            ))),
        }
    }
}

/// Engine state reported by `status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Status {
    pub vault: String,
    pub enabled: bool,
    pub rebuilding: bool,
    pub stats: EngineStatsSnapshot,
}

/// What a command did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reply", rename_all = "snake_case")]
pub enum Reply {
    Rebuilt {
        enabled: bool,
        report: RebuildReport,
    },
    Cleaned {
        enabled: bool,
        report: CleanReport,
    },
    Status(Status),
    Quit,
}

/// Apply `command` to `engine`.
pub fn execute<V: Vault>(engine: &Engine<V>, command: ControlCommand) -> Reply {
    tracing::info!(?command, "Control command");
    match command {
        ControlCommand::Toggle => match engine.toggle() {
            Toggled::Enabled(report) => Reply::Rebuilt {
                enabled: true,
                report,
            },
            Toggled::Disabled(report) => Reply::Cleaned {
                enabled: false,
                report,
            },
        },
        ControlCommand::Enable => Reply::Rebuilt {
            report: engine.enable(),
            enabled: true,
        },
        ControlCommand::Disable => Reply::Cleaned {
            report: engine.disable(),
            enabled: false,
        },
        ControlCommand::Rebuild => Reply::Rebuilt {
            report: engine.rebuild(),
            enabled: engine.is_enabled(),
        },
        ControlCommand::Status => Reply::Status(Status {
            vault: engine.root().name.clone(),
            enabled: engine.is_enabled(),
            rebuilding: engine.is_rebuilding(),
            stats: engine.stats_snapshot(),
        }),
        ControlCommand::Quit => Reply::Quit,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vault::MemoryVault;

    fn engine() -> Engine<MemoryVault> {
        Engine::new(
            MemoryVault::new("Vault")
                .with_file("inbox.md", "")
                .with_file("a/one.md", ""),
        )
    }

    #[test]
    fn test_parse_commands() {
        assert_eq!("toggle".parse::<ControlCommand>().unwrap(), ControlCommand::Toggle);
        assert_eq!("  Enable \n".parse::<ControlCommand>().unwrap(), ControlCommand::Enable);
        assert_eq!("DISABLE".parse::<ControlCommand>().unwrap(), ControlCommand::Disable);
        assert_eq!("rebuild".parse::<ControlCommand>().unwrap(), ControlCommand::Rebuild);
        assert_eq!("status".parse::<ControlCommand>().unwrap(), ControlCommand::Status);
        assert_eq!("quit".parse::<ControlCommand>().unwrap(), ControlCommand::Quit);
        assert_eq!("exit".parse::<ControlCommand>().unwrap(), ControlCommand::Quit);
    }

    #[test]
    fn test_parse_unknown_command() {
        let err = "launch".parse::<ControlCommand>().unwrap_err();
        assert!(err.to_string().contains("unknown command 'launch'"));
    }

    #[test]
    fn test_toggle_round_trip() {
        let engine = engine();

        let reply = execute(&engine, ControlCommand::Toggle);
        assert!(matches!(reply, Reply::Rebuilt { enabled: true, .. }));
        assert!(engine.is_enabled());
        assert!(engine.vault().is_file("Vault_index.md"));

        let reply = execute(&engine, ControlCommand::Toggle);
        match reply {
            Reply::Cleaned { enabled, report } => {
                assert!(!enabled);
                assert_eq!(report.deleted, 2);
            }
            other => panic!("unexpected reply: {other:?}"),
        }
        assert!(!engine.is_enabled());
        assert!(!engine.vault().is_file("Vault_index.md"));
    }

    #[test]
    fn test_rebuild_keeps_enabled_flag() {
        let engine = engine();
        let reply = execute(&engine, ControlCommand::Rebuild);
        assert!(matches!(reply, Reply::Rebuilt { enabled: false, .. }));
        assert!(!engine.is_enabled());
        assert!(engine.vault().is_file("a/a_index.md"));
    }

    #[test]
    fn test_status_reply_serializes() {
        let engine = engine();
        execute(&engine, ControlCommand::Enable);

        let reply = execute(&engine, ControlCommand::Status);
        let json = serde_json::to_value(&reply).unwrap();
        assert_eq!(json["reply"], "status");
        assert_eq!(json["vault"], "Vault");
        assert_eq!(json["enabled"], true);
        assert_eq!(json["stats"]["rebuilds"], 1);
    }
}
