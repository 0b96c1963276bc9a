//! Process-level driver for the engine.
//!
//! This module provides:
//! - The watch loop with graceful shutdown
//! - Control commands read line by line

mod app;
mod control;

pub use app::App;
pub use control::{execute, ControlCommand, Reply, Status};
