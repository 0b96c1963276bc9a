//! Structured logging and tracing configuration.
//!
//! Provides setup for observability using the `tracing` crate with:
//! - Structured logging with JSON output option
//! - Configurable log levels (`RUST_LOG` takes precedence)
//! - Spans for rebuilds and handled events

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Tracing configuration options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// Logs go to stderr so stdout stays free for reports.
///
/// # Panics
///
/// Panics if tracing subscriber has already been initialized in this process.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true);

        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!(
        "Tracing initialized: level={}, json={}",
        config.level,
        config.json
    );
}

/// Span helpers.
pub mod spans {
    use tracing::{debug_span, info_span, Span};

    /// Span covering a full rebuild of a vault.
    #[must_use]
    pub fn rebuild_span(vault: &str) -> Span {
        info_span!("rebuild", vault = %vault)
    }

    /// Span covering the handling of one vault event.
    #[must_use]
    pub fn event_span(kind: &str, path: &str) -> Span {
        debug_span!("vault_event", kind = %kind, path = %path)
    }
}
