//! Tracing subscriber setup.
//!
//! Logs go to stderr so that stdout only carries the run summary. `RUST_LOG`
//! takes precedence over the configured level.

use clap::ValueEnum;
use serde::Deserialize;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::error::{CliError, CliResult};

/// Crates whose events are shown at the configured level.
const CRATES: &[&str] = &[
    "oktarecon_cli",
    "oktarecon_core",
    "oktarecon_source",
    "oktarecon_connector_okta",
];

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Compact human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Filter directive: dependencies at `warn`, our crates at `level`.
#[must_use]
pub fn filter_directive(level: &str, verbose: bool) -> String {
    let level = if verbose { "debug" } else { level.trim() };
    let mut directive = String::from("warn");
    for krate in CRATES {
        directive.push(',');
        directive.push_str(krate);
        directive.push('=');
        directive.push_str(level);
    }
    directive
}

/// Initialize the global tracing subscriber.
pub fn init_logging(level: &str, verbose: bool, format: LogFormat) -> CliResult<()> {
    let directive = filter_directive(level, verbose);
    let filter_layer = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&directive))
        .map_err(|e| CliError::Config(format!("invalid log level '{level}': {e}")))?;

    let fmt_layer = match format {
        LogFormat::Text => fmt::layer()
            .compact()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        LogFormat::Json => fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .flatten_event(true)
            .with_writer(std::io::stderr)
            .boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter_layer)
        .try_init()
        .map_err(|e| CliError::Config(format!("failed to initialize logging: {e}")))?;

    tracing::debug!(filter = %directive, "Logging initialized");
    Ok(())
}
