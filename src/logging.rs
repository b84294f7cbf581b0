// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Filter selection, first match wins:
//! 1. `--log-level` sets one level for everything.
//! 2. `PIPELINE_DRIVER_LOG` holds `EnvFilter` directives, so a single stage
//!    can be turned up, e.g. `info,pipeline_driver::driver::resolve=debug`
//!    shows which sibling tasks were fetched and the parent DAG's inputs.
//! 3. `info`.
//!
//! Logs go to STDERR; stdout is left to `--dry-run` output.

use anyhow::{anyhow, Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

/// Environment variable holding filter directives.
pub const LOG_ENV: &str = "PIPELINE_DRIVER_LOG";

const DEFAULT_DIRECTIVES: &str = "info";

/// Initialise the global subscriber from the CLI flag and `PIPELINE_DRIVER_LOG`.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let env = std::env::var(LOG_ENV).ok();
    let filter = build_filter(cli_level, env.as_deref())?;

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow!("failed to initialise logging: {e}"))?;

    Ok(())
}

/// Build the filter for a CLI level and the raw value of [`LOG_ENV`].
///
/// Blank directives count as unset; malformed ones are an error rather than
/// a silent fallback.
pub fn build_filter(cli_level: Option<LogLevel>, env_directives: Option<&str>) -> Result<EnvFilter> {
    if let Some(level) = cli_level {
        return Ok(EnvFilter::new(level_directive(level)));
    }
    match env_directives.map(str::trim).filter(|d| !d.is_empty()) {
        Some(directives) => EnvFilter::try_new(directives)
            .with_context(|| format!("invalid {LOG_ENV} directives {directives:?}")),
        None => Ok(EnvFilter::new(DEFAULT_DIRECTIVES)),
    }
}

fn level_directive(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
