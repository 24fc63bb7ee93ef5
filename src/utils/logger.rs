//! Logging setup
//!
//! Installs a compact tracing subscriber scoped to this crate's events.

use anyhow::{Context, Result};
use std::fmt;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Target every filter directive is scoped to
const CRATE_TARGET: &str = "chain_bench";

/// Verbosity of diagnostic output
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Trace => "trace",
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }

    /// `--verbose` wins over `CHAIN_BENCH_LOG`; unknown names fall back to info
    pub fn resolve(verbose: bool, requested: Option<&str>) -> Self {
        if verbose {
            return LogLevel::Debug;
        }
        requested
            .and_then(|name| name.parse().ok())
            .unwrap_or_default()
    }

    fn directive(self) -> String {
        format!("{CRATE_TARGET}={}", self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(format!("Unknown log level: {other}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Install the global subscriber; fails when one is already installed
pub fn init_logger(level: LogLevel) -> Result<()> {
    let filter = EnvFilter::builder()
        .parse(level.directive())
        .context("Invalid log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to install logger: {e}"))
}
