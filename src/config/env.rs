//! Environment variable configuration
//!
//! Provides environment variable overrides for configuration.

use std::env;
use std::path::PathBuf;

/// Environment variable prefix
const ENV_PREFIX: &str = "CHAIN_BENCH";

/// Environment configuration from environment variables
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EnvConfig {
    /// Repetitions from CHAIN_BENCH_RUNS
    pub runs: Option<u32>,
    /// Comma-separated backend names from CHAIN_BENCH_BACKENDS
    pub backends: Option<Vec<String>>,
    /// Config file from CHAIN_BENCH_CONFIG
    pub config_file: Option<PathBuf>,
    /// Export path from CHAIN_BENCH_OUTPUT
    pub output: Option<PathBuf>,
    /// Log level from CHAIN_BENCH_LOG
    pub log: Option<String>,
}

impl EnvConfig {
    /// Load configuration from environment variables
    pub fn load() -> Self {
        Self {
            runs: get_env_parse("RUNS"),
            backends: get_env("BACKENDS").map(|v| split_list(&v)).filter(|v| !v.is_empty()),
            config_file: get_env("CONFIG").map(PathBuf::from),
            output: get_env("OUTPUT").map(PathBuf::from),
            log: get_env("LOG"),
        }
    }

    /// Check if any environment variables are set
    pub fn has_any(&self) -> bool {
        self.runs.is_some()
            || self.backends.is_some()
            || self.config_file.is_some()
            || self.output.is_some()
            || self.log.is_some()
    }

    /// Get runs with fallback
    pub fn runs_or(&self, default: u32) -> u32 {
        self.runs.unwrap_or(default)
    }

    /// Print current environment configuration
    pub fn print_summary(&self) {
        println!("Environment Configuration:");
        println!("  {}_RUNS:      {:?}", ENV_PREFIX, self.runs);
        println!("  {}_BACKENDS:  {:?}", ENV_PREFIX, self.backends);
        println!("  {}_CONFIG:    {:?}", ENV_PREFIX, self.config_file);
        println!("  {}_OUTPUT:    {:?}", ENV_PREFIX, self.output);
        println!("  {}_LOG:       {:?}", ENV_PREFIX, self.log);
    }
}

/// Get environment variable with prefix
fn get_env(name: &str) -> Option<String> {
    env::var(format!("{ENV_PREFIX}_{name}"))
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Get environment variable and parse to type
fn get_env_parse<T: std::str::FromStr>(name: &str) -> Option<T> {
    get_env(name).and_then(|v| v.trim().parse().ok())
}

/// Split a comma-separated list, dropping blanks
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
/// Builder for setting environment variables in tests
pub struct EnvBuilder {
    vars: Vec<(String, String)>,
}

#[cfg(test)]
impl EnvBuilder {
    /// Create a new environment builder
    pub fn new() -> Self {
        Self { vars: Vec::new() }
    }

    /// Set runs
    pub fn runs(mut self, runs: u32) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_RUNS"), runs.to_string()));
        self
    }

    /// Set backends
    pub fn backends(mut self, backends: &[&str]) -> Self {
        self.vars
            .push((format!("{ENV_PREFIX}_BACKENDS"), backends.join(",")));
        self
    }

    /// Set config file
    pub fn config_file(mut self, path: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_CONFIG"), path.into()));
        self
    }

    /// Set export path
    pub fn output(mut self, path: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_OUTPUT"), path.into()));
        self
    }

    /// Set log level
    pub fn log(mut self, level: impl Into<String>) -> Self {
        self.vars.push((format!("{ENV_PREFIX}_LOG"), level.into()));
        self
    }

    /// Apply environment variables
    pub fn apply(self) {
        for (key, value) in self.vars {
            env::set_var(key, value);
        }
    }

    /// Apply and return guard that restores on drop
    pub fn apply_scoped(self) -> EnvGuard {
        let previous: Vec<_> = self
            .vars
            .iter()
            .map(|(k, _)| (k.clone(), env::var(k).ok()))
            .collect();

        self.apply();

        EnvGuard { previous }
    }
}

#[cfg(test)]
impl Default for EnvBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
/// Guard that restores environment variables on drop
pub struct EnvGuard {
    previous: Vec<(String, Option<String>)>,
}

#[cfg(test)]
impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (key, value) in &self.previous {
            match value {
                Some(v) => env::set_var(key, v),
                None => env::remove_var(key),
            }
        }
    }
}

/// Print all CHAIN_BENCH environment variables
pub fn print_env_help() {
    println!("Environment Variables:");
    println!();
    println!("  {ENV_PREFIX}_RUNS       Repetitions per backend and mode");
    println!("  {ENV_PREFIX}_BACKENDS   Comma-separated backend names (OP,Base)");
    println!("  {ENV_PREFIX}_CONFIG     Path to configuration file");
    println!("  {ENV_PREFIX}_OUTPUT     Path of the JSON export");
    println!("  {ENV_PREFIX}_LOG        Log level (trace, debug, info, warn, error)");
    println!();
    println!("Example:");
    println!("  export {ENV_PREFIX}_RUNS=5");
    println!("  export {ENV_PREFIX}_BACKENDS=OP,Base");
    println!("  chain-bench run");
}
