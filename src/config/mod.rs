//! Configuration module
//!
//! Handles loading and managing configuration.

#![allow(dead_code)]

mod env;
mod file;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::chain::{BackendRegistry, SimulatedProfile};
use crate::utils::timer::DEFAULT_PRECISION;

pub use env::{print_env_help, EnvConfig};
pub use file::ConfigFile;

/// Application configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Repetitions per backend and execution mode
    #[serde(default = "default_num_runs")]
    pub num_runs: u32,

    /// Decimal digits in timer messages
    #[serde(default = "default_precision")]
    pub precision: usize,

    /// Directory for generated export files
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,

    /// Write the JSON export after a run
    #[serde(default = "default_export")]
    pub export: bool,
}

fn default_num_runs() -> u32 {
    3
}

fn default_precision() -> usize {
    DEFAULT_PRECISION
}

fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_export() -> bool {
    true
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            num_runs: default_num_runs(),
            precision: default_precision(),
            export_dir: default_export_dir(),
            export: default_export(),
        }
    }
}

/// Command-line values that take precedence over env and file settings
#[derive(Clone, Debug, Default)]
pub struct RunOverrides {
    pub num_runs: Option<u32>,
    pub backends: Vec<String>,
    pub output: Option<PathBuf>,
    pub no_export: bool,
}

/// Effective settings of one benchmark run
#[derive(Clone, Debug, PartialEq)]
pub struct RunSettings {
    pub num_runs: u32,
    pub precision: usize,
    /// Backend names to run; empty selects every configured backend
    pub backends: Vec<String>,
    /// Explicit export path
    pub output: Option<PathBuf>,
    pub export_dir: PathBuf,
    pub export: bool,
}

impl RunSettings {
    /// Merge sources: command line over environment over file
    pub fn resolve(cli: &RunOverrides, env: &EnvConfig, file: &ConfigFile) -> Self {
        let backends = if !cli.backends.is_empty() {
            cli.backends.clone()
        } else {
            env.backends.clone().unwrap_or_default()
        };

        Self {
            num_runs: cli.num_runs.or(env.runs).unwrap_or(file.app.num_runs),
            precision: file.app.precision,
            backends,
            output: cli.output.clone().or_else(|| env.output.clone()),
            export_dir: file.app.export_dir.clone(),
            export: file.app.export && !cli.no_export,
        }
    }
}

/// Built-in backends used when the config file declares none
pub fn default_profiles() -> Vec<SimulatedProfile> {
    vec![SimulatedProfile::op(), SimulatedProfile::base()]
}

/// Registry of the backends declared in `file`
pub fn registry_from(file: &ConfigFile) -> BackendRegistry {
    if file.backends.is_empty() {
        BackendRegistry::from_profiles(&default_profiles())
    } else {
        BackendRegistry::from_profiles(&file.backends)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.num_runs, 3);
        assert_eq!(config.precision, 4);
        assert_eq!(config.export_dir, PathBuf::from("."));
        assert!(config.export);
    }

    #[test]
    fn test_partial_app_config() {
        let config: AppConfig = serde_yaml::from_str("num_runs: 10").unwrap();
        assert_eq!(config.num_runs, 10);
        assert_eq!(config.precision, 4);
    }

    #[test]
    fn test_precedence() {
        let mut file = ConfigFile::default();
        file.app.num_runs = 5;

        let env = EnvConfig {
            runs: Some(7),
            backends: Some(vec!["Base".to_string()]),
            ..Default::default()
        };

        let settings = RunSettings::resolve(&RunOverrides::default(), &EnvConfig::default(), &file);
        assert_eq!(settings.num_runs, 5);
        assert!(settings.backends.is_empty());

        let settings = RunSettings::resolve(&RunOverrides::default(), &env, &file);
        assert_eq!(settings.num_runs, 7);
        assert_eq!(settings.backends, vec!["Base"]);

        let cli = RunOverrides {
            num_runs: Some(1),
            backends: vec!["OP".to_string()],
            no_export: true,
            ..Default::default()
        };
        let settings = RunSettings::resolve(&cli, &env, &file);
        assert_eq!(settings.num_runs, 1);
        assert_eq!(settings.backends, vec!["OP"]);
        assert!(!settings.export);
    }

    #[test]
    fn test_registry_falls_back_to_builtin() {
        let registry = registry_from(&ConfigFile::default());
        assert_eq!(registry.names(), vec!["OP", "Base"]);

        let mut file = ConfigFile::default();
        file.backends.push(SimulatedProfile::new("Lisk"));
        assert_eq!(registry_from(&file).names(), vec!["Lisk"]);
    }
}
