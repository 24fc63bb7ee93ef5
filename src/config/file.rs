//! Configuration file management
//!
//! Handles finding, loading, and validating configuration files.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use super::AppConfig;
use crate::chain::SimulatedProfile;
use crate::models::ChainMethod;

/// Configuration file locations (in order of precedence)
const CONFIG_LOCATIONS: &[&str] = &[
    "./chain-bench.yaml",
    "./chain-bench.yml",
    "./.chain-bench.yaml",
    "~/.config/chain-bench/config.yaml",
    "~/.chain-bench.yaml",
];

/// Supported config format versions
const SUPPORTED_VERSIONS: &[&str] = &["1.0"];

/// Largest timer precision accepted
const MAX_PRECISION: usize = 9;

/// Full configuration file structure
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    /// Version of config file format
    #[serde(default = "default_version")]
    pub version: String,

    /// Application settings
    #[serde(default)]
    pub app: AppConfig,

    /// Backends to benchmark, in run order
    #[serde(default)]
    pub backends: Vec<SimulatedProfile>,
}

fn default_version() -> String {
    "1.0".to_string()
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self {
            version: default_version(),
            app: AppConfig::default(),
            backends: Vec::new(),
        }
    }
}

impl ConfigFile {
    /// Create a new config file with defaults
    pub fn new() -> Self {
        Self::default()
    }

    /// Find configuration file in standard locations
    pub fn find() -> Option<PathBuf> {
        CONFIG_LOCATIONS
            .iter()
            .map(|location| expand_path(location))
            .find(|path| path.exists())
    }

    /// Load configuration from default location
    pub fn load_default() -> Result<Self> {
        if let Some(path) = Self::find() {
            Self::load(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load from an explicit path, or the default location when None
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::load_default(),
        }
    }

    /// Load configuration from file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = if is_yaml_file(path) {
            serde_yaml::from_str(&content)
                .with_context(|| format!("Failed to parse YAML config: {}", path.display()))?
        } else {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path.display()))?
        };

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let content = if is_yaml_file(path) {
            serde_yaml::to_string(self).context("Failed to serialize config")?
        } else {
            serde_json::to_string_pretty(self).context("Failed to serialize config")?
        };

        // Create parent directory if needed
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_VERSIONS.contains(&self.version.as_str()) {
            bail!("Unsupported config version: {}", self.version);
        }

        if self.app.num_runs == 0 {
            bail!("app.num_runs must be at least 1");
        }
        if self.app.precision > MAX_PRECISION {
            bail!(
                "app.precision {} out of range. Valid range: 0-{}",
                self.app.precision,
                MAX_PRECISION
            );
        }

        let mut seen = HashSet::new();
        for backend in &self.backends {
            let name = backend.name.trim();
            if name.is_empty() {
                bail!("Backend name must not be empty");
            }
            if !seen.insert(name.to_lowercase()) {
                bail!("Duplicate backend name: {}", name);
            }
            if !(0.0..=1.0).contains(&backend.failure_rate) {
                bail!(
                    "Invalid failure_rate {} for backend '{}'. Valid range: 0.0-1.0",
                    backend.failure_rate,
                    name
                );
            }
        }

        Ok(())
    }

    /// Generate example configuration
    pub fn example() -> Self {
        Self {
            version: default_version(),
            app: AppConfig {
                num_runs: 5,
                ..AppConfig::default()
            },
            backends: vec![
                SimulatedProfile::op(),
                SimulatedProfile::base(),
                SimulatedProfile::new("Lisk")
                    .with_chain_id("1135")
                    .with_latency(40, 25)
                    .with_tokens(12)
                    .with_pools(15)
                    .with_failure_rate(0.05)
                    .failing(ChainMethod::GetQuote),
            ],
        }
    }

    /// Get backend profile by name
    pub fn backend(&self, name: &str) -> Option<&SimulatedProfile> {
        self.backends
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }
}

/// Expand ~ to home directory
fn expand_path(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    PathBuf::from(path)
}

/// Check if file is YAML based on extension
fn is_yaml_file(path: &Path) -> bool {
    path.extension()
        .map(|e| e == "yaml" || e == "yml")
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_file_default() {
        let config = ConfigFile::default();
        assert_eq!(config.version, "1.0");
        assert!(config.backends.is_empty());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_example() {
        let config = ConfigFile::example();
        assert_eq!(config.backends.len(), 3);
        assert!(config.backend("lisk").is_some());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_file_save_load() {
        let dir = tempdir().unwrap();

        for name in ["config.yaml", "config.json"] {
            let path = dir.path().join(name);
            let config = ConfigFile::example();
            config.save(&path).unwrap();

            let loaded = ConfigFile::load(&path).unwrap();
            assert_eq!(loaded, config);
        }
    }

    #[test]
    fn test_minimal_yaml() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("chain-bench.yaml");
        std::fs::write(
            &path,
            "app:\n  num_runs: 2\nbackends:\n  - name: OP\n    fail_methods: [get_quote]\n",
        )
        .unwrap();

        let config = ConfigFile::load(&path).unwrap();
        assert_eq!(config.app.num_runs, 2);
        assert_eq!(config.app.precision, 4);
        assert_eq!(config.backends[0].fail_methods, vec![ChainMethod::GetQuote]);
        assert_eq!(config.backends[0].base_latency_ms, 20);
    }

    #[test]
    fn test_unknown_method_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.yaml");
        std::fs::write(&path, "backends:\n  - name: OP\n    fail_methods: [get_everything]\n")
            .unwrap();
        assert!(ConfigFile::load(&path).is_err());
    }

    #[test]
    fn test_validate_config() {
        let mut config = ConfigFile::default();
        config.version = "2.0".to_string();
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.app.num_runs = 0;
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.app.precision = 12;
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.backends = vec![SimulatedProfile::new("OP"), SimulatedProfile::new("op")];
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.backends = vec![SimulatedProfile::new("  ")];
        assert!(config.validate().is_err());

        let mut config = ConfigFile::default();
        config.backends = vec![SimulatedProfile::new("OP").with_failure_rate(1.5)];
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_expand_path() {
        let path = expand_path("./test.yaml");
        assert_eq!(path, PathBuf::from("./test.yaml"));
    }
}
