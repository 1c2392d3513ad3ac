//! CLI configuration management

use crate::error::CliError;
use blockpar_primitives::Address;
use blockpar_scheduler::{AnalysisConfig, ConflictPolicy, DEFAULT_LANE_COUNTS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// CLI configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Lane counts simulated per block
    #[serde(default = "default_lanes")]
    pub lanes: Vec<usize>,
    /// Treat contracts with written storage as written addresses
    #[serde(default)]
    pub storage_root_conflicts: bool,
    /// Addresses excluded from conflict detection
    #[serde(default)]
    pub ignored_addresses: Vec<Address>,
    /// Block files analyzed concurrently by `folder`
    #[serde(default = "default_jobs")]
    pub jobs: usize,
}

fn default_lanes() -> Vec<usize> {
    DEFAULT_LANE_COUNTS.to_vec()
}

fn default_jobs() -> usize {
    4
}

impl Default for Config {
    fn default() -> Self {
        Self {
            lanes: default_lanes(),
            storage_root_conflicts: false,
            ignored_addresses: Vec::new(),
            jobs: default_jobs(),
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> Option<PathBuf> {
        dirs::home_dir().map(|h| h.join(".blockpar"))
    }

    /// Get the default config file path
    pub fn config_path() -> Option<PathBuf> {
        Self::config_dir().map(|d| d.join("config.toml"))
    }

    /// Load config from `path`, or from the default location.
    ///
    /// A missing default file yields the defaults. A missing explicit
    /// `path` is an error, as is an unreadable or malformed file.
    pub fn load(path: Option<&Path>) -> Result<Self, CliError> {
        match path {
            Some(path) if !path.exists() => Err(CliError::Config(format!(
                "{}: no such config file",
                path.display()
            ))),
            Some(path) => Self::read(path),
            None => Self::load_or_default(None),
        }
    }

    /// Load config like [`Config::load`], but fall back to the defaults when
    /// the file does not exist yet, explicit or not
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, CliError> {
        match path.map(Path::to_path_buf).or_else(Self::config_path) {
            Some(path) if path.exists() => Self::read(&path),
            _ => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self, CliError> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| CliError::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Save config to `path`, or to the default location
    pub fn save(&self, path: Option<&Path>) -> Result<PathBuf, CliError> {
        let path = path
            .map(Path::to_path_buf)
            .or_else(Self::config_path)
            .ok_or_else(|| CliError::Config("Cannot determine config path".to_string()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| CliError::Config(e.to_string()))?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Reject values no run could use
    pub fn validate(&self) -> Result<(), CliError> {
        if self.lanes.is_empty() || self.lanes.contains(&0) {
            return Err(CliError::Config(
                "lanes must list at least one positive lane count".to_string(),
            ));
        }
        if self.jobs == 0 {
            return Err(CliError::Config("jobs must be positive".to_string()));
        }
        Ok(())
    }

    /// Analysis settings derived from this config
    pub fn analysis(&self, include_timeline: bool) -> AnalysisConfig {
        let policy = self
            .ignored_addresses
            .iter()
            .fold(
                ConflictPolicy::new().with_storage_root_conflicts(self.storage_root_conflicts),
                |policy, address| policy.ignore_address(*address),
            );

        AnalysisConfig {
            lane_counts: self.lanes.clone(),
            policy,
            include_timeline,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.lanes, vec![2, 4, 8, 16]);
        assert!(!config.storage_root_conflicts);
        assert!(config.ignored_addresses.is_empty());
        assert_eq!(config.jobs, 4);
    }

    #[test]
    fn test_config_deserialize_partial() {
        let toml = r#"
            lanes = [1, 3]
            ignored_addresses = ["0x0000000000000000000000000000000000001000"]
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.lanes, vec![1, 3]);
        assert_eq!(config.jobs, 4);
        assert_eq!(config.ignored_addresses.len(), 1);

        let analysis = config.analysis(false);
        assert_eq!(analysis.lane_counts, vec![1, 3]);
        assert!(analysis.policy.ignored_addresses.contains(&config.ignored_addresses[0]));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            lanes: vec![3],
            storage_root_conflicts: true,
            ignored_addresses: Vec::new(),
            jobs: 2,
        };

        config.save(Some(&path)).unwrap();
        assert_eq!(Config::load(Some(&path)).unwrap(), config);
    }

    #[test]
    fn test_missing_explicit_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let absent = dir.path().join("absent.toml");

        match Config::load(Some(&absent)) {
            Err(CliError::Config(msg)) => assert!(msg.contains("absent.toml")),
            other => panic!("expected config error, got {other:?}"),
        }
        assert_eq!(Config::load_or_default(Some(&absent)).unwrap(), Config::default());
    }

    #[test]
    fn test_invalid_values_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "lanes = [0]").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));

        std::fs::write(&path, "lanes = \"many\"").unwrap();
        assert!(matches!(Config::load(Some(&path)), Err(CliError::Config(_))));
    }
}
