// Configuration for DungeonDelvers Ops
//
// This module handles the operator-side configuration: where the sibling
// projects live, which RPC endpoint and deployment version to use, and the
// reveal watcher settings. Paths are injected here (config file or env
// overrides), never hardcoded at call sites.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Roots of the collaborating projects the sync pipeline writes into
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectPaths {
    /// Frontend web app root
    pub frontend: PathBuf,

    /// Metadata backend root
    pub backend: PathBuf,

    /// Subgraph project root
    pub subgraph: PathBuf,

    /// Contracts repo root (artifact source)
    pub contracts: PathBuf,
}

impl Default for ProjectPaths {
    fn default() -> Self {
        Self {
            frontend: PathBuf::from("../dungeon-delvers-frontend"),
            backend: PathBuf::from("../dungeon-delvers-backend"),
            subgraph: PathBuf::from("../dungeon-delvers-subgraph"),
            contracts: PathBuf::from("../dungeon-delvers-contracts"),
        }
    }
}

/// Settings for the commit-reveal watcher service
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RevealSettings {
    /// Seconds between polling ticks
    pub interval_secs: u64,

    /// How close to the deadline a commitment must be before we act
    pub lead_secs: u64,

    /// Cap on commitment ids scanned per tick
    pub max_scan: u64,
}

impl Default for RevealSettings {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            lead_secs: 120,
            max_scan: 50,
        }
    }
}

/// Top-level configuration for all dungeon-ops binaries
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OpsConfig {
    /// Active deployment version (selects the wiring edge table)
    pub version: String,

    /// RPC endpoint override; falls back to BSC_RPC_URL, then the public node
    pub rpc_url: Option<String>,

    /// Sibling project roots
    pub paths: ProjectPaths,

    /// Reveal watcher settings
    pub reveal: RevealSettings,
}

impl Default for OpsConfig {
    fn default() -> Self {
        Self {
            version: "v1.3".to_string(),
            rpc_url: None,
            paths: ProjectPaths::default(),
            reveal: RevealSettings::default(),
        }
    }
}

impl OpsConfig {
    /// Load configuration from a file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.as_ref().display()))?;
        let config = serde_json::from_str(&raw)
            .with_context(|| format!("invalid config {}", path.as_ref().display()))?;
        Ok(config)
    }

    /// Save configuration to a file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let mut raw = serde_json::to_string_pretty(self)?;
        raw.push('\n');
        fs::write(&path, raw)
            .with_context(|| format!("failed to write config {}", path.as_ref().display()))?;
        Ok(())
    }

    /// Load from an optional file path, then apply environment overrides.
    ///
    /// This is what the binaries call: a missing config file means defaults,
    /// and `DD_*_DIR` / `BSC_RPC_URL` always win over the file.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply `DD_FRONTEND_DIR`, `DD_BACKEND_DIR`, `DD_SUBGRAPH_DIR`,
    /// `DD_CONTRACTS_DIR` and `BSC_RPC_URL` when set
    pub fn apply_env_overrides(&mut self) {
        if let Ok(dir) = env::var("DD_FRONTEND_DIR") {
            self.paths.frontend = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("DD_BACKEND_DIR") {
            self.paths.backend = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("DD_SUBGRAPH_DIR") {
            self.paths.subgraph = PathBuf::from(dir);
        }
        if let Ok(dir) = env::var("DD_CONTRACTS_DIR") {
            self.paths.contracts = PathBuf::from(dir);
        }
        if let Ok(url) = env::var("BSC_RPC_URL") {
            self.rpc_url = Some(url);
        }
    }

    /// Create a builder for configuration
    pub fn builder() -> OpsConfigBuilder {
        OpsConfigBuilder::default()
    }
}

/// Builder for creating configurations
#[derive(Default)]
pub struct OpsConfigBuilder {
    config: OpsConfig,
}

impl OpsConfigBuilder {
    /// Set the deployment version
    pub fn version(mut self, version: &str) -> Self {
        self.config.version = version.to_string();
        self
    }

    /// Set the RPC endpoint
    pub fn rpc_url(mut self, url: &str) -> Self {
        self.config.rpc_url = Some(url.to_string());
        self
    }

    /// Set the sibling project roots
    pub fn paths(mut self, paths: ProjectPaths) -> Self {
        self.config.paths = paths;
        self
    }

    /// Set the reveal watcher settings
    pub fn reveal(mut self, reveal: RevealSettings) -> Self {
        self.config.reveal = reveal;
        self
    }

    /// Build the configuration
    pub fn build(self) -> OpsConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_config_builder() {
        let config = OpsConfig::builder()
            .version("v1.2")
            .rpc_url("http://localhost:8545")
            .build();

        assert_eq!(config.version, "v1.2");
        assert_eq!(config.rpc_url.as_deref(), Some("http://localhost:8545"));
        assert_eq!(config.paths, ProjectPaths::default());
    }

    #[test]
    fn test_config_save_load() -> Result<()> {
        let dir = tempdir()?;
        let file_path = dir.path().join("dungeon-ops.json");

        let config = OpsConfig::builder().version("v1.2").build();
        config.save_to_file(&file_path)?;
        let loaded = OpsConfig::load_from_file(&file_path)?;

        assert_eq!(loaded, config);
        Ok(())
    }
}
