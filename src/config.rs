//! Depot home configuration
//!
//! The depot home directory holds the configured registries, the sandbox
//! system state and the deployment unit store. Location comes from
//! `--home`, the `DEPOT_HOME` environment variable, or the platform data
//! directory, in that order. A `config.yaml` in the home overrides the
//! defaults.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{DepotError, Result};

/// Where a configured registry stores its content
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistryLocation {
    /// Registry root directory
    pub path: PathBuf,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default_registry: Option<String>,

    #[serde(default)]
    registries: BTreeMap<String, RegistryLocation>,

    #[serde(default)]
    unit_deadline_secs: Option<u64>,
}

/// Resolved depot configuration
#[derive(Debug, Clone)]
pub struct DepotConfig {
    /// Name of the default registry
    pub default_registry: String,

    /// Configured registries by name
    pub registries: BTreeMap<String, RegistryLocation>,

    /// Sandbox system state directory
    pub system_dir: PathBuf,

    /// Deployment unit store directory
    pub units_dir: PathBuf,

    /// Deadline for unit release and import polling
    pub unit_deadline_secs: u64,
}

impl DepotConfig {
    /// Resolve the depot home directory
    pub fn home_dir(cli_home: Option<PathBuf>) -> PathBuf {
        if let Some(home) = cli_home {
            return home;
        }
        if let Ok(home) = std::env::var("DEPOT_HOME") {
            if !home.is_empty() {
                return PathBuf::from(home);
            }
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("depot")
    }

    /// Load configuration from a home directory, applying defaults
    pub fn load(home: &Path) -> Result<Self> {
        let config_path = home.join("config.yaml");
        let file: ConfigFile = if config_path.exists() {
            let content =
                fs::read_to_string(&config_path).map_err(|e| DepotError::ConfigReadFailed {
                    path: config_path.display().to_string(),
                    reason: e.to_string(),
                })?;
            serde_yaml::from_str(&content).map_err(|e| DepotError::ConfigParseFailed {
                path: config_path.display().to_string(),
                reason: e.to_string(),
            })?
        } else {
            ConfigFile::default()
        };

        let mut registries = file.registries;
        let default_registry = file.default_registry.unwrap_or_else(|| "public".to_string());
        registries
            .entry(default_registry.clone())
            .or_insert_with(|| RegistryLocation {
                path: home.join("registry"),
            });

        Ok(Self {
            default_registry,
            registries,
            system_dir: home.join("system"),
            units_dir: home.join("units"),
            unit_deadline_secs: file.unit_deadline_secs.unwrap_or(120),
        })
    }
}
