//! Configuration for maplineage

use eyre::{Context, Result};
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::connector::UnboundPolicy;
use crate::error::LineageError;
use crate::pipeline::{ConnectorJob, InferenceJob};

/// Main configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Connector lineage inputs
    pub connectors: ConnectorsConfig,

    /// Inferred lineage inputs
    pub inference: InferenceConfig,
}

impl Config {
    /// Load configuration with fallback chain
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path).context(format!("Failed to load config from {}", path.display()));
        }

        // Project-local: .maplineage.yml
        let local_config = PathBuf::from(".maplineage.yml");
        if local_config.exists() {
            match Self::load_from_file(&local_config) {
                Ok(config) => return Ok(config),
                Err(e) => warn!("Failed to load config from {}: {}", local_config.display(), e),
            }
        }

        // User: ~/.config/maplineage/maplineage.yml
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("maplineage").join("maplineage.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(config) => return Ok(config),
                    Err(e) => warn!("Failed to load config from {}: {}", user_config.display(), e),
                }
            }
        }

        info!("No config file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).context("Failed to read config file")?;
        let config: Self = serde_yaml::from_str(&content).context("Failed to parse config file")?;
        info!("Loaded config from: {}", path.as_ref().display());
        Ok(config)
    }

    /// Save config to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }
}

/// Connector lineage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectorsConfig {
    /// Mapping export to read
    pub mapping: Option<PathBuf>,

    /// Workbook to write
    pub output: PathBuf,

    /// Policy for connectors that reference an unknown instance
    #[serde(rename = "on-unresolved-instance")]
    pub on_unresolved_instance: UnboundPolicy,
}

impl Default for ConnectorsConfig {
    fn default() -> Self {
        Self {
            mapping: None,
            output: PathBuf::from("connector_lineage.xlsx"),
            on_unresolved_instance: UnboundPolicy::Abort,
        }
    }
}

impl ConnectorsConfig {
    pub fn job(&self) -> std::result::Result<ConnectorJob, LineageError> {
        Ok(ConnectorJob {
            mapping: self.mapping.clone().ok_or(LineageError::MissingInput("mapping file"))?,
            output: self.output.clone(),
            on_unbound: self.on_unresolved_instance,
        })
    }
}

/// Inferred lineage configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceConfig {
    /// Mapping export to read
    pub mapping: Option<PathBuf>,

    /// Repository metadata export
    #[serde(rename = "repo-metadata")]
    pub repo_metadata: Option<PathBuf>,

    /// Workflow session log
    #[serde(rename = "session-log")]
    pub session_log: Option<PathBuf>,

    /// Workbook to write
    pub output: PathBuf,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            mapping: None,
            repo_metadata: None,
            session_log: None,
            output: PathBuf::from("inferred_lineage.xlsx"),
        }
    }
}

impl InferenceConfig {
    pub fn job(&self) -> std::result::Result<InferenceJob, LineageError> {
        Ok(InferenceJob {
            mapping: self.mapping.clone().ok_or(LineageError::MissingInput("mapping file"))?,
            repo_metadata: self.repo_metadata.clone(),
            session_log: self.session_log.clone(),
            output: self.output.clone(),
        })
    }
}
