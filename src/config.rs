//! TOML configuration for schema administration.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::schema::{ExecutionOptions, IndexMetadata, IndexStatus, SchemaManagementStrategy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub cluster: ClusterConfig,
    #[serde(default)]
    pub lifecycle: LifecycleConfig,
    #[serde(default)]
    pub indexes: Vec<IndexConfig>,
    /// Directory of the configuration file; schema paths resolve against it
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ClusterConfig {
    pub es_url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LifecycleConfig {
    #[serde(default)]
    pub strategy: SchemaManagementStrategy,
    #[serde(default = "default_required_status")]
    pub required_status: IndexStatus,
    #[serde(default = "default_required_status_timeout_ms")]
    pub required_status_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct IndexConfig {
    pub name: String,
    /// JSON file holding `{"mappings": {...}, "settings": {...}}`
    pub schema: PathBuf,
}

fn default_required_status() -> IndexStatus {
    IndexStatus::Yellow
}

fn default_required_status_timeout_ms() -> u64 {
    10_000
}

impl Default for LifecycleConfig {
    fn default() -> Self {
        Self {
            strategy: SchemaManagementStrategy::default(),
            required_status: default_required_status(),
            required_status_timeout_ms: default_required_status_timeout_ms(),
        }
    }
}

impl LifecycleConfig {
    pub fn execution_options(&self) -> ExecutionOptions {
        ExecutionOptions::new(self.required_status, self.required_status_timeout_ms)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let mut config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        config.base_dir = path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        Ok(config)
    }

    /// Load the expected metadata of every configured index
    pub fn load_expected_metadata(&self) -> Result<Vec<IndexMetadata>> {
        self.indexes
            .iter()
            .map(|index| {
                let path = self.base_dir.join(&index.schema);
                let json = fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read schema file {}", path.display()))?;
                IndexMetadata::from_schema_json(&index.name, &json).with_context(|| {
                    format!("Failed to parse schema file {}", path.display())
                })
            })
            .collect()
    }
}
