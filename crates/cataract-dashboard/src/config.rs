//! Dashboard configuration

use cataract_classifiers::ModelConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use crate::cli::ServeArgs;

/// Default location of the preview dataset
pub const DEFAULT_DATASET_PATH: &str = "data/cataract_sample.csv";

/// Default binary outcome column of the dataset
pub const DEFAULT_OUTCOME_COLUMN: &str = "cataract";

/// Dashboard configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub model: ModelConfig,

    #[serde(default)]
    pub dataset: DatasetConfig,
}

/// Listen address
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_address")]
    pub address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

/// Preview dataset location
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    #[serde(default = "default_dataset_path")]
    pub path: PathBuf,

    /// Binary outcome column used to split histograms
    #[serde(default = "default_outcome_column")]
    pub outcome_column: String,
}

impl DashboardConfig {
    /// Load configuration from file and CLI overrides
    pub fn load(config_path: &Path, args: &ServeArgs) -> anyhow::Result<Self> {
        let mut config = Self::from_file(config_path)?;

        if let Some(address) = &args.address {
            config.server.address = address.clone();
        }
        if let Some(port) = args.port {
            config.server.port = port;
        }
        if let Some(model) = &args.model {
            config.model.path = model.clone();
        }
        if args.preload {
            config.model.preload = true;
        }
        if let Some(dataset) = &args.dataset {
            config.dataset.path = dataset.clone();
        }
        if let Some(column) = &args.outcome_column {
            config.dataset.outcome_column = column.clone();
        }

        Ok(config)
    }

    /// Read a YAML file, or use defaults when it does not exist
    pub fn from_file(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config = serde_yaml::from_str(&content)
                .map_err(|e| anyhow::anyhow!("Invalid config {}: {}", path.display(), e))?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        Ok(format!("{}:{}", self.server.address, self.server.port).parse()?)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: default_address(),
            port: default_port(),
        }
    }
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: default_dataset_path(),
            outcome_column: default_outcome_column(),
        }
    }
}

fn default_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8501
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from(DEFAULT_DATASET_PATH)
}

fn default_outcome_column() -> String {
    DEFAULT_OUTCOME_COLUMN.to_string()
}
