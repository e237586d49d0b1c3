//! Configuration for model loading

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::model_loader::ModelCache;

/// Well-known artifact location, relative to the working directory
pub const DEFAULT_ARTIFACT_PATH: &str = "models/cataract_model.json";

/// Where to find the model artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the JSON artifact
    #[serde(default = "default_artifact_path")]
    pub path: PathBuf,

    /// Load at startup instead of on first prediction
    #[serde(default)]
    pub preload: bool,
}

impl ModelConfig {
    /// Create a configuration for a local artifact
    pub fn from_local(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ..Default::default()
        }
    }

    /// Enable loading at startup
    pub fn with_preload(mut self, preload: bool) -> Self {
        self.preload = preload;
        self
    }

    /// Build the cache for this artifact
    pub fn cache(&self) -> ModelCache {
        ModelCache::new(self.path.clone())
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_artifact_path(),
            preload: false,
        }
    }
}

fn default_artifact_path() -> PathBuf {
    PathBuf::from(DEFAULT_ARTIFACT_PATH)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_config_local() {
        let config = ModelConfig::from_local("/srv/models/forest.json").with_preload(true);
        assert_eq!(config.path, PathBuf::from("/srv/models/forest.json"));
        assert!(config.preload);
        assert_eq!(config.cache().path(), config.path.as_path());
    }

    #[test]
    fn test_parse_model_config() {
        let yaml = "path: ./artifacts/model.json\n";
        let config: ModelConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.path, PathBuf::from("./artifacts/model.json"));
        assert!(!config.preload);

        let config: ModelConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config.path, PathBuf::from(DEFAULT_ARTIFACT_PATH));
    }
}
