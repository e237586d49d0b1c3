//! Serialized model artifact format
//!
//! An artifact is a JSON document bundling the trained trees with the feature
//! schema and encoding table they were trained against.

use cataract_core::{Error, PatientField, Result};
use serde::{Deserialize, Serialize};

use crate::encoding::EncodingTable;
use crate::forest::EnsembleSpec;
use crate::schema::FeatureSchema;
use crate::training::TrainingReport;

/// Artifact format versions this crate can read
pub const SUPPORTED_FORMAT_VERSION: u32 = 1;

/// On-disk representation of a trained classifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,

    pub name: String,

    #[serde(default)]
    pub version: String,

    /// Ordered feature columns the model was trained on
    pub schema: FeatureSchema,

    /// Categorical codes used at training time; the built-in table when absent
    #[serde(default)]
    pub encoding: EncodingTable,

    pub model: EnsembleSpec,

    /// Importance of each schema column, in schema order
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub feature_importances: Option<Vec<f64>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub training: Option<TrainingReport>,
}

impl ModelArtifact {
    /// Parse an artifact from JSON text
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text)
            .map_err(|e| Error::unavailable(format!("artifact is not valid JSON: {}", e)))
    }

    /// Validate everything except the trees, which are checked when the
    /// ensemble is built. Returns the resolved schema fields.
    pub fn validate(&self) -> Result<Vec<PatientField>> {
        if self.format_version != SUPPORTED_FORMAT_VERSION {
            return Err(Error::unavailable(format!(
                "unsupported artifact format version {} (expected {})",
                self.format_version, SUPPORTED_FORMAT_VERSION
            )));
        }

        let fields = self
            .schema
            .resolve()
            .map_err(|e| Error::unavailable(format!("invalid feature schema: {}", e)))?;

        self.encoding
            .validate_for(&self.schema)
            .map_err(|e| Error::unavailable(format!("invalid encoding table: {}", e)))?;

        if let Some(importances) = &self.feature_importances {
            if importances.len() != self.schema.width() {
                return Err(Error::unavailable(format!(
                    "{} feature importances for {} schema columns",
                    importances.len(),
                    self.schema.width()
                )));
            }
            if importances.iter().any(|v| !v.is_finite() || *v < 0.0) {
                return Err(Error::unavailable(
                    "feature importances must be finite and non-negative",
                ));
            }
        }

        Ok(fields)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forest::{DecisionTree, EnsembleKind, TreeNode};

    fn artifact() -> ModelArtifact {
        ModelArtifact {
            format_version: 1,
            name: "stump".to_string(),
            version: "0.1.0".to_string(),
            schema: FeatureSchema::default(),
            encoding: EncodingTable::builtin(),
            model: EnsembleSpec {
                kind: EnsembleKind::DecisionTree,
                n_classes: 2,
                trees: vec![DecisionTree {
                    nodes: vec![TreeNode::Leaf {
                        value: vec![1.0, 1.0],
                    }],
                }],
            },
            feature_importances: None,
            training: None,
        }
    }

    #[test]
    fn test_valid_artifact() {
        let fields = artifact().validate().unwrap();
        assert_eq!(fields.len(), 11);
    }

    #[test]
    fn test_future_format_rejected() {
        let mut a = artifact();
        a.format_version = 2;
        assert!(matches!(a.validate(), Err(Error::ArtifactUnavailable(_))));
    }

    #[test]
    fn test_importance_width_checked() {
        let mut a = artifact();
        a.feature_importances = Some(vec![1.0]);
        assert!(a.validate().is_err());
    }

    #[test]
    fn test_missing_encoding_uses_builtin() {
        let mut value = serde_json::to_value(artifact()).unwrap();
        value.as_object_mut().unwrap().remove("encoding");
        let parsed = ModelArtifact::from_json(&value.to_string()).unwrap();
        assert_eq!(parsed.encoding, EncodingTable::builtin());
    }

    #[test]
    fn test_garbage_is_unavailable() {
        let err = ModelArtifact::from_json("\u{0}\u{1}pickle").unwrap_err();
        assert!(matches!(err, Error::ArtifactUnavailable(_)));
    }
}
