//! Cataract Screen Classifiers
//!
//! Model loading and inference for the cataract risk classifier.
//!
//! A model artifact bundles three things that must agree with each other:
//! - the trained tree ensemble (random forest or single decision tree)
//! - the ordered feature schema the trees were trained on
//! - the categorical encoding table used at training time
//!
//! [`load`] turns an artifact file into a [`ModelAvailability`] and never
//! fails; [`ModelCache`] keeps one loaded model for the whole process; and
//! [`predict`] runs one `PatientRecord` through encoding, schema validation
//! and classification.

pub mod artifact;
pub mod classifier;
pub mod config;
pub mod encoding;
pub mod forest;
pub mod model_loader;
pub mod pipeline;
pub mod schema;
pub mod training;

pub use artifact::{ModelArtifact, SUPPORTED_FORMAT_VERSION};
pub use classifier::Classifier;
pub use config::{ModelConfig, DEFAULT_ARTIFACT_PATH};
pub use encoding::EncodingTable;
pub use forest::{DecisionTree, EnsembleKind, EnsembleSpec, TreeEnsemble, TreeNode};
pub use model_loader::{load, LoadedModel, ModelAvailability, ModelCache, ModelMetadata};
pub use pipeline::{predict, InferencePipeline};
pub use schema::{FeatureColumn, FeatureSchema};
pub use training::{EvaluationMetrics, TrainingReport};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::classifier::Classifier;
    pub use crate::model_loader::{load, LoadedModel, ModelAvailability, ModelCache};
    pub use crate::pipeline::{predict, InferencePipeline};
}
