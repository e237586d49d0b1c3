//! Classifier trait and common types

use cataract_core::{FeatureVector, Label, ProbabilityVector, Result};

/// Trait for all classifiers
///
/// Implementations are read-only after construction and evaluate exactly one
/// feature vector per call.
pub trait Classifier: Send + Sync {
    /// Predict the label for an encoded feature vector
    fn classify(&self, features: &FeatureVector) -> Result<Label>;

    /// Predict per-class probabilities for an encoded feature vector
    fn classify_probabilities(&self, features: &FeatureVector) -> Result<ProbabilityVector>;

    /// Get the classifier name
    fn name(&self) -> &str;

    /// Number of features the classifier expects
    fn n_features(&self) -> usize;
}
