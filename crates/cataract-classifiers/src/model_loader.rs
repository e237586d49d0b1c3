//! Model loading and the process-wide model cache

use cataract_core::{Error, FeatureVector, Label, PatientField, ProbabilityVector, Result};
use parking_lot::RwLock;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::artifact::ModelArtifact;
use crate::classifier::Classifier;
use crate::encoding::EncodingTable;
use crate::forest::{EnsembleKind, TreeEnsemble};
use crate::pipeline::InferencePipeline;
use crate::schema::FeatureSchema;
use crate::training::TrainingReport;

/// Descriptive information about a loaded model
#[derive(Debug, Clone, Serialize)]
pub struct ModelMetadata {
    /// Model name/identifier
    pub name: String,

    /// Model version
    pub version: String,

    /// Ensemble type
    pub kind: EnsembleKind,

    pub n_trees: usize,

    pub max_depth: usize,

    /// Number of input features
    pub n_features: usize,

    /// Path the artifact was read from
    pub source: PathBuf,
}

/// A validated, read-only classifier with its schema and encoding table
#[derive(Debug)]
pub struct LoadedModel {
    metadata: ModelMetadata,
    schema: FeatureSchema,
    fields: Vec<PatientField>,
    encoding: EncodingTable,
    ensemble: TreeEnsemble,
    feature_importances: Option<Vec<f64>>,
    training: Option<TrainingReport>,
}

impl LoadedModel {
    /// Build a model from a parsed artifact
    pub fn from_artifact(artifact: ModelArtifact, source: impl Into<PathBuf>) -> Result<Self> {
        let fields = artifact.validate()?;
        let ensemble = TreeEnsemble::from_spec(
            artifact.name.clone(),
            artifact.model,
            artifact.schema.width(),
        )?;

        let metadata = ModelMetadata {
            name: artifact.name,
            version: artifact.version,
            kind: ensemble.kind(),
            n_trees: ensemble.n_trees(),
            max_depth: ensemble.max_depth(),
            n_features: artifact.schema.width(),
            source: source.into(),
        };

        Ok(Self {
            metadata,
            schema: artifact.schema,
            fields,
            encoding: artifact.encoding,
            ensemble,
            feature_importances: artifact.feature_importances,
            training: artifact.training,
        })
    }

    /// Read and validate an artifact file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::unavailable(format!(
                "model file not found: {}",
                path.display()
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::unavailable(format!("failed to read {}: {}", path.display(), e))
        })?;

        let artifact = ModelArtifact::from_json(&text)?;
        Self::from_artifact(artifact, path)
    }

    /// Get model metadata
    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    /// Schema columns resolved to patient fields, in column order
    pub fn fields(&self) -> &[PatientField] {
        &self.fields
    }

    pub fn encoding(&self) -> &EncodingTable {
        &self.encoding
    }

    pub fn training(&self) -> Option<&TrainingReport> {
        self.training.as_ref()
    }

    /// Feature importances paired with column names, most important first
    pub fn ranked_importances(&self) -> Option<Vec<(String, f64)>> {
        let importances = self.feature_importances.as_ref()?;
        let mut ranked: Vec<(String, f64)> = self
            .schema
            .columns
            .iter()
            .zip(importances)
            .map(|(column, importance)| (column.name.clone(), *importance))
            .collect();
        ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
        Some(ranked)
    }

    /// Inference pipeline bound to this model's schema and encoding
    pub fn pipeline(&self) -> InferencePipeline<'_> {
        InferencePipeline::bound(&self.schema, &self.fields, &self.encoding)
    }
}

impl Classifier for LoadedModel {
    fn classify(&self, features: &FeatureVector) -> Result<Label> {
        self.ensemble.classify(features)
    }

    fn classify_probabilities(&self, features: &FeatureVector) -> Result<ProbabilityVector> {
        self.ensemble.classify_probabilities(features)
    }

    fn name(&self) -> &str {
        &self.metadata.name
    }

    fn n_features(&self) -> usize {
        self.metadata.n_features
    }
}

/// Outcome of a load attempt
#[derive(Debug, Clone)]
pub enum ModelAvailability {
    Available(Arc<LoadedModel>),
    Unavailable { reason: String },
}

impl ModelAvailability {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    pub fn model(&self) -> Option<&Arc<LoadedModel>> {
        match self {
            Self::Available(model) => Some(model),
            Self::Unavailable { .. } => None,
        }
    }

    /// Convert into a result, mapping `Unavailable` to `ArtifactUnavailable`
    pub fn into_result(self) -> Result<Arc<LoadedModel>> {
        match self {
            Self::Available(model) => Ok(model),
            Self::Unavailable { reason } => Err(Error::ArtifactUnavailable(reason)),
        }
    }
}

/// Load a model artifact, never failing
///
/// Any read, parse or validation problem yields `Unavailable` with the reason.
pub fn load(path: impl AsRef<Path>) -> ModelAvailability {
    let path = path.as_ref();
    debug!("Loading model artifact from {}", path.display());

    match LoadedModel::from_file(path) {
        Ok(model) => {
            info!(
                "Loaded model {} v{} ({}, {} trees, {} features)",
                model.metadata.name,
                model.metadata.version,
                model.metadata.kind.as_str(),
                model.metadata.n_trees,
                model.metadata.n_features
            );
            ModelAvailability::Available(Arc::new(model))
        }
        Err(e) => {
            let reason = match e {
                Error::ArtifactUnavailable(reason) => reason,
                other => other.to_string(),
            };
            warn!("Model unavailable: {}", reason);
            ModelAvailability::Unavailable { reason }
        }
    }
}

/// Lazily initialized, read-only model shared by the whole process
///
/// The first `get_or_load` performs the single load attempt; concurrent
/// callers wait on the write lock and then reuse the stored handle. Failed
/// loads are not stored, so the next call tries again.
pub struct ModelCache {
    path: PathBuf,
    slot: RwLock<Option<Arc<LoadedModel>>>,
    loads: AtomicU64,
}

impl ModelCache {
    /// Create an empty cache for the artifact at `path`
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            slot: RwLock::new(None),
            loads: AtomicU64::new(0),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Return the cached model, loading it on first use
    pub fn get_or_load(&self) -> ModelAvailability {
        self.get_or_load_tracked().0
    }

    /// Like `get_or_load`, also reporting whether this call read the artifact
    pub fn get_or_load_tracked(&self) -> (ModelAvailability, bool) {
        if let Some(model) = self.slot.read().as_ref() {
            return (ModelAvailability::Available(Arc::clone(model)), false);
        }

        let mut slot = self.slot.write();
        // Another caller may have loaded while we waited for the lock
        if let Some(model) = slot.as_ref() {
            return (ModelAvailability::Available(Arc::clone(model)), false);
        }

        self.loads.fetch_add(1, Ordering::Relaxed);
        let availability = load(&self.path);
        if let ModelAvailability::Available(model) = &availability {
            *slot = Some(Arc::clone(model));
        }
        (availability, true)
    }

    /// The cached model, without attempting a load
    pub fn cached(&self) -> Option<Arc<LoadedModel>> {
        self.slot.read().clone()
    }

    pub fn is_loaded(&self) -> bool {
        self.slot.read().is_some()
    }

    /// Drop the cached model; the next `get_or_load` reads the file again
    pub fn clear(&self) {
        if self.slot.write().take().is_some() {
            info!("Cleared cached model for {}", self.path.display());
        }
    }

    /// Clear and load again
    pub fn reload(&self) -> ModelAvailability {
        self.clear();
        self.get_or_load()
    }

    /// Number of load attempts made so far
    pub fn load_attempts(&self) -> u64 {
        self.loads.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_unavailable() {
        let availability = load("/nonexistent/cataract_model.json");
        match availability {
            ModelAvailability::Unavailable { reason } => {
                assert!(reason.contains("not found"));
            }
            ModelAvailability::Available(_) => panic!("Expected unavailable model"),
        }
    }

    #[test]
    fn test_cache_does_not_store_failures() {
        let cache = ModelCache::new("/nonexistent/cataract_model.json");
        assert!(!cache.get_or_load().is_available());
        assert!(!cache.get_or_load().is_available());
        assert_eq!(cache.load_attempts(), 2);
        assert!(!cache.is_loaded());
        assert!(cache.cached().is_none());
    }

    #[test]
    fn test_into_result_maps_unavailable() {
        let availability = ModelAvailability::Unavailable {
            reason: "gone".to_string(),
        };
        assert!(matches!(
            availability.into_result(),
            Err(Error::ArtifactUnavailable(reason)) if reason == "gone"
        ));
    }
}
