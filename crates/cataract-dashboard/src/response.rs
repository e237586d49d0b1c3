//! JSON bodies shared by the HTTP API and the CLI

use cataract_classifiers::{
    EncodingTable, FeatureSchema, LoadedModel, ModelAvailability, ModelMetadata, TrainingReport,
};
use cataract_core::{
    Label, LensOpacityBand, PatientRecord, Prediction, PressureBand, VisualAcuityBand,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::Path;
use uuid::Uuid;

use crate::content;

/// Whether a model is loaded, and what it is
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModelStatus {
    Available {
        #[serde(flatten)]
        metadata: ModelMetadata,
        schema: FeatureSchema,
        encoding: EncodingTable,
    },
    Unavailable {
        reason: String,
        path: String,
    },
}

impl ModelStatus {
    pub fn new(availability: &ModelAvailability, path: &Path) -> Self {
        match availability {
            ModelAvailability::Available(model) => Self::Available {
                metadata: model.metadata().clone(),
                schema: model.schema().clone(),
                encoding: model.encoding().clone(),
            },
            ModelAvailability::Unavailable { reason } => Self::Unavailable {
                reason: reason.clone(),
                path: path.display().to_string(),
            },
        }
    }

    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available { .. })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ClassProbabilities {
    pub no_cataract: f64,
    pub cataract: f64,
}

/// Clinical reading of the numeric measurements
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementBands {
    pub lens_opacity: LensOpacityBand,
    pub visual_acuity: VisualAcuityBand,
    pub intraocular_pressure: PressureBand,
}

impl MeasurementBands {
    pub fn of(record: &PatientRecord) -> Self {
        Self {
            lens_opacity: LensOpacityBand::classify(record.lens_opacity),
            visual_acuity: VisualAcuityBand::classify(record.visual_acuity),
            intraocular_pressure: PressureBand::classify(record.intraocular_pressure),
        }
    }
}

/// A prediction as rendered to the user
#[derive(Debug, Clone, Serialize)]
pub struct PredictionResponse {
    pub id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    /// Label code, 1 = cataract
    pub label: u8,
    pub label_name: &'static str,
    pub headline: &'static str,
    pub probabilities: ClassProbabilities,
    /// Probability of the predicted label
    pub probability: f64,
    pub features: Vec<f64>,
    pub bands: MeasurementBands,
    pub recommendations: &'static [&'static str],
    pub notes: &'static [&'static str],
}

impl PredictionResponse {
    pub fn new(record: &PatientRecord, prediction: &Prediction, model: &LoadedModel) -> Self {
        Self {
            id: Uuid::new_v4(),
            generated_at: Utc::now(),
            model: model.metadata().name.clone(),
            label: prediction.label.code(),
            label_name: prediction.label.name(),
            headline: prediction.label.headline(),
            probabilities: ClassProbabilities {
                no_cataract: prediction.probabilities.of(Label::NoCataract),
                cataract: prediction.probabilities.of(Label::Cataract),
            },
            probability: prediction.confidence(),
            features: prediction.features.as_slice().to_vec(),
            bands: MeasurementBands::of(record),
            recommendations: content::recommendations(prediction.label),
            notes: content::NOTES,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Training history page content
#[derive(Debug, Clone, Serialize)]
pub struct TrainingView {
    /// `artifact` when the loaded model carries its own report
    pub source: &'static str,
    pub report: TrainingReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub feature_importances: Vec<FeatureImportance>,
}

impl TrainingView {
    pub fn new(model: Option<&LoadedModel>) -> Self {
        let report = model.and_then(LoadedModel::training);
        let feature_importances = model
            .and_then(LoadedModel::ranked_importances)
            .unwrap_or_default()
            .into_iter()
            .map(|(feature, importance)| FeatureImportance {
                feature,
                importance,
            })
            .collect();

        Self {
            source: if report.is_some() { "artifact" } else { "builtin" },
            report: report.cloned().unwrap_or_default(),
            feature_importances,
        }
    }
}
