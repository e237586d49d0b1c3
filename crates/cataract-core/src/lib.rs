//! Cataract Screen Core
//!
//! Core types and utilities shared across the cataract screening components.
//!
//! This crate provides:
//! - The `PatientRecord` input and its categorical value types
//! - Field metadata (artifact column names, kinds, domain ranges)
//! - Prediction output types (label, probability vector, feature vector)
//! - Clinical interpretation bands for the numeric measurements
//! - Error types and result handling

pub mod bands;
pub mod error;
pub mod field;
pub mod types;

pub use bands::{LensOpacityBand, PressureBand, VisualAcuityBand};
pub use error::{Error, Result};
pub use field::{FieldKind, PatientField};
pub use types::{
    FeatureVector, Label, PatientRecord, Prediction, ProbabilityVector, Sex, SlitlampResult,
    YesNo, PROBABILITY_TOLERANCE,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::field::{FieldKind, PatientField};
    pub use crate::types::{
        FeatureVector, Label, PatientRecord, Prediction, ProbabilityVector, Sex,
        SlitlampResult, YesNo,
    };
}
