//! Core types for Cataract Screen

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::field::PatientField;

/// Tolerance used when checking that class probabilities sum to one
pub const PROBABILITY_TOLERANCE: f64 = 1e-6;

/// Patient sex
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Male,
    Female,
}

/// Answer to a yes/no symptom question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum YesNo {
    Yes,
    No,
}

/// Outcome of the slit-lamp examination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SlitlampResult {
    Normal,
    Abnormal,
}

impl Sex {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }

    /// Parse a form value for the given field
    pub fn parse_for(field: PatientField, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "male" => Ok(Self::Male),
            "female" => Ok(Self::Female),
            _ => Err(Error::encoding(field.column_name(), value)),
        }
    }
}

impl YesNo {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yes => "yes",
            Self::No => "no",
        }
    }

    /// Parse a form value for the given field
    pub fn parse_for(field: PatientField, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            _ => Err(Error::encoding(field.column_name(), value)),
        }
    }
}

impl SlitlampResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Normal => "normal",
            Self::Abnormal => "abnormal",
        }
    }

    /// Parse a form value for the given field
    pub fn parse_for(field: PatientField, value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Self::Normal),
            "abnormal" => Ok(Self::Abnormal),
            _ => Err(Error::encoding(field.column_name(), value)),
        }
    }
}

impl FromStr for Sex {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_for(PatientField::Sex, s)
    }
}

impl FromStr for SlitlampResult {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse_for(PatientField::SlitlampResult, s)
    }
}

/// One patient's input feature set for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecord {
    /// Age in years (0-120)
    pub age: u32,

    pub sex: Sex,

    /// Whether a family member has had cataract
    pub family_history: YesNo,

    /// Lens opacity score (0.0-10.0)
    pub lens_opacity: f64,

    /// Decline of visual sharpness (0-10)
    pub acuity_decline: u32,

    /// Sensitivity to light (0-10)
    pub light_sensitivity: u32,

    /// Change in color perception
    pub color_change: YesNo,

    pub double_vision: YesNo,

    /// Intraocular pressure in mmHg (10.0-30.0)
    pub intraocular_pressure: f64,

    pub slitlamp_result: SlitlampResult,

    /// Visual acuity as a decimal fraction (0.0-1.0)
    pub visual_acuity: f64,
}

impl PatientRecord {
    /// Numeric value of a field, `None` for categorical fields
    pub fn numeric_value(&self, field: PatientField) -> Option<f64> {
        match field {
            PatientField::Age => Some(f64::from(self.age)),
            PatientField::LensOpacity => Some(self.lens_opacity),
            PatientField::AcuityDecline => Some(f64::from(self.acuity_decline)),
            PatientField::LightSensitivity => Some(f64::from(self.light_sensitivity)),
            PatientField::IntraocularPressure => Some(self.intraocular_pressure),
            PatientField::VisualAcuity => Some(self.visual_acuity),
            _ => None,
        }
    }

    /// Canonical string value of a field, `None` for numeric fields
    pub fn categorical_value(&self, field: PatientField) -> Option<&'static str> {
        match field {
            PatientField::Sex => Some(self.sex.as_str()),
            PatientField::FamilyHistory => Some(self.family_history.as_str()),
            PatientField::ColorChange => Some(self.color_change.as_str()),
            PatientField::DoubleVision => Some(self.double_vision.as_str()),
            PatientField::SlitlampResult => Some(self.slitlamp_result.as_str()),
            _ => None,
        }
    }

    /// Check every numeric field against its declared domain
    pub fn validate_domain(&self) -> Result<()> {
        for field in PatientField::ALL {
            if let Some(value) = self.numeric_value(field) {
                field.check_domain(value)?;
            }
        }
        Ok(())
    }
}

impl Default for PatientRecord {
    /// The initial form values of the classification page
    fn default() -> Self {
        Self {
            age: 65,
            sex: Sex::Male,
            family_history: YesNo::Yes,
            lens_opacity: 5.0,
            acuity_decline: 5,
            light_sensitivity: 5,
            color_change: YesNo::Yes,
            double_vision: YesNo::Yes,
            intraocular_pressure: 18.0,
            slitlamp_result: SlitlampResult::Normal,
            visual_acuity: 0.5,
        }
    }
}

/// Binary prediction output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Label {
    NoCataract,
    Cataract,
}

impl Label {
    pub const ALL: [Label; 2] = [Self::NoCataract, Self::Cataract];

    /// Class index used by the model
    pub fn code(&self) -> u8 {
        match self {
            Self::NoCataract => 0,
            Self::Cataract => 1,
        }
    }

    /// Map a class index back to a label
    pub fn from_code(code: usize) -> Result<Self> {
        match code {
            0 => Ok(Self::NoCataract),
            1 => Ok(Self::Cataract),
            other => Err(Error::inference(format!("label {} is not binary", other))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::NoCataract => "no_cataract",
            Self::Cataract => "cataract",
        }
    }

    pub fn headline(&self) -> &'static str {
        match self {
            Self::NoCataract => "No cataract detected",
            Self::Cataract => "Cataract detected",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-class confidence scores, indexed by label code
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProbabilityVector([f64; 2]);

impl ProbabilityVector {
    /// Build a probability vector, rejecting malformed classifier output
    pub fn new(values: &[f64]) -> Result<Self> {
        if values.len() != 2 {
            return Err(Error::inference(format!(
                "expected 2 class probabilities, got {}",
                values.len()
            )));
        }
        for (index, p) in values.iter().enumerate() {
            if !p.is_finite() || *p < 0.0 || *p > 1.0 {
                return Err(Error::inference(format!(
                    "probability {} for class {} is outside [0, 1]",
                    p, index
                )));
            }
        }
        let sum: f64 = values.iter().sum();
        if (sum - 1.0).abs() > PROBABILITY_TOLERANCE {
            return Err(Error::inference(format!(
                "class probabilities sum to {}, expected 1",
                sum
            )));
        }
        Ok(Self([values[0], values[1]]))
    }

    /// Probability of the given label
    pub fn of(&self, label: Label) -> f64 {
        self.0[label.code() as usize]
    }

    /// Most probable label; ties go to the lower class index
    pub fn argmax(&self) -> Label {
        if self.0[1] > self.0[0] {
            Label::Cataract
        } else {
            Label::NoCataract
        }
    }

    pub fn as_array(&self) -> [f64; 2] {
        self.0
    }

    pub fn sum(&self) -> f64 {
        self.0[0] + self.0[1]
    }
}

/// Encoded, ordered model input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<f64> {
        self.0.get(index).copied()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl From<Vec<f64>> for FeatureVector {
    fn from(values: Vec<f64>) -> Self {
        Self(values)
    }
}

/// Result of a single prediction
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub label: Label,

    pub probabilities: ProbabilityVector,

    /// The feature vector the classifier saw
    pub features: FeatureVector,
}

impl Prediction {
    /// Probability of the predicted label
    pub fn confidence(&self) -> f64 {
        self.probabilities.of(self.label)
    }
}
