//! Patient field metadata
//!
//! Every attribute of a [`PatientRecord`](crate::PatientRecord) has a stable
//! column name (the name used in model artifacts and datasets), a kind, and,
//! for numeric fields, an inclusive domain range.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Semantic type of a feature column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Whole number
    Integer,
    /// Real number
    Float,
    /// Encoded through a lookup table
    Categorical,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Categorical => "categorical",
        };
        f.write_str(s)
    }
}

/// One attribute of a patient record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatientField {
    Age,
    Sex,
    FamilyHistory,
    LensOpacity,
    AcuityDecline,
    LightSensitivity,
    ColorChange,
    DoubleVision,
    IntraocularPressure,
    SlitlampResult,
    VisualAcuity,
}

impl PatientField {
    /// All fields in the default training column order
    pub const ALL: [PatientField; 11] = [
        Self::Age,
        Self::Sex,
        Self::FamilyHistory,
        Self::LensOpacity,
        Self::AcuityDecline,
        Self::LightSensitivity,
        Self::ColorChange,
        Self::DoubleVision,
        Self::IntraocularPressure,
        Self::SlitlampResult,
        Self::VisualAcuity,
    ];

    /// Column name used in artifacts and datasets
    pub fn column_name(&self) -> &'static str {
        match self {
            Self::Age => "age",
            Self::Sex => "sex",
            Self::FamilyHistory => "family_history",
            Self::LensOpacity => "lens_opacity",
            Self::AcuityDecline => "acuity_decline",
            Self::LightSensitivity => "light_sensitivity",
            Self::ColorChange => "color_change",
            Self::DoubleVision => "double_vision",
            Self::IntraocularPressure => "intraocular_pressure",
            Self::SlitlampResult => "slitlamp_result",
            Self::VisualAcuity => "visual_acuity",
        }
    }

    /// Human-readable label for forms
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Age => "Age",
            Self::Sex => "Sex",
            Self::FamilyHistory => "Family history",
            Self::LensOpacity => "Lens opacity",
            Self::AcuityDecline => "Acuity decline",
            Self::LightSensitivity => "Light sensitivity",
            Self::ColorChange => "Color perception change",
            Self::DoubleVision => "Double vision",
            Self::IntraocularPressure => "Intraocular pressure",
            Self::SlitlampResult => "Slit-lamp result",
            Self::VisualAcuity => "Visual acuity",
        }
    }

    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Age | Self::AcuityDecline | Self::LightSensitivity => FieldKind::Integer,
            Self::LensOpacity | Self::IntraocularPressure | Self::VisualAcuity => FieldKind::Float,
            Self::Sex
            | Self::FamilyHistory
            | Self::ColorChange
            | Self::DoubleVision
            | Self::SlitlampResult => FieldKind::Categorical,
        }
    }

    /// Inclusive domain of a numeric field, `None` for categorical fields
    pub fn domain(&self) -> Option<(f64, f64)> {
        match self {
            Self::Age => Some((0.0, 120.0)),
            Self::LensOpacity => Some((0.0, 10.0)),
            Self::AcuityDecline | Self::LightSensitivity => Some((0.0, 10.0)),
            Self::IntraocularPressure => Some((10.0, 30.0)),
            Self::VisualAcuity => Some((0.0, 1.0)),
            _ => None,
        }
    }

    /// Accepted values of a categorical field in canonical form
    pub fn categories(&self) -> &'static [&'static str] {
        match self {
            Self::Sex => &["male", "female"],
            Self::FamilyHistory | Self::ColorChange | Self::DoubleVision => &["yes", "no"],
            Self::SlitlampResult => &["normal", "abnormal"],
            _ => &[],
        }
    }

    pub fn is_categorical(&self) -> bool {
        self.kind() == FieldKind::Categorical
    }

    /// Check a numeric value against the field domain
    pub fn check_domain(&self, value: f64) -> Result<()> {
        let Some((min, max)) = self.domain() else {
            return Ok(());
        };
        if !value.is_finite() || value < min || value > max {
            return Err(Error::invalid_input(format!(
                "{} must be within {}..={}, got {}",
                self.column_name(),
                min,
                max,
                value
            )));
        }
        Ok(())
    }
}

impl fmt::Display for PatientField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for PatientField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|field| field.column_name() == s)
            .ok_or_else(|| Error::schema(format!("unknown feature column '{}'", s)))
    }
}
