//! Static text shown around a prediction: field guide, recommendations and
//! disclaimer notes

use cataract_core::{
    FieldKind, Label, LensOpacityBand, PatientField, PressureBand, VisualAcuityBand,
};
use serde::Serialize;

/// Notes shown beneath every prediction
pub const NOTES: &[&str] = &[
    "This prediction only supports a diagnosis and does not replace a direct medical examination.",
    "Always consult an ophthalmologist for an accurate diagnosis.",
    "The model has a limited accuracy and can still make wrong predictions.",
];

const CATARACT_RECOMMENDATIONS: &[&str] = &[
    "Consult an ophthalmologist promptly for further examination.",
    "Avoid activities that require sharp vision.",
    "Wear eye protection when outdoors.",
    "Watch for symptoms that may get worse.",
];

const NO_CATARACT_RECOMMENDATIONS: &[&str] = &[
    "Have a routine eye examination every 6-12 months.",
    "Keep a healthy lifestyle and a nutritious diet.",
    "Wear eye protection in direct sunlight.",
    "Consult promptly if abnormal vision symptoms appear.",
];

/// Follow-up advice for a predicted label
pub fn recommendations(label: Label) -> &'static [&'static str] {
    match label {
        Label::Cataract => CATARACT_RECOMMENDATIONS,
        Label::NoCataract => NO_CATARACT_RECOMMENDATIONS,
    }
}

/// One entry of the input guide
#[derive(Debug, Clone, Serialize)]
pub struct FieldGuide {
    pub field: PatientField,
    pub label: &'static str,
    pub kind: FieldKind,
    pub help: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub range: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "no_values")]
    pub values: &'static [&'static str],
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub bands: Vec<&'static str>,
}

fn no_values(values: &&'static [&'static str]) -> bool {
    values.is_empty()
}

fn help(field: PatientField) -> &'static str {
    match field {
        PatientField::Age => "Patient age in years",
        PatientField::Sex => "Patient sex",
        PatientField::FamilyHistory => "Whether a family member has had cataract",
        PatientField::LensOpacity => "Degree of lens clouding",
        PatientField::AcuityDecline => "How much visual sharpness has declined",
        PatientField::LightSensitivity => "Sensitivity to bright light",
        PatientField::ColorChange => "Whether color perception has changed",
        PatientField::DoubleVision => "Whether the patient sees double",
        PatientField::IntraocularPressure => "Pressure inside the eye in mmHg",
        PatientField::SlitlampResult => "Outcome of the slit-lamp examination",
        PatientField::VisualAcuity => "Visual acuity as a decimal fraction",
    }
}

fn bands(field: PatientField) -> Vec<&'static str> {
    match field {
        PatientField::LensOpacity => [
            LensOpacityBand::Normal,
            LensOpacityBand::Moderate,
            LensOpacityBand::High,
        ]
        .iter()
        .map(LensOpacityBand::description)
        .collect(),
        PatientField::VisualAcuity => [
            VisualAcuityBand::Normal,
            VisualAcuityBand::Mild,
            VisualAcuityBand::Moderate,
            VisualAcuityBand::Severe,
        ]
        .iter()
        .map(VisualAcuityBand::description)
        .collect(),
        PatientField::IntraocularPressure => vec![PressureBand::Normal.description()],
        _ => Vec::new(),
    }
}

/// Guide for every input field, in form order
pub fn field_guide() -> Vec<FieldGuide> {
    PatientField::ALL
        .iter()
        .map(|&field| FieldGuide {
            field,
            label: field.display_name(),
            kind: field.kind(),
            help: help(field),
            range: field.domain().map(|(lo, hi)| [lo, hi]),
            values: field.categories(),
            bands: bands(field),
        })
        .collect()
}
