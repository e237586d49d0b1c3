//! Raw patient input as submitted by the UI or the CLI
//!
//! The form carries categorical values as free text and numbers as floats, so
//! that unknown categories surface as `EncodingMismatch` and out-of-range or
//! fractional counts as `InvalidInput` instead of generic parse errors.

use cataract_core::{
    Error, PatientField, PatientRecord, Result, Sex, SlitlampResult, YesNo,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientForm {
    pub age: f64,
    pub sex: String,
    pub family_history: String,
    pub lens_opacity: f64,
    pub acuity_decline: f64,
    pub light_sensitivity: f64,
    pub color_change: String,
    pub double_vision: String,
    pub intraocular_pressure: f64,
    pub slitlamp_result: String,
    pub visual_acuity: f64,
}

impl PatientForm {
    /// Validate the domain of every field and build a typed record
    pub fn into_record(self) -> Result<PatientRecord> {
        let record = PatientRecord {
            age: whole(PatientField::Age, self.age)?,
            sex: Sex::parse_for(PatientField::Sex, &self.sex)?,
            family_history: YesNo::parse_for(PatientField::FamilyHistory, &self.family_history)?,
            lens_opacity: self.lens_opacity,
            acuity_decline: whole(PatientField::AcuityDecline, self.acuity_decline)?,
            light_sensitivity: whole(PatientField::LightSensitivity, self.light_sensitivity)?,
            color_change: YesNo::parse_for(PatientField::ColorChange, &self.color_change)?,
            double_vision: YesNo::parse_for(PatientField::DoubleVision, &self.double_vision)?,
            intraocular_pressure: self.intraocular_pressure,
            slitlamp_result: SlitlampResult::parse_for(
                PatientField::SlitlampResult,
                &self.slitlamp_result,
            )?,
            visual_acuity: self.visual_acuity,
        };
        record.validate_domain()?;
        Ok(record)
    }
}

impl From<&PatientRecord> for PatientForm {
    fn from(record: &PatientRecord) -> Self {
        Self {
            age: f64::from(record.age),
            sex: record.sex.as_str().to_string(),
            family_history: record.family_history.as_str().to_string(),
            lens_opacity: record.lens_opacity,
            acuity_decline: f64::from(record.acuity_decline),
            light_sensitivity: f64::from(record.light_sensitivity),
            color_change: record.color_change.as_str().to_string(),
            double_vision: record.double_vision.as_str().to_string(),
            intraocular_pressure: record.intraocular_pressure,
            slitlamp_result: record.slitlamp_result.as_str().to_string(),
            visual_acuity: record.visual_acuity,
        }
    }
}

/// Integer-valued field: in domain and without a fractional part
fn whole(field: PatientField, value: f64) -> Result<u32> {
    field.check_domain(value)?;
    if value.fract() != 0.0 {
        return Err(Error::invalid_input(format!(
            "{} must be a whole number, got {}",
            field.column_name(),
            value
        )));
    }
    Ok(value as u32)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> PatientForm {
        PatientForm::from(&PatientRecord::default())
    }

    #[test]
    fn test_round_trip_default_record() {
        assert_eq!(form().into_record().unwrap(), PatientRecord::default());
    }

    #[test]
    fn test_categories_are_case_insensitive() {
        let mut f = form();
        f.sex = " Female ".to_string();
        f.slitlamp_result = "ABNORMAL".to_string();
        let record = f.into_record().unwrap();
        assert_eq!(record.sex, Sex::Female);
        assert_eq!(record.slitlamp_result, SlitlampResult::Abnormal);
    }

    #[test]
    fn test_unknown_category_is_encoding_mismatch() {
        let mut f = form();
        f.double_vision = "sometimes".to_string();
        let err = f.into_record().unwrap_err();
        assert!(matches!(err, Error::EncodingMismatch { ref field, .. } if field == "double_vision"));
    }

    #[test]
    fn test_out_of_domain_is_invalid_input() {
        let mut f = form();
        f.visual_acuity = 1.2;
        assert!(matches!(f.into_record(), Err(Error::InvalidInput(_))));

        let mut f = form();
        f.age = -1.0;
        assert!(matches!(f.into_record(), Err(Error::InvalidInput(_))));

        let mut f = form();
        f.acuity_decline = 2.5;
        assert!(matches!(f.into_record(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_domain_edges_accepted() {
        let mut f = form();
        f.visual_acuity = 0.0;
        f.age = 120.0;
        f.intraocular_pressure = 30.0;
        assert!(f.into_record().is_ok());
    }
}
