//! Fixed categorical encoding tables
//!
//! Codes are assigned once, when the model artifact is created, and shipped
//! inside the artifact. Inference-time encoding is a plain table lookup and
//! never depends on which other values happen to be present in a request.

use cataract_core::{Error, PatientField, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};

use crate::schema::FeatureSchema;

/// Version of the built-in table
pub const BUILTIN_ENCODING_VERSION: u32 = 1;

/// Versioned map from categorical value to integer code, per column
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncodingTable {
    pub version: u32,

    /// Column name -> (canonical value -> code)
    pub tables: BTreeMap<String, BTreeMap<String, u32>>,
}

impl EncodingTable {
    /// The built-in v1 table
    ///
    /// sex: male=0, female=1; yes/no columns: no=0, yes=1;
    /// slitlamp_result: abnormal=0, normal=1.
    pub fn builtin() -> Self {
        let yes_no = || table(&[("no", 0), ("yes", 1)]);

        let mut tables = BTreeMap::new();
        tables.insert(
            PatientField::Sex.column_name().to_string(),
            table(&[("male", 0), ("female", 1)]),
        );
        tables.insert(PatientField::FamilyHistory.column_name().to_string(), yes_no());
        tables.insert(PatientField::ColorChange.column_name().to_string(), yes_no());
        tables.insert(PatientField::DoubleVision.column_name().to_string(), yes_no());
        tables.insert(
            PatientField::SlitlampResult.column_name().to_string(),
            table(&[("abnormal", 0), ("normal", 1)]),
        );

        Self {
            version: BUILTIN_ENCODING_VERSION,
            tables,
        }
    }

    /// Look up the code of a categorical value
    pub fn encode(&self, field: PatientField, value: &str) -> Result<u32> {
        self.tables
            .get(field.column_name())
            .and_then(|codes| codes.get(value))
            .copied()
            .ok_or_else(|| Error::encoding(field.column_name(), value))
    }

    /// Codes for one column
    pub fn codes(&self, field: PatientField) -> Option<&BTreeMap<String, u32>> {
        self.tables.get(field.column_name())
    }

    /// Whether `code` is a valid code for `field`
    pub fn contains_code(&self, field: PatientField, code: u32) -> bool {
        self.codes(field)
            .map(|codes| codes.values().any(|c| *c == code))
            .unwrap_or(false)
    }

    /// Check that every categorical column of the schema is fully covered
    pub fn validate_for(&self, schema: &FeatureSchema) -> Result<()> {
        for field in schema.resolve()? {
            if !field.is_categorical() {
                continue;
            }

            let codes = self.codes(field).ok_or_else(|| {
                Error::schema(format!(
                    "encoding table v{} has no entry for column '{}'",
                    self.version, field
                ))
            })?;

            for category in field.categories() {
                if !codes.contains_key(*category) {
                    return Err(Error::encoding(field.column_name(), *category));
                }
            }

            let mut seen = HashSet::new();
            for (value, code) in codes {
                if !seen.insert(*code) {
                    return Err(Error::schema(format!(
                        "code {} assigned twice in column '{}' (value '{}')",
                        code, field, value
                    )));
                }
            }
        }
        Ok(())
    }
}

impl Default for EncodingTable {
    fn default() -> Self {
        Self::builtin()
    }
}

fn table(entries: &[(&str, u32)]) -> BTreeMap<String, u32> {
    entries
        .iter()
        .map(|(value, code)| (value.to_string(), *code))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_codes() {
        let table = EncodingTable::builtin();
        assert_eq!(table.encode(PatientField::Sex, "male").unwrap(), 0);
        assert_eq!(table.encode(PatientField::Sex, "female").unwrap(), 1);
        assert_eq!(table.encode(PatientField::FamilyHistory, "no").unwrap(), 0);
        assert_eq!(table.encode(PatientField::DoubleVision, "yes").unwrap(), 1);
        assert_eq!(table.encode(PatientField::SlitlampResult, "normal").unwrap(), 1);
    }

    #[test]
    fn test_encoding_is_order_independent() {
        let table = EncodingTable::builtin();
        // A lone value keeps its fixed code regardless of what was encoded before
        let first = table.encode(PatientField::ColorChange, "yes").unwrap();
        let _ = table.encode(PatientField::ColorChange, "no").unwrap();
        let again = table.encode(PatientField::ColorChange, "yes").unwrap();
        assert_eq!(first, again);
        assert_eq!(first, 1);
    }

    #[test]
    fn test_unknown_value_fails_fast() {
        let table = EncodingTable::builtin();
        let err = table.encode(PatientField::Sex, "unknown").unwrap_err();
        assert!(matches!(err, Error::EncodingMismatch { .. }));
    }

    #[test]
    fn test_builtin_covers_default_schema() {
        let table = EncodingTable::builtin();
        assert!(table.validate_for(&FeatureSchema::default()).is_ok());
    }

    #[test]
    fn test_incomplete_table_rejected() {
        let mut table = EncodingTable::builtin();
        table
            .tables
            .get_mut("slitlamp_result")
            .unwrap()
            .remove("abnormal");
        assert!(table.validate_for(&FeatureSchema::default()).is_err());
    }

    #[test]
    fn test_duplicate_codes_rejected() {
        let mut table = EncodingTable::builtin();
        table
            .tables
            .get_mut("sex")
            .unwrap()
            .insert("female".to_string(), 0);
        let err = table.validate_for(&FeatureSchema::default()).unwrap_err();
        assert!(matches!(err, Error::SchemaMismatch(_)));
    }
}
