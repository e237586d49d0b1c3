//! Feature schema persisted with each model artifact
//!
//! The schema is the ordered column list the model was trained on. Feature
//! vectors are assembled in this order and checked against it before they
//! reach a classifier.

use cataract_core::{Error, FeatureVector, FieldKind, PatientField, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::encoding::EncodingTable;

/// One column of the feature schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureColumn {
    pub name: String,
    pub kind: FieldKind,
}

/// Ordered feature columns expected by a model
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    pub version: u32,
    pub columns: Vec<FeatureColumn>,
}

impl FeatureSchema {
    /// Schema listing every patient field in its default order
    pub fn from_fields(fields: &[PatientField]) -> Self {
        Self {
            version: 1,
            columns: fields
                .iter()
                .map(|field| FeatureColumn {
                    name: field.column_name().to_string(),
                    kind: field.kind(),
                })
                .collect(),
        }
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Map each column to its patient field
    ///
    /// Fails on an empty schema, duplicate or unknown columns, and columns
    /// whose declared kind differs from the field's kind.
    pub fn resolve(&self) -> Result<Vec<PatientField>> {
        if self.columns.is_empty() {
            return Err(Error::schema("schema has no columns"));
        }

        let mut seen = HashSet::new();
        let mut fields = Vec::with_capacity(self.columns.len());

        for column in &self.columns {
            let field: PatientField = column.name.parse()?;
            if !seen.insert(field) {
                return Err(Error::schema(format!("duplicate column '{}'", column.name)));
            }
            if field.kind() != column.kind {
                return Err(Error::schema(format!(
                    "column '{}' declared {} but the field is {}",
                    column.name,
                    column.kind,
                    field.kind()
                )));
            }
            fields.push(field);
        }

        Ok(fields)
    }

    /// Check an assembled vector against this schema
    pub fn validate_vector(&self, features: &FeatureVector, encoding: &EncodingTable) -> Result<()> {
        if features.len() != self.width() {
            return Err(Error::schema(format!(
                "expected {} features, assembled {}",
                self.width(),
                features.len()
            )));
        }

        for (column, value) in self.columns.iter().zip(features.as_slice()) {
            if !value.is_finite() {
                return Err(Error::schema(format!(
                    "column '{}' has non-finite value {}",
                    column.name, value
                )));
            }

            match column.kind {
                FieldKind::Float => {}
                FieldKind::Integer => {
                    if value.fract() != 0.0 {
                        return Err(Error::schema(format!(
                            "integer column '{}' has fractional value {}",
                            column.name, value
                        )));
                    }
                }
                FieldKind::Categorical => {
                    let field: PatientField = column.name.parse()?;
                    let in_table = value.fract() == 0.0
                        && *value >= 0.0
                        && encoding.contains_code(field, *value as u32);
                    if !in_table {
                        return Err(Error::schema(format!(
                            "categorical column '{}' has code {} outside encoding table v{}",
                            column.name, value, encoding.version
                        )));
                    }
                }
            }
        }

        Ok(())
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self::from_fields(&PatientField::ALL)
    }
}
