//! Input-to-prediction pipeline
//!
//! A prediction runs four steps on one record:
//! 1. encode categorical fields through the fixed encoding table
//! 2. assemble the feature vector in the schema's column order
//! 3. validate the vector against the schema
//! 4. call `classify` and `classify_probabilities` on the classifier
//!
//! The pipeline holds no state between calls.

use cataract_core::{Error, FeatureVector, PatientField, PatientRecord, Prediction, Result};
use std::borrow::Cow;
use std::time::Instant;
use tracing::debug;

use crate::classifier::Classifier;
use crate::encoding::EncodingTable;
use crate::model_loader::LoadedModel;
use crate::schema::FeatureSchema;

/// Encoding and assembly rules for one feature schema
#[derive(Debug, Clone)]
pub struct InferencePipeline<'a> {
    schema: &'a FeatureSchema,
    fields: Cow<'a, [PatientField]>,
    encoding: &'a EncodingTable,
}

impl<'a> InferencePipeline<'a> {
    /// Create a pipeline, resolving and checking the schema against the table
    pub fn new(schema: &'a FeatureSchema, encoding: &'a EncodingTable) -> Result<Self> {
        let fields = schema.resolve()?;
        encoding.validate_for(schema)?;
        Ok(Self {
            schema,
            fields: Cow::Owned(fields),
            encoding,
        })
    }

    /// Pipeline over an already validated schema
    pub(crate) fn bound(
        schema: &'a FeatureSchema,
        fields: &'a [PatientField],
        encoding: &'a EncodingTable,
    ) -> Self {
        Self {
            schema,
            fields: Cow::Borrowed(fields),
            encoding,
        }
    }

    /// Encode and assemble a record into the schema's column order
    pub fn encode(&self, record: &PatientRecord) -> Result<FeatureVector> {
        let mut values = Vec::with_capacity(self.fields.len());

        for field in self.fields.iter() {
            let value = match record.categorical_value(*field) {
                Some(category) => f64::from(self.encoding.encode(*field, category)?),
                None => record.numeric_value(*field).ok_or_else(|| {
                    Error::schema(format!("no value for column '{}'", field))
                })?,
            };
            values.push(value);
        }

        Ok(FeatureVector::new(values))
    }

    /// Encode, validate and classify a single record
    pub fn predict(&self, record: &PatientRecord, classifier: &dyn Classifier) -> Result<Prediction> {
        let start = Instant::now();

        let features = self.encode(record)?;
        self.schema.validate_vector(&features, self.encoding)?;

        if classifier.n_features() != features.len() {
            return Err(Error::inference(format!(
                "classifier '{}' expects {} features, schema assembled {}",
                classifier.name(),
                classifier.n_features(),
                features.len()
            )));
        }

        let label = classifier.classify(&features)?;
        let probabilities = classifier.classify_probabilities(&features)?;

        if label != probabilities.argmax() {
            return Err(Error::inference(format!(
                "classifier '{}' returned label {} but probabilities favour {}",
                classifier.name(),
                label,
                probabilities.argmax()
            )));
        }

        debug!(
            classifier = classifier.name(),
            label = %label,
            p_cataract = probabilities.as_array()[1],
            latency_us = start.elapsed().as_micros() as u64,
            "Prediction complete"
        );

        Ok(Prediction {
            label,
            probabilities,
            features,
        })
    }
}

/// Predict with a loaded model, using the schema and encoding it shipped with
pub fn predict(record: &PatientRecord, model: &LoadedModel) -> Result<Prediction> {
    model.pipeline().predict(record, model)
}
