//! One-shot CLI commands

use anyhow::Context;
use cataract_classifiers::{load, predict, ModelAvailability};
use std::path::Path;

use crate::cli::PredictArgs;
use crate::response::{ModelStatus, PredictionResponse};

/// Load the model and score the patient given on the command line
///
/// Fails when the model is unavailable or the input is rejected.
pub fn run_predict(args: &PredictArgs) -> anyhow::Result<PredictionResponse> {
    let model = match load(&args.model) {
        ModelAvailability::Available(model) => model,
        ModelAvailability::Unavailable { reason } => {
            anyhow::bail!("Model unavailable ({}): {}", args.model.display(), reason);
        }
    };

    let record = args.form().into_record().context("Invalid patient input")?;
    let prediction = predict(&record, &model).context("Prediction failed")?;
    Ok(PredictionResponse::new(&record, &prediction, &model))
}

/// Status of the artifact at `model`
pub fn inspect(model: &Path) -> ModelStatus {
    ModelStatus::new(&load(model), model)
}
