use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use cataract_classifiers::{predict as run_pipeline, LoadedModel};
use cataract_core::{Error, Label, PatientRecord};
use cataract_telemetry::Outcome;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::content;
use crate::dataset::{
    Dataset, DatasetPreview, DatasetSummary, Histogram, DEFAULT_HISTOGRAM_BINS,
    DEFAULT_PREVIEW_ROWS,
};
use crate::error::ApiError;
use crate::form::PatientForm;
use crate::response::{ModelStatus, PredictionResponse, TrainingView};
use crate::state::AppState;

/// Largest preview the API will return
const MAX_PREVIEW_ROWS: usize = 500;

// ============================================================================
// Health and model endpoints
// ============================================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

pub async fn model_status(State(state): State<AppState>) -> Json<ModelStatus> {
    let availability = state.shared_model().await;
    Json(ModelStatus::new(&availability, state.models.path()))
}

pub async fn reload_model(State(state): State<AppState>) -> Json<ModelStatus> {
    let availability = state.reloaded_model().await;
    Json(ModelStatus::new(&availability, state.models.path()))
}

// ============================================================================
// Prediction
// ============================================================================

pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<PatientForm>, JsonRejection>,
) -> Result<Json<PredictionResponse>, ApiError> {
    let start = Instant::now();
    // No model means no form processing at all
    let result = match state.shared_model().await.into_result() {
        Ok(model) => run_prediction(&model, payload),
        Err(e) => Err(e.into()),
    };

    let outcome = match &result {
        Ok(response) => Label::from_code(usize::from(response.label))
            .map(Outcome::Predicted)
            .unwrap_or(Outcome::Failed),
        Err(ApiError::Core(Error::ArtifactUnavailable(_))) => Outcome::ModelUnavailable,
        Err(ApiError::BadRequest(_))
        | Err(ApiError::Core(Error::EncodingMismatch { .. }))
        | Err(ApiError::Core(Error::InvalidInput(_))) => Outcome::Rejected,
        Err(_) => Outcome::Failed,
    };
    state.telemetry.record(outcome, start.elapsed());

    result.map(Json)
}

fn run_prediction(
    model: &LoadedModel,
    payload: Result<Json<PatientForm>, JsonRejection>,
) -> Result<PredictionResponse, ApiError> {
    let Json(form) = payload?;
    let record = form.into_record()?;
    debug!("Predicting for {:?}", record);

    let prediction = run_pipeline(&record, model)?;
    info!(
        "Prediction: {} (p={:.4})",
        prediction.label,
        prediction.confidence()
    );

    Ok(PredictionResponse::new(&record, &prediction, model))
}

#[derive(Debug, Serialize)]
pub struct GuideResponse {
    pub fields: Vec<content::FieldGuide>,
    /// Initial form values
    pub defaults: PatientRecord,
}

pub async fn guide() -> Json<GuideResponse> {
    Json(GuideResponse {
        fields: content::field_guide(),
        defaults: PatientRecord::default(),
    })
}

// ============================================================================
// Dataset preview and training history
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct PreviewQuery {
    pub rows: Option<usize>,
}

pub async fn dataset_preview(
    State(state): State<AppState>,
    query: Result<Query<PreviewQuery>, QueryRejection>,
) -> Result<Json<DatasetPreview>, ApiError> {
    let Query(query) = query?;
    let rows = query.rows.unwrap_or(DEFAULT_PREVIEW_ROWS);
    if rows > MAX_PREVIEW_ROWS {
        return Err(Error::invalid_input(format!(
            "rows must be at most {}, got {}",
            MAX_PREVIEW_ROWS, rows
        ))
        .into());
    }

    let dataset = state.shared_dataset().await?;
    Ok(Json(dataset.preview(rows)))
}

pub async fn dataset_summary(
    State(state): State<AppState>,
) -> Result<Json<DatasetSummary>, ApiError> {
    let dataset = state.shared_dataset().await?;
    Ok(Json(dataset.summary()))
}

#[derive(Debug, Deserialize)]
pub struct HistogramQuery {
    pub feature: Option<String>,
    pub bins: Option<usize>,
}

pub async fn dataset_histogram(
    State(state): State<AppState>,
    query: Result<Query<HistogramQuery>, QueryRejection>,
) -> Result<Json<Histogram>, ApiError> {
    let Query(query) = query?;
    let dataset = state.shared_dataset().await?;

    let feature = match query.feature {
        Some(feature) => feature,
        None => first_feature(&dataset)?,
    };
    let bins = query.bins.unwrap_or(DEFAULT_HISTOGRAM_BINS);

    Ok(Json(dataset.histogram(&feature, bins)?))
}

/// First numeric column other than the outcome
fn first_feature(dataset: &Dataset) -> Result<String, ApiError> {
    dataset
        .numeric_columns()
        .into_iter()
        .find(|c| *c != dataset.outcome_column())
        .map(str::to_string)
        .ok_or_else(|| Error::invalid_input("dataset has no numeric feature columns").into())
}

pub async fn training(State(state): State<AppState>) -> Json<TrainingView> {
    let availability = state.shared_model().await;
    Json(TrainingView::new(availability.model().map(Arc::as_ref)))
}

// ============================================================================
// Statistics
// ============================================================================

pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let snapshot = state.telemetry.snapshot();
    Json(serde_json::json!({
        "model_loaded": state.models.is_loaded(),
        "model_load_attempts": state.models.load_attempts(),
        "avg_latency_us": snapshot.avg_latency_us(),
        "cataract_rate": snapshot.cataract_rate(),
        "errors": snapshot.error_count(),
        "counters": snapshot,
    }))
}

pub async fn prometheus_metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics_handle.render(),
    )
}
