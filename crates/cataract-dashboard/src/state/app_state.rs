use cataract_classifiers::{ModelAvailability, ModelCache};
use cataract_core::{Error, Result};
use cataract_telemetry::MetricsCollector;
use metrics_exporter_prometheus::PrometheusHandle;
use std::sync::Arc;
use tracing::info;

use crate::config::DashboardConfig;
use crate::dataset::{Dataset, DatasetCache};

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<DashboardConfig>,

    /// Process-wide read-only classifier, loaded on first use
    pub models: Arc<ModelCache>,

    /// Preview dataset, loaded on first use
    pub dataset: Arc<DatasetCache>,

    /// In-process prediction counters for `/api/stats`
    pub telemetry: MetricsCollector,

    /// Prometheus handle for rendering `/metrics`
    pub metrics_handle: PrometheusHandle,
}

impl AppState {
    pub fn new(config: DashboardConfig, metrics_handle: PrometheusHandle) -> Self {
        let models = Arc::new(config.model.cache());
        let dataset = Arc::new(DatasetCache::new(
            config.dataset.path.clone(),
            config.dataset.outcome_column.clone(),
        ));

        Self {
            config: Arc::new(config),
            models,
            dataset,
            telemetry: MetricsCollector::new(),
            metrics_handle,
        }
    }

    /// Cached model, loading it when this is the first use
    ///
    /// Blocks on the artifact read; async handlers use [`AppState::shared_model`].
    pub fn model(&self) -> ModelAvailability {
        let (availability, loaded) = self.models.get_or_load_tracked();
        if loaded {
            self.telemetry.record_model_load(availability.is_available());
        }
        availability
    }

    /// Drop the cached model and load the artifact again
    pub fn reload_model(&self) -> ModelAvailability {
        info!("Reloading model from {}", self.models.path().display());
        let availability = self.models.reload();
        self.telemetry.record_model_load(availability.is_available());
        availability
    }

    /// Cached model; a first-use load runs on the blocking pool
    pub async fn shared_model(&self) -> ModelAvailability {
        if let Some(model) = self.models.cached() {
            return ModelAvailability::Available(model);
        }
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.model())
            .await
            .unwrap_or_else(|e| ModelAvailability::Unavailable {
                reason: format!("model load task failed: {}", e),
            })
    }

    /// Reload the model on the blocking pool
    pub async fn reloaded_model(&self) -> ModelAvailability {
        let state = self.clone();
        tokio::task::spawn_blocking(move || state.reload_model())
            .await
            .unwrap_or_else(|e| ModelAvailability::Unavailable {
                reason: format!("model reload task failed: {}", e),
            })
    }

    /// Cached dataset; a first-use read runs on the blocking pool
    pub async fn shared_dataset(&self) -> Result<Arc<Dataset>> {
        if let Some(dataset) = self.dataset.cached() {
            return Ok(dataset);
        }
        let cache = Arc::clone(&self.dataset);
        tokio::task::spawn_blocking(move || cache.get_or_load())
            .await
            .map_err(|e| Error::dataset(format!("dataset load task failed: {}", e)))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatasetConfig;
    use cataract_classifiers::ModelConfig;
    use metrics_exporter_prometheus::PrometheusBuilder;
    use std::path::Path;

    fn reference_state() -> AppState {
        let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("../..");
        let config = DashboardConfig {
            model: ModelConfig::from_local(root.join("models/cataract_model.json")),
            dataset: DatasetConfig {
                path: root.join("data/cataract_sample.csv"),
                outcome_column: "cataract".to_string(),
            },
            ..Default::default()
        };
        AppState::new(config, PrometheusBuilder::new().build_recorder().handle())
    }

    #[test]
    fn test_concurrent_first_use_records_one_load() {
        let state = reference_state();

        std::thread::scope(|scope| {
            for _ in 0..8 {
                scope.spawn(|| assert!(state.model().is_available()));
            }
        });

        assert_eq!(state.models.load_attempts(), 1);
        assert_eq!(state.telemetry.snapshot().model_loads, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_shared_model_loads_once_across_tasks() {
        let state = reference_state();

        let tasks: Vec<_> = (0..8)
            .map(|_| {
                let state = state.clone();
                tokio::spawn(async move { state.shared_model().await.is_available() })
            })
            .collect();
        for task in tasks {
            assert!(task.await.unwrap());
        }

        assert_eq!(state.models.load_attempts(), 1);
        assert_eq!(state.telemetry.snapshot().model_loads, 1);
    }

    #[tokio::test]
    async fn test_shared_dataset_is_cached() {
        let state = reference_state();
        let first = state.shared_dataset().await.unwrap();
        let second = state.shared_dataset().await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_reloaded_model_counts_each_load() {
        let state = reference_state();
        assert!(state.shared_model().await.is_available());
        assert!(state.reloaded_model().await.is_available());
        assert_eq!(state.models.load_attempts(), 2);
        assert_eq!(state.telemetry.snapshot().model_loads, 2);
    }
}
