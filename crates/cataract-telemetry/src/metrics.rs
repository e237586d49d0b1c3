//! Prediction metrics collection and reporting

use cataract_core::Label;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::trace;

/// Counter names exported through the `metrics` facade
pub mod names {
    pub const PREDICTIONS_TOTAL: &str = "cataract_predictions_total";
    pub const PREDICTION_ERRORS_TOTAL: &str = "cataract_prediction_errors_total";
    pub const PREDICTION_LATENCY_US: &str = "cataract_prediction_latency_us";
    pub const MODEL_LOADS_TOTAL: &str = "cataract_model_loads_total";
}

/// How a prediction request ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Predicted(Label),
    /// No model could be loaded; the pipeline was not invoked
    ModelUnavailable,
    /// Rejected before inference (out-of-domain value, unknown category)
    Rejected,
    Failed,
}

impl Outcome {
    fn as_str(&self) -> &'static str {
        match self {
            Self::Predicted(_) => "predicted",
            Self::ModelUnavailable => "model_unavailable",
            Self::Rejected => "rejected",
            Self::Failed => "failed",
        }
    }
}

/// Metrics collector for prediction traffic
///
/// Cheap to clone; all clones share the same counters.
#[derive(Clone)]
pub struct MetricsCollector {
    inner: Arc<MetricsInner>,
}

#[derive(Default)]
struct MetricsInner {
    total_requests: AtomicU64,
    predictions: AtomicU64,
    cataract_predictions: AtomicU64,
    model_unavailable: AtomicU64,
    rejected: AtomicU64,
    failures: AtomicU64,
    total_latency_us: AtomicU64,
    model_loads: AtomicU64,
}

impl MetricsCollector {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MetricsInner::default()),
        }
    }

    /// Record the outcome and latency of one prediction request
    pub fn record(&self, outcome: Outcome, latency: Duration) {
        let inner = &self.inner;
        let latency_us = latency.as_micros().min(u64::MAX as u128) as u64;

        inner.total_requests.fetch_add(1, Ordering::Relaxed);
        inner
            .total_latency_us
            .fetch_add(latency_us, Ordering::Relaxed);

        match outcome {
            Outcome::Predicted(label) => {
                inner.predictions.fetch_add(1, Ordering::Relaxed);
                if label == Label::Cataract {
                    inner.cataract_predictions.fetch_add(1, Ordering::Relaxed);
                }
                metrics::counter!(names::PREDICTIONS_TOTAL, "label" => label.name()).increment(1);
            }
            Outcome::ModelUnavailable => {
                inner.model_unavailable.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Rejected => {
                inner.rejected.fetch_add(1, Ordering::Relaxed);
            }
            Outcome::Failed => {
                inner.failures.fetch_add(1, Ordering::Relaxed);
            }
        }
        if !matches!(outcome, Outcome::Predicted(_)) {
            metrics::counter!(names::PREDICTION_ERRORS_TOTAL, "reason" => outcome.as_str())
                .increment(1);
        }

        metrics::histogram!(names::PREDICTION_LATENCY_US, "outcome" => outcome.as_str())
            .record(latency_us as f64);
        trace!(outcome = outcome.as_str(), latency_us, "recorded prediction");
    }

    /// Record a model load attempt
    pub fn record_model_load(&self, available: bool) {
        self.inner.model_loads.fetch_add(1, Ordering::Relaxed);
        let status = if available { "available" } else { "unavailable" };
        metrics::counter!(names::MODEL_LOADS_TOTAL, "status" => status).increment(1);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        let inner = &self.inner;
        MetricsSnapshot {
            total_requests: inner.total_requests.load(Ordering::Relaxed),
            predictions: inner.predictions.load(Ordering::Relaxed),
            cataract_predictions: inner.cataract_predictions.load(Ordering::Relaxed),
            model_unavailable: inner.model_unavailable.load(Ordering::Relaxed),
            rejected: inner.rejected.load(Ordering::Relaxed),
            failures: inner.failures.load(Ordering::Relaxed),
            total_latency_us: inner.total_latency_us.load(Ordering::Relaxed),
            model_loads: inner.model_loads.load(Ordering::Relaxed),
        }
    }
}

impl Default for MetricsCollector {
    fn default() -> Self {
        Self::new()
    }
}

/// Snapshot of current metrics
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricsSnapshot {
    pub total_requests: u64,
    pub predictions: u64,
    pub cataract_predictions: u64,
    pub model_unavailable: u64,
    pub rejected: u64,
    pub failures: u64,
    pub total_latency_us: u64,
    pub model_loads: u64,
}

impl MetricsSnapshot {
    /// Calculate average latency per request
    pub fn avg_latency_us(&self) -> u64 {
        if self.total_requests == 0 {
            0
        } else {
            self.total_latency_us / self.total_requests
        }
    }

    /// Share of successful predictions that came out positive
    pub fn cataract_rate(&self) -> f64 {
        if self.predictions == 0 {
            0.0
        } else {
            self.cataract_predictions as f64 / self.predictions as f64
        }
    }

    pub fn error_count(&self) -> u64 {
        self.model_unavailable + self.rejected + self.failures
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_collection() {
        let metrics = MetricsCollector::new();

        metrics.record(Outcome::Predicted(Label::Cataract), Duration::from_micros(300));
        metrics.record(Outcome::Predicted(Label::NoCataract), Duration::from_micros(100));
        metrics.record(Outcome::ModelUnavailable, Duration::from_micros(20));
        metrics.record(Outcome::Rejected, Duration::from_micros(10));
        metrics.record(Outcome::Failed, Duration::from_micros(10));

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.total_requests, 5);
        assert_eq!(snapshot.predictions, 2);
        assert_eq!(snapshot.cataract_predictions, 1);
        assert_eq!(snapshot.error_count(), 3);
        assert_eq!(snapshot.avg_latency_us(), 88);
        assert_eq!(snapshot.cataract_rate(), 0.5);
    }

    #[test]
    fn test_empty_snapshot() {
        let snapshot = MetricsCollector::default().snapshot();
        assert_eq!(snapshot.avg_latency_us(), 0);
        assert_eq!(snapshot.cataract_rate(), 0.0);
    }

    #[test]
    fn test_clones_share_counters() {
        let metrics = MetricsCollector::new();
        let clone = metrics.clone();

        clone.record_model_load(true);
        clone.record(Outcome::Predicted(Label::Cataract), Duration::ZERO);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.model_loads, 1);
        assert_eq!(snapshot.predictions, 1);
    }

    #[test]
    fn test_snapshot_serializes() {
        let metrics = MetricsCollector::new();
        metrics.record(Outcome::Rejected, Duration::from_micros(5));

        let value = serde_json::to_value(metrics.snapshot()).unwrap();
        assert_eq!(value["rejected"], 1);
        assert_eq!(value["total_requests"], 1);
    }
}
