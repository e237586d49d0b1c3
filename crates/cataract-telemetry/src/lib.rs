//! Cataract Screen Telemetry
//!
//! In-process prediction counters for the dashboard.
//!
//! Every recorded event is also forwarded to the `metrics` facade, so an
//! installed exporter (Prometheus in the dashboard) sees the same numbers
//! that [`MetricsCollector::snapshot`] reports.

pub mod metrics;

pub use metrics::{MetricsCollector, MetricsSnapshot, Outcome};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::metrics::{MetricsCollector, MetricsSnapshot, Outcome};
}
