//! Training history shipped with a model artifact
//!
//! Reports are informational only. Nothing in this crate trains a model; the
//! report documents how the artifact was produced so the dashboard can show
//! it next to the dataset preview.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::BTreeMap;

/// Held-out evaluation scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationMetrics {
    pub accuracy: f64,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// How the artifact was trained and how it scored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingReport {
    /// Estimator family, e.g. "RandomForestClassifier"
    pub estimator: String,

    /// Hyperparameter grid that was searched
    #[serde(default)]
    pub search_grid: BTreeMap<String, Vec<Value>>,

    /// Parameters of the selected model
    #[serde(default)]
    pub best_params: BTreeMap<String, Value>,

    #[serde(default)]
    pub cv_folds: Option<u32>,

    #[serde(default)]
    pub scoring: Option<String>,

    pub metrics: EvaluationMetrics,
}

impl Default for TrainingReport {
    /// Report of the reference random forest
    fn default() -> Self {
        let search_grid = BTreeMap::from([
            ("n_estimators".to_string(), vec![json!(200), json!(300), json!(400), json!(500)]),
            (
                "max_depth".to_string(),
                vec![json!(15), json!(20), json!(25), json!(30), Value::Null],
            ),
            ("min_samples_split".to_string(), vec![json!(2), json!(4), json!(6), json!(8)]),
            ("min_samples_leaf".to_string(), vec![json!(1), json!(2), json!(3)]),
            ("criterion".to_string(), vec![json!("entropy"), json!("gini")]),
            ("max_features".to_string(), vec![json!("sqrt"), json!("log2"), Value::Null]),
            (
                "class_weight".to_string(),
                vec![json!("balanced"), json!("balanced_subsample")],
            ),
        ]);

        let best_params = BTreeMap::from([
            ("n_estimators".to_string(), json!(100)),
            ("max_depth".to_string(), json!(20)),
            ("min_samples_split".to_string(), json!(2)),
            ("criterion".to_string(), json!("entropy")),
            ("class_weight".to_string(), json!("balanced")),
        ]);

        Self {
            estimator: "RandomForestClassifier".to_string(),
            search_grid,
            best_params,
            cv_folds: Some(5),
            scoring: Some("accuracy".to_string()),
            metrics: EvaluationMetrics {
                accuracy: 0.95,
                precision: 1.0,
                recall: 0.963,
                f1: 1.0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_report() {
        let report = TrainingReport::default();
        assert_eq!(report.best_params["criterion"], json!("entropy"));
        assert_eq!(report.search_grid["n_estimators"].len(), 4);
        assert_eq!(report.metrics.accuracy, 0.95);
    }

    #[test]
    fn test_minimal_report_parses() {
        let json = r#"{
            "estimator": "DecisionTreeClassifier",
            "metrics": {"accuracy": 0.9, "precision": 0.88, "recall": 0.91, "f1": 0.89}
        }"#;
        let report: TrainingReport = serde_json::from_str(json).unwrap();
        assert!(report.search_grid.is_empty());
        assert_eq!(report.cv_folds, None);
    }
}
