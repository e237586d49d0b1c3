//! Model artifact loading and cache tests
//!
//! Uses the reference artifact shipped in `models/` and temporary copies of it
//! with targeted corruptions.

use cataract_classifiers::{load, predict, Classifier, EnsembleKind, ModelAvailability, ModelCache};
use cataract_core::{Label, PatientRecord, Sex, SlitlampResult, YesNo};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn reference_artifact() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../models/cataract_model.json")
}

fn reference_json() -> Value {
    let text = std::fs::read_to_string(reference_artifact()).unwrap();
    serde_json::from_str(&text).unwrap()
}

fn write_artifact(dir: &TempDir, value: &Value) -> PathBuf {
    let path = dir.path().join("model.json");
    std::fs::write(&path, serde_json::to_string_pretty(value).unwrap()).unwrap();
    path
}

fn assert_unavailable(availability: ModelAvailability, needle: &str) {
    match availability {
        ModelAvailability::Unavailable { reason } => {
            assert!(
                reason.contains(needle),
                "expected reason containing '{}', got '{}'",
                needle,
                reason
            );
        }
        ModelAvailability::Available(_) => panic!("Expected unavailable model"),
    }
}

fn example_record() -> PatientRecord {
    PatientRecord {
        age: 65,
        sex: Sex::Male,
        family_history: YesNo::No,
        lens_opacity: 5.0,
        acuity_decline: 5,
        light_sensitivity: 5,
        color_change: YesNo::No,
        double_vision: YesNo::No,
        intraocular_pressure: 18.0,
        slitlamp_result: SlitlampResult::Normal,
        visual_acuity: 0.5,
    }
}

#[test]
fn test_load_reference_artifact() {
    let model = load(reference_artifact()).into_result().unwrap();

    let metadata = model.metadata();
    assert_eq!(metadata.name, "cataract-random-forest");
    assert_eq!(metadata.kind, EnsembleKind::RandomForest);
    assert_eq!(metadata.n_trees, 3);
    assert_eq!(metadata.n_features, 11);
    assert_eq!(metadata.max_depth, 2);
    assert_eq!(model.n_features(), 11);
    assert!(model.training().is_some());

    let ranked = model.ranked_importances().unwrap();
    assert_eq!(ranked[0].0, "lens_opacity");
    assert_eq!(ranked.len(), 11);
}

#[test]
fn test_example_record_prediction() {
    let model = load(reference_artifact()).into_result().unwrap();

    let prediction = predict(&example_record(), &model).unwrap();
    assert_eq!(
        prediction.features.as_slice(),
        &[65.0, 0.0, 0.0, 5.0, 5.0, 5.0, 0.0, 0.0, 18.0, 1.0, 0.5]
    );

    // (22/30 + 12/26 + 15/25) / 3
    let expected = (22.0 / 30.0 + 12.0 / 26.0 + 15.0 / 25.0) / 3.0;
    assert!((prediction.probabilities.of(Label::Cataract) - expected).abs() < 1e-9);
    assert_eq!(prediction.label, Label::Cataract);
}

#[test]
fn test_healthy_and_severe_records() {
    let model = load(reference_artifact()).into_result().unwrap();

    let healthy = PatientRecord {
        age: 40,
        sex: Sex::Female,
        lens_opacity: 1.0,
        acuity_decline: 1,
        light_sensitivity: 2,
        intraocular_pressure: 15.0,
        visual_acuity: 1.0,
        ..example_record()
    };
    let prediction = predict(&healthy, &model).unwrap();
    assert_eq!(prediction.label, Label::NoCataract);
    assert!(prediction.confidence() > 0.9);

    let severe = PatientRecord {
        age: 75,
        lens_opacity: 9.0,
        color_change: YesNo::Yes,
        slitlamp_result: SlitlampResult::Abnormal,
        visual_acuity: 0.2,
        ..example_record()
    };
    let prediction = predict(&severe, &model).unwrap();
    assert_eq!(prediction.label, Label::Cataract);
    assert!(prediction.probabilities.of(Label::Cataract) > 0.9);
}

#[test]
fn test_visual_acuity_domain_edges() {
    let model = load(reference_artifact()).into_result().unwrap();

    for visual_acuity in [0.0, 1.0] {
        let record = PatientRecord {
            visual_acuity,
            ..example_record()
        };
        let prediction = predict(&record, &model).unwrap();
        assert!((prediction.probabilities.sum() - 1.0).abs() < 1e-6);
    }
}

#[test]
fn test_repeated_predictions_are_identical() {
    let model = load(reference_artifact()).into_result().unwrap();
    let record = example_record();

    let first = predict(&record, &model).unwrap();
    let second = predict(&record, &model).unwrap();
    assert_eq!(first.label, second.label);
    assert_eq!(
        first.probabilities.as_array().map(f64::to_bits),
        second.probabilities.as_array().map(f64::to_bits)
    );
    assert_eq!(first.features, second.features);
}

#[test]
fn test_missing_artifact_is_unavailable() {
    let dir = TempDir::new().unwrap();
    assert_unavailable(load(dir.path().join("absent.json")), "not found");
}

#[test]
fn test_unreadable_artifact_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    std::fs::write(&path, b"\x80\x04\x95joblib").unwrap();
    assert!(!load(&path).is_available());
}

#[test]
fn test_cyclic_tree_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut value = reference_json();
    value["model"]["trees"][0]["nodes"][1]["left"] = Value::from(0);
    assert_unavailable(load(write_artifact(&dir, &value)), "tree 0");
}

/// Single-tree artifact whose nodes come from `nodes`
fn decision_tree_artifact(nodes: Vec<Value>) -> Value {
    let mut value = reference_json();
    value["model"]["type"] = Value::from("decision_tree");
    value["model"]["trees"] = serde_json::json!([{ "nodes": nodes }]);
    value
}

fn split_node(threshold: f64, left: usize, right: usize) -> Value {
    serde_json::json!({
        "kind": "split", "feature": 3, "threshold": threshold, "left": left, "right": right
    })
}

fn leaf_node(no: f64, yes: f64) -> Value {
    serde_json::json!({ "kind": "leaf", "value": [no, yes] })
}

#[test]
fn test_very_deep_tree_loads() {
    let n_splits = 200_000;
    let mut nodes = Vec::with_capacity(2 * n_splits + 1);
    for i in 0..n_splits {
        nodes.push(split_node(-(i as f64), 2 * i + 1, 2 * i + 2));
        nodes.push(leaf_node(1.0, 0.0));
    }
    nodes.push(leaf_node(0.0, 1.0));

    let dir = TempDir::new().unwrap();
    let model = load(write_artifact(&dir, &decision_tree_artifact(nodes)))
        .into_result()
        .unwrap();
    assert_eq!(model.metadata().max_depth, n_splits);
    assert_eq!(model.metadata().n_trees, 1);

    // lens_opacity 5.0 passes every split to the last leaf
    let prediction = predict(&example_record(), &model).unwrap();
    assert_eq!(prediction.label, Label::Cataract);
}

#[test]
fn test_shared_child_tree_is_unavailable() {
    // Each split sends both branches to the next node
    let n_splits = 60;
    let mut nodes: Vec<Value> = (0..n_splits)
        .map(|i| split_node(i as f64, i + 1, i + 1))
        .collect();
    nodes.push(leaf_node(1.0, 1.0));

    let dir = TempDir::new().unwrap();
    let started = std::time::Instant::now();
    let availability = load(write_artifact(&dir, &decision_tree_artifact(nodes)));
    assert_unavailable(availability, "both children");
    assert!(started.elapsed() < std::time::Duration::from_secs(5));
}

#[test]
fn test_node_with_two_parents_is_unavailable() {
    let nodes = vec![
        split_node(1.0, 1, 2),
        split_node(2.0, 3, 4),
        split_node(3.0, 3, 5),
        leaf_node(1.0, 0.0),
        leaf_node(0.0, 1.0),
        leaf_node(1.0, 1.0),
    ];
    let dir = TempDir::new().unwrap();
    assert_unavailable(
        load(write_artifact(&dir, &decision_tree_artifact(nodes))),
        "more than one parent",
    );
}

#[test]
fn test_unknown_column_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut value = reference_json();
    value["schema"]["columns"][0]["name"] = Value::from("usia");
    assert_unavailable(load(write_artifact(&dir, &value)), "usia");
}

#[test]
fn test_incomplete_encoding_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut value = reference_json();
    value["encoding"]["tables"]
        .as_object_mut()
        .unwrap()
        .remove("slitlamp_result");
    assert_unavailable(load(write_artifact(&dir, &value)), "slitlamp_result");
}

#[test]
fn test_split_on_missing_feature_is_unavailable() {
    let dir = TempDir::new().unwrap();
    let mut value = reference_json();
    value["model"]["trees"][1]["nodes"][0]["feature"] = Value::from(11);
    assert_unavailable(load(write_artifact(&dir, &value)), "feature 11");
}

#[test]
fn test_cache_loads_once() {
    let cache = ModelCache::new(reference_artifact());
    assert!(!cache.is_loaded());

    let first = cache.get_or_load().into_result().unwrap();
    let second = cache.get_or_load().into_result().unwrap();
    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(cache.load_attempts(), 1);
}

#[test]
fn test_cache_concurrent_first_use_loads_once() {
    let cache = ModelCache::new(reference_artifact());

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                assert!(cache.get_or_load().is_available());
            });
        }
    });

    assert_eq!(cache.load_attempts(), 1);
}

#[test]
fn test_cache_reports_which_call_loaded() {
    let cache = ModelCache::new(reference_artifact());
    let loaded = std::sync::atomic::AtomicU64::new(0);

    std::thread::scope(|scope| {
        for _ in 0..8 {
            scope.spawn(|| {
                let (availability, did_load) = cache.get_or_load_tracked();
                assert!(availability.is_available());
                if did_load {
                    loaded.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
                }
            });
        }
    });

    assert_eq!(loaded.into_inner(), 1);
    assert_eq!(cache.load_attempts(), 1);
    assert!(!cache.get_or_load_tracked().1);
}

#[test]
fn test_cache_clear_and_pick_up_new_artifact() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("model.json");
    let cache = ModelCache::new(&path);

    assert!(!cache.get_or_load().is_available());

    std::fs::copy(reference_artifact(), &path).unwrap();
    assert!(cache.get_or_load().is_available());

    let mut value = reference_json();
    value["version"] = Value::from("2.0.0");
    write_artifact(&dir, &value);

    // Still the cached model until cleared
    let cached = cache.get_or_load().into_result().unwrap();
    assert_eq!(cached.metadata().version, "1.0.0");

    let reloaded = cache.reload().into_result().unwrap();
    assert_eq!(reloaded.metadata().version, "2.0.0");
}
