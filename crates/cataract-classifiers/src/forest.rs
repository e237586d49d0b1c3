//! Tree ensemble classifier (random forest and single decision tree)
//!
//! Trees are stored as flat node arrays. A split sends a sample to `left`
//! when `x[feature] <= threshold` and to `right` otherwise; a leaf holds a
//! class weight vector that is normalized into probabilities. Forest
//! probabilities are the mean of the per-tree leaf probabilities.

use cataract_core::{Error, FeatureVector, Label, ProbabilityVector, Result};
use serde::{Deserialize, Serialize};

use crate::classifier::Classifier;

/// A node of a decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: Vec<f64>,
    },
}

/// A single decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Structural validation against the expected feature and class counts
    ///
    /// Child indices must be strictly greater than their parent's index, which
    /// rules out cycles and guarantees traversal terminates. Every node other
    /// than the root has exactly one parent, so the nodes form a tree.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::unavailable("tree has no nodes"));
        }

        let mut has_parent = vec![false; self.nodes.len()];

        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(Error::unavailable(format!(
                            "node {} splits on feature {} but the schema has {} columns",
                            index, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(Error::unavailable(format!(
                            "node {} has a non-finite threshold",
                            index
                        )));
                    }
                    if left == right {
                        return Err(Error::unavailable(format!(
                            "node {} uses node {} as both children",
                            index, left
                        )));
                    }
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(Error::unavailable(format!(
                                "node {} has invalid child index {}",
                                index, child
                            )));
                        }
                        if std::mem::replace(&mut has_parent[child], true) {
                            return Err(Error::unavailable(format!(
                                "node {} is shared by more than one parent",
                                child
                            )));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != n_classes {
                        return Err(Error::unavailable(format!(
                            "leaf {} has {} class weights, expected {}",
                            index,
                            value.len(),
                            n_classes
                        )));
                    }
                    if value.iter().any(|w| !w.is_finite() || *w < 0.0) {
                        return Err(Error::unavailable(format!(
                            "leaf {} has a negative or non-finite weight",
                            index
                        )));
                    }
                    if value.iter().sum::<f64>() <= 0.0 {
                        return Err(Error::unavailable(format!("leaf {} has zero weight", index)));
                    }
                }
            }
        }

        Ok(())
    }

    /// Normalized class distribution of the leaf reached by `x`
    pub fn leaf_probabilities(&self, x: &[f64]) -> Result<Vec<f64>> {
        let mut index = 0;
        loop {
            match self.nodes.get(index) {
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let value = x.get(*feature).ok_or_else(|| {
                        Error::inference(format!("feature {} missing from input", feature))
                    })?;
                    index = if *value <= *threshold { *left } else { *right };
                }
                Some(TreeNode::Leaf { value }) => {
                    let total: f64 = value.iter().sum();
                    return Ok(value.iter().map(|w| w / total).collect());
                }
                None => {
                    return Err(Error::inference(format!("node {} does not exist", index)));
                }
            }
        }
    }

    /// Longest root-to-leaf path, counted in splits
    ///
    /// Children always follow their parent, so one pass from the back sees
    /// both child depths before the parent.
    pub fn depth(&self) -> usize {
        let mut depths = vec![0usize; self.nodes.len()];
        for index in (0..self.nodes.len()).rev() {
            if let TreeNode::Split { left, right, .. } = &self.nodes[index] {
                let left = depths.get(*left).copied().unwrap_or(0);
                let right = depths.get(*right).copied().unwrap_or(0);
                depths[index] = 1 + left.max(right);
            }
        }
        depths.first().copied().unwrap_or(0)
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, TreeNode::Leaf { .. }))
            .count()
    }
}

/// Kind of tree model stored in an artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnsembleKind {
    RandomForest,
    DecisionTree,
}

impl EnsembleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RandomForest => "random_forest",
            Self::DecisionTree => "decision_tree",
        }
    }
}

/// Serialized model section of an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnsembleSpec {
    #[serde(rename = "type")]
    pub kind: EnsembleKind,

    pub n_classes: usize,

    pub trees: Vec<DecisionTree>,
}

/// A validated tree ensemble ready for inference
#[derive(Debug, Clone)]
pub struct TreeEnsemble {
    name: String,
    kind: EnsembleKind,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl TreeEnsemble {
    /// Validate a serialized ensemble for a schema of `n_features` columns
    pub fn from_spec(name: impl Into<String>, spec: EnsembleSpec, n_features: usize) -> Result<Self> {
        if spec.n_classes != 2 {
            return Err(Error::unavailable(format!(
                "model has {} classes, only binary models are supported",
                spec.n_classes
            )));
        }
        if spec.trees.is_empty() {
            return Err(Error::unavailable("model has no trees"));
        }
        if spec.kind == EnsembleKind::DecisionTree && spec.trees.len() != 1 {
            return Err(Error::unavailable(format!(
                "decision_tree model must have exactly one tree, found {}",
                spec.trees.len()
            )));
        }

        for (index, tree) in spec.trees.iter().enumerate() {
            tree.validate(n_features, spec.n_classes).map_err(|e| match e {
                Error::ArtifactUnavailable(msg) => {
                    Error::unavailable(format!("tree {}: {}", index, msg))
                }
                other => other,
            })?;
        }

        Ok(Self {
            name: name.into(),
            kind: spec.kind,
            n_features,
            trees: spec.trees,
        })
    }

    pub fn kind(&self) -> EnsembleKind {
        self.kind
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn max_depth(&self) -> usize {
        self.trees.iter().map(DecisionTree::depth).max().unwrap_or(0)
    }

    fn check_width(&self, features: &FeatureVector) -> Result<()> {
        if features.len() != self.n_features {
            return Err(Error::inference(format!(
                "{} expects {} features, got {}",
                self.name,
                self.n_features,
                features.len()
            )));
        }
        Ok(())
    }
}

impl Classifier for TreeEnsemble {
    fn classify(&self, features: &FeatureVector) -> Result<Label> {
        Ok(self.classify_probabilities(features)?.argmax())
    }

    fn classify_probabilities(&self, features: &FeatureVector) -> Result<ProbabilityVector> {
        self.check_width(features)?;

        let x = features.as_slice();
        let mut sums = [0.0_f64; 2];
        for tree in &self.trees {
            let probs = tree.leaf_probabilities(x)?;
            for (sum, p) in sums.iter_mut().zip(probs) {
                *sum += p;
            }
        }

        let n = self.trees.len() as f64;
        ProbabilityVector::new(&[sums[0] / n, sums[1] / n])
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}
