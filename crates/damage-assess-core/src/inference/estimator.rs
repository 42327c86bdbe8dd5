//! Portable classical estimators evaluated in pure Rust.
//!
//! The JSON shapes mirror what a scikit-learn model exports: logistic
//! regression coefficients, decision trees as flat node arrays, gradient
//! boosting stages, and a soft-voting wrapper.

use serde::{Deserialize, Serialize};

/// Per-feature standardisation: `(x - mean) / scale`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    /// Per-feature mean.
    pub mean: Vec<f64>,
    /// Per-feature scale; zero is treated as one.
    pub scale: Vec<f64>,
}

impl StandardScaler {
    /// Number of features the scaler expects.
    #[must_use]
    pub fn n_features(&self) -> usize {
        self.mean.len()
    }

    /// Standardises a feature vector.
    #[must_use]
    pub fn transform(&self, x: &[f64]) -> Vec<f64> {
        x.iter()
            .zip(self.mean.iter().zip(&self.scale))
            .map(|(v, (m, s))| if *s == 0.0 { v - m } else { (v - m) / s })
            .collect()
    }
}

/// One node of a flattened binary decision tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    /// Go to `left` when `x[feature] <= threshold`, else `right`.
    Split {
        /// Feature index.
        feature: usize,
        /// Split threshold.
        threshold: f64,
        /// Index of the left child.
        left: usize,
        /// Index of the right child.
        right: usize,
    },
    /// Terminal node carrying class weights (classification) or one value (regression).
    Leaf {
        /// Leaf output.
        value: Vec<f64>,
    },
}

/// Decision tree stored as a node array rooted at index 0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Nodes; children are referenced by index.
    pub nodes: Vec<TreeNode>,
}

impl DecisionTree {
    /// Walks the tree and returns the reached leaf's value.
    ///
    /// Returns an empty slice for malformed trees (dangling index or cycle).
    #[must_use]
    pub fn leaf(&self, x: &[f64]) -> &[f64] {
        let mut index = 0;
        // A well-formed tree reaches a leaf in fewer steps than it has nodes
        for _ in 0..self.nodes.len() {
            match self.nodes.get(index) {
                Some(TreeNode::Leaf { value }) => return value,
                Some(TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                }) => {
                    let v = x.get(*feature).copied().unwrap_or(0.0);
                    index = if v <= *threshold { *left } else { *right };
                }
                None => break,
            }
        }
        &[]
    }

    fn max_feature(&self) -> Option<usize> {
        self.nodes
            .iter()
            .filter_map(|n| match n {
                TreeNode::Split { feature, .. } => Some(*feature),
                TreeNode::Leaf { .. } => None,
            })
            .max()
    }

    fn leaf_width(&self) -> Option<usize> {
        self.nodes.iter().find_map(|n| match n {
            TreeNode::Leaf { value } => Some(value.len()),
            TreeNode::Split { .. } => None,
        })
    }

    fn validate(&self, n_features: usize, leaf_width: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("decision tree has no nodes".into());
        }
        for node in &self.nodes {
            match node {
                TreeNode::Split {
                    feature,
                    left,
                    right,
                    ..
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "tree splits on feature {feature} but only {n_features} exist"
                        ));
                    }
                    if *left >= self.nodes.len() || *right >= self.nodes.len() {
                        return Err("tree child index out of range".into());
                    }
                }
                TreeNode::Leaf { value } => {
                    if value.len() != leaf_width {
                        return Err(format!(
                            "tree leaf has {} values, expected {leaf_width}",
                            value.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Multinomial (or binary) logistic regression.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    /// Coefficients, one row per class (a single row for binary models).
    pub coef: Vec<Vec<f64>>,
    /// Intercepts, one per row of `coef`.
    pub intercept: Vec<f64>,
}

/// Averages the class-probability leaves of its trees.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    /// Member trees; leaves hold per-class counts or proportions.
    pub trees: Vec<DecisionTree>,
}

/// Additive regression trees with a softmax (or sigmoid) link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradientBoosting {
    /// Initial raw score per class (a single value for binary models).
    pub init: Vec<f64>,
    /// Shrinkage applied to every tree.
    pub learning_rate: f64,
    /// Boosting stages; each holds one regression tree per raw score.
    pub stages: Vec<Vec<DecisionTree>>,
}

/// Any supported estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Estimator {
    /// Logistic regression.
    LogisticRegression(LogisticRegression),
    /// Random forest.
    RandomForest(RandomForest),
    /// Gradient boosting.
    GradientBoosting(GradientBoosting),
}

impl Estimator {
    /// Number of classes the estimator scores.
    #[must_use]
    pub fn n_classes(&self) -> usize {
        match self {
            Self::LogisticRegression(m) => binary_widened(m.coef.len()),
            Self::RandomForest(m) => m
                .trees
                .first()
                .and_then(DecisionTree::leaf_width)
                .unwrap_or(0),
            Self::GradientBoosting(m) => binary_widened(m.init.len()),
        }
    }

    /// Checks internal consistency against the expected feature and class counts.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.n_classes() != n_classes {
            return Err(format!(
                "{} scores {} classes but the label set has {n_classes}",
                self.name(),
                self.n_classes()
            ));
        }
        match self {
            Self::LogisticRegression(m) => {
                if m.coef.is_empty() || m.coef.len() != m.intercept.len() {
                    return Err("logistic regression coef/intercept shape mismatch".into());
                }
                if let Some(row) = m.coef.iter().find(|r| r.len() != n_features) {
                    return Err(format!(
                        "logistic regression expects {} features, scaler has {n_features}",
                        row.len()
                    ));
                }
            }
            Self::RandomForest(m) => {
                if m.trees.is_empty() {
                    return Err("random forest has no trees".into());
                }
                for tree in &m.trees {
                    tree.validate(n_features, n_classes)?;
                }
            }
            Self::GradientBoosting(m) => {
                for stage in &m.stages {
                    if stage.len() != m.init.len() {
                        return Err("gradient boosting stage width mismatch".into());
                    }
                    for tree in stage {
                        tree.validate(n_features, 1)?;
                    }
                }
            }
        }
        Ok(())
    }

    /// Short estimator name for logs.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::LogisticRegression(_) => "logistic_regression",
            Self::RandomForest(_) => "random_forest",
            Self::GradientBoosting(_) => "gradient_boosting",
        }
    }

    /// Class probabilities for one standardised feature vector. Sums to 1.
    #[must_use]
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        match self {
            Self::LogisticRegression(m) => {
                let raw: Vec<f64> = m
                    .coef
                    .iter()
                    .zip(&m.intercept)
                    .map(|(row, b)| dot(row, x) + b)
                    .collect();
                link(&raw)
            }
            Self::RandomForest(m) => {
                let width = self.n_classes();
                let mut sum = vec![0.0; width];
                for tree in &m.trees {
                    let leaf = tree.leaf(x);
                    let total: f64 = leaf.iter().sum();
                    if total > 0.0 {
                        for (s, v) in sum.iter_mut().zip(leaf) {
                            *s += v / total;
                        }
                    }
                }
                normalize(sum)
            }
            Self::GradientBoosting(m) => {
                let mut raw = m.init.clone();
                for stage in &m.stages {
                    for (score, tree) in raw.iter_mut().zip(stage) {
                        *score += m.learning_rate * tree.leaf(x).first().copied().unwrap_or(0.0);
                    }
                }
                link(&raw)
            }
        }
    }
}

/// Soft-voting ensemble: (weighted) mean of member probabilities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingEnsemble {
    /// Member estimators.
    pub estimators: Vec<Estimator>,
    /// Optional per-member weights; equal weights when absent.
    #[serde(default)]
    pub weights: Option<Vec<f64>>,
}

impl VotingEnsemble {
    /// Checks every member against the expected feature and class counts.
    ///
    /// # Errors
    ///
    /// Returns a description of the first inconsistency found.
    pub fn validate(&self, n_features: usize, n_classes: usize) -> Result<(), String> {
        if self.estimators.is_empty() {
            return Err("voting ensemble has no estimators".into());
        }
        if let Some(weights) = &self.weights {
            if weights.len() != self.estimators.len() {
                return Err(format!(
                    "{} weights for {} estimators",
                    weights.len(),
                    self.estimators.len()
                ));
            }
            if weights.iter().any(|w| !w.is_finite() || *w < 0.0) || weights.iter().sum::<f64>() <= 0.0
            {
                return Err("voting weights must be non-negative with a positive sum".into());
            }
        }
        self.estimators
            .iter()
            .try_for_each(|e| e.validate(n_features, n_classes))
    }

    /// Weighted mean of member class probabilities.
    #[must_use]
    pub fn predict_proba(&self, x: &[f64]) -> Vec<f64> {
        let width = self.estimators.first().map_or(0, Estimator::n_classes);
        let mut sum = vec![0.0; width];
        for (i, estimator) in self.estimators.iter().enumerate() {
            let w = self
                .weights
                .as_ref()
                .and_then(|ws| ws.get(i).copied())
                .unwrap_or(1.0);
            for (s, p) in sum.iter_mut().zip(estimator.predict_proba(x)) {
                *s += w * p;
            }
        }
        normalize(sum)
    }
}

const fn binary_widened(rows: usize) -> usize {
    if rows == 1 {
        2
    } else {
        rows
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Sigmoid for a single raw score, softmax otherwise.
fn link(raw: &[f64]) -> Vec<f64> {
    if let [score] = raw {
        let p = 1.0 / (1.0 + (-score).exp());
        return vec![1.0 - p, p];
    }
    let max = raw.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exp: Vec<f64> = raw.iter().map(|r| (r - max).exp()).collect();
    normalize(exp)
}

#[allow(clippy::cast_precision_loss)]
fn normalize(mut v: Vec<f64>) -> Vec<f64> {
    let total: f64 = v.iter().sum();
    if total > 0.0 && total.is_finite() {
        v.iter_mut().for_each(|p| *p /= total);
    } else if !v.is_empty() {
        let uniform = 1.0 / v.len() as f64;
        v.iter_mut().for_each(|p| *p = uniform);
    }
    v
}
