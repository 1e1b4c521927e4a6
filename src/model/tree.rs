//! Regression trees shared by the forest and boosting ensembles
//!
//! A single CART-style tree fit by variance reduction. On 0/1 targets this
//! is equivalent to gini-impurity splitting, so the random forest reuses it
//! directly; gradient boosting fits it to residuals and supplies hessians
//! for Newton-step leaf values.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::data::N_FEATURES;

/// Structural hyperparameters for a single tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeParams {
    /// Maximum tree depth; the root is at depth 0
    pub max_depth: usize,
    /// Minimum samples required to attempt a split
    pub min_samples_split: usize,
    /// Features considered per split; `None` means all
    pub max_features: Option<usize>,
}

/// One tree node: an interior split or a leaf value
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// A fitted regression tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegressionTree {
    root: TreeNode,
}

impl RegressionTree {
    /// Fit on the rows of `features` indexed by `indices`
    ///
    /// When `hessians` is given, leaf values are the Newton step
    /// `sum(targets) / sum(hessians)` over the leaf's rows; otherwise the
    /// plain target mean.
    #[must_use]
    pub fn fit(
        features: &Array2<f64>,
        targets: &[f64],
        hessians: Option<&[f64]>,
        indices: &[usize],
        params: &TreeParams,
        rng: &mut StdRng,
    ) -> Self {
        let root = build_node(features, targets, hessians, indices, params, 0, rng);
        Self { root }
    }

    /// Predicted value for one sample
    #[must_use]
    pub fn predict(&self, x: &[f64; N_FEATURES]) -> f64 {
        let mut node = &self.root;
        loop {
            match node {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    node = if x[*feature] <= *threshold { left } else { right };
                }
            }
        }
    }
}

fn leaf_value(targets: &[f64], hessians: Option<&[f64]>, indices: &[usize]) -> f64 {
    if indices.is_empty() {
        return 0.0;
    }
    let target_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    match hessians {
        Some(h) => {
            let hess_sum: f64 = indices.iter().map(|&i| h[i]).sum();
            // Guard against a vanishing hessian on a pure-probability leaf
            target_sum / hess_sum.max(1e-10)
        }
        None => target_sum / indices.len() as f64,
    }
}

fn build_node(
    features: &Array2<f64>,
    targets: &[f64],
    hessians: Option<&[f64]>,
    indices: &[usize],
    params: &TreeParams,
    depth: usize,
    rng: &mut StdRng,
) -> TreeNode {
    let make_leaf = || TreeNode::Leaf {
        value: leaf_value(targets, hessians, indices),
    };

    if depth >= params.max_depth || indices.len() < params.min_samples_split {
        return make_leaf();
    }

    let Some((feature, threshold)) = best_split(features, targets, indices, params, rng) else {
        return make_leaf();
    };

    let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .copied()
        .partition(|&i| features[[i, feature]] <= threshold);

    if left_idx.is_empty() || right_idx.is_empty() {
        return make_leaf();
    }

    TreeNode::Split {
        feature,
        threshold,
        left: Box::new(build_node(
            features, targets, hessians, &left_idx, params, depth + 1, rng,
        )),
        right: Box::new(build_node(
            features, targets, hessians, &right_idx, params, depth + 1, rng,
        )),
    }
}

/// Pick the (feature, threshold) with the largest variance reduction
///
/// Returns `None` when no split improves on the parent node.
fn best_split(
    features: &Array2<f64>,
    targets: &[f64],
    indices: &[usize],
    params: &TreeParams,
    rng: &mut StdRng,
) -> Option<(usize, f64)> {
    if indices.len() < 2 {
        return None;
    }
    let candidates = candidate_features(params.max_features, rng);

    let n = indices.len() as f64;
    let total_sum: f64 = indices.iter().map(|&i| targets[i]).sum();
    let total_sq: f64 = indices.iter().map(|&i| targets[i] * targets[i]).sum();
    let parent_sse = total_sq - total_sum * total_sum / n;

    let mut best: Option<(usize, f64, f64)> = None;

    for feature in candidates {
        let mut sorted: Vec<(f64, f64)> = indices
            .iter()
            .map(|&i| (features[[i, feature]], targets[i]))
            .collect();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut left_sum = 0.0;
        let mut left_sq = 0.0;
        for (k, &(value, target)) in sorted.iter().enumerate().take(sorted.len() - 1) {
            left_sum += target;
            left_sq += target * target;

            // Only split between distinct feature values
            if value == sorted[k + 1].0 {
                continue;
            }

            let left_n = (k + 1) as f64;
            let right_n = n - left_n;
            let right_sum = total_sum - left_sum;
            let right_sq = total_sq - left_sq;

            let left_sse = left_sq - left_sum * left_sum / left_n;
            let right_sse = right_sq - right_sum * right_sum / right_n;
            let gain = parent_sse - left_sse - right_sse;

            let improves = match best {
                Some((_, _, best_gain)) => gain > best_gain,
                None => gain > 1e-12,
            };
            if improves {
                let threshold = (value + sorted[k + 1].0) / 2.0;
                best = Some((feature, threshold, gain));
            }
        }
    }

    best.map(|(feature, threshold, _)| (feature, threshold))
}

/// The feature indices to consider at one split
fn candidate_features(max_features: Option<usize>, rng: &mut StdRng) -> Vec<usize> {
    match max_features {
        None => (0..N_FEATURES).collect(),
        Some(k) if k >= N_FEATURES => (0..N_FEATURES).collect(),
        Some(k) => {
            // Partial Fisher-Yates over the feature indices
            let mut all: Vec<usize> = (0..N_FEATURES).collect();
            for i in 0..k {
                let j = rng.gen_range(i..N_FEATURES);
                all.swap(i, j);
            }
            all.truncate(k.max(1));
            all
        }
    }
}
