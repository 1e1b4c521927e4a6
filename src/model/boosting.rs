//! Gradient boosting on the logistic loss
//!
//! Shallow regression trees fit to the current residuals, with Newton-step
//! leaf values (`sum(residual) / sum(p * (1 - p))`). Scores accumulate in
//! log-odds space; probabilities come out through the sigmoid.

use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use super::{sigmoid, Result};
use crate::data::{Dataset, N_FEATURES};
use crate::search::ParamSet;

/// Hyperparameters for [`GradientBoosting`]
#[derive(Debug, Clone, PartialEq)]
pub struct BoostingParams {
    /// Number of boosting stages
    pub n_estimators: usize,
    /// Shrinkage applied to every stage
    pub learning_rate: f64,
    /// Depth limit per stage tree
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
}

impl BoostingParams {
    /// Extract from a merged parameter set, with defaults for absent names
    pub fn from_param_set(params: &ParamSet) -> Result<Self> {
        Ok(Self {
            n_estimators: params.get_i64("n_estimators", 100)?.max(1) as usize,
            learning_rate: params.get_f64("learning_rate", 0.1)?,
            max_depth: params.get_i64("max_depth", 3)?.max(1) as usize,
            min_samples_split: params.get_i64("min_samples_split", 2)?.max(2) as usize,
        })
    }
}

/// A trained gradient-boosted classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoosting {
    init_score: f64,
    learning_rate: f64,
    trees: Vec<RegressionTree>,
}

impl GradientBoosting {
    /// Fit `n_estimators` sequential stages
    #[must_use]
    pub fn fit(params: &BoostingParams, train: &Dataset) -> Self {
        let n = train.len();
        if n == 0 {
            return Self {
                init_score: 0.0,
                learning_rate: params.learning_rate,
                trees: Vec::new(),
            };
        }

        // Base score: log-odds of the positive-class prior
        let pos = train.labels.iter().filter(|&&y| y == 1).count() as f64;
        let prior = (pos / n as f64).clamp(1e-6, 1.0 - 1e-6);
        let init_score = (prior / (1.0 - prior)).ln();

        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: None,
        };
        let indices: Vec<usize> = (0..n).collect();
        // Boosting trees use all features; the rng only feeds the (unused)
        // feature-subset path
        let mut rng = StdRng::seed_from_u64(0);

        let mut scores = vec![init_score; n];
        let mut trees = Vec::with_capacity(params.n_estimators);

        for _ in 0..params.n_estimators {
            let mut residuals = Vec::with_capacity(n);
            let mut hessians = Vec::with_capacity(n);
            for i in 0..n {
                let p = sigmoid(scores[i]);
                residuals.push(f64::from(train.labels[i]) - p);
                hessians.push(p * (1.0 - p));
            }

            let tree = RegressionTree::fit(
                &train.features,
                &residuals,
                Some(&hessians),
                &indices,
                &tree_params,
                &mut rng,
            );

            for (i, score) in scores.iter_mut().enumerate() {
                *score += params.learning_rate * tree.predict(&train.sample(i));
            }
            trees.push(tree);
        }

        Self {
            init_score,
            learning_rate: params.learning_rate,
            trees,
        }
    }

    /// Probability of the positive class
    #[must_use]
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        let mut score = self.init_score;
        for tree in &self.trees {
            score += self.learning_rate * tree.predict(x);
        }
        sigmoid(score)
    }
}
