//! Random forest: bootstrap-bagged randomized regression trees
//!
//! Trees are fit on 0/1 labels with variance-reduction splits (equivalent to
//! gini for binary targets); the forest probability is the mean of the tree
//! leaf means.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use super::tree::{RegressionTree, TreeParams};
use super::{ModelError, Result};
use crate::data::{Dataset, N_FEATURES};
use crate::search::ParamSet;

/// Hyperparameters for [`RandomForest`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForestParams {
    /// Number of bagged trees
    pub n_estimators: usize,
    /// Depth limit per tree
    pub max_depth: usize,
    /// Minimum samples to attempt a split
    pub min_samples_split: usize,
    /// Features per split, resolved from the `max_features` strategy
    pub features_per_split: usize,
    /// Seed for bootstrap sampling and feature subsets
    pub seed: u64,
}

impl ForestParams {
    /// Extract from a merged parameter set, with defaults for absent names
    ///
    /// `max_features` is categorical: `"sqrt"` or `"log2"` over the feature
    /// count; anything else is an error.
    pub fn from_param_set(params: &ParamSet) -> Result<Self> {
        let strategy = params.get_str("max_features", "sqrt")?;
        let features_per_split = match strategy {
            "sqrt" => (N_FEATURES as f64).sqrt().ceil() as usize,
            "log2" => ((N_FEATURES as f64).log2().floor() as usize).max(1),
            other => {
                return Err(ModelError::InvalidValue {
                    name: "max_features".to_string(),
                    value: other.to_string(),
                })
            }
        };

        Ok(Self {
            n_estimators: params.get_i64("n_estimators", 100)?.max(1) as usize,
            max_depth: params.get_i64("max_depth", 8)?.max(1) as usize,
            min_samples_split: params.get_i64("min_samples_split", 2)?.max(2) as usize,
            features_per_split,
            seed: params.get_i64("seed", 42)? as u64,
        })
    }
}

/// A trained random forest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fit `n_estimators` trees, each on a bootstrap resample
    #[must_use]
    pub fn fit(params: &ForestParams, train: &Dataset) -> Self {
        let n = train.len();
        let targets: Vec<f64> = train.labels.iter().map(|&y| f64::from(y)).collect();
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_samples_split: params.min_samples_split,
            max_features: Some(params.features_per_split),
        };

        let mut trees = Vec::with_capacity(params.n_estimators);
        for t in 0..params.n_estimators {
            let mut rng = StdRng::seed_from_u64(params.seed.wrapping_add(t as u64));
            let indices: Vec<usize> = if n == 0 {
                Vec::new()
            } else {
                (0..n).map(|_| rng.gen_range(0..n)).collect()
            };
            trees.push(RegressionTree::fit(
                &train.features,
                &targets,
                None,
                &indices,
                &tree_params,
                &mut rng,
            ));
        }

        Self { trees }
    }

    /// Mean tree prediction, clamped to a probability
    #[must_use]
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        if self.trees.is_empty() {
            return 0.5;
        }
        let sum: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        (sum / self.trees.len() as f64).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::accuracy;
    use crate::search::ParamValue;

    fn default_params() -> ForestParams {
        ForestParams {
            n_estimators: 25,
            max_depth: 6,
            min_samples_split: 2,
            features_per_split: 2,
            seed: 42,
        }
    }

    #[test]
    fn test_forest_learns_signal() {
        let data = Dataset::synthetic(400, 42);
        let (train, test) = data.train_test_split(0.2, 42);

        let model = RandomForest::fit(&default_params(), &train);
        let preds: Vec<u8> = (0..test.len())
            .map(|i| u8::from(model.predict_proba(&test.sample(i)) >= 0.5))
            .collect();
        let acc = accuracy(&preds, &test.labels);
        assert!(acc > 0.7, "held-out accuracy too low: {acc}");
    }

    #[test]
    fn test_fit_is_deterministic_in_seed() {
        let data = Dataset::synthetic(150, 42);
        let a = RandomForest::fit(&default_params(), &data);
        let b = RandomForest::fit(&default_params(), &data);

        for i in 0..data.len() {
            let x = data.sample(i);
            assert_eq!(a.predict_proba(&x), b.predict_proba(&x));
        }
    }

    #[test]
    fn test_tree_count_matches_n_estimators() {
        let data = Dataset::synthetic(60, 42);
        let params = ForestParams {
            n_estimators: 7,
            ..default_params()
        };
        let model = RandomForest::fit(&params, &data);
        assert_eq!(model.trees.len(), 7);
    }

    #[test]
    fn test_max_features_strategies() {
        let mut set = ParamSet::new();
        set.set("max_features", ParamValue::Str("sqrt".into()));
        assert_eq!(ForestParams::from_param_set(&set).unwrap().features_per_split, 2);

        set.set("max_features", ParamValue::Str("log2".into()));
        assert_eq!(ForestParams::from_param_set(&set).unwrap().features_per_split, 1);
    }

    #[test]
    fn test_unknown_max_features_is_error() {
        let mut set = ParamSet::new();
        set.set("max_features", ParamValue::Str("all".into()));
        let err = ForestParams::from_param_set(&set).unwrap_err();
        assert!(err.to_string().contains("max_features"));
    }

    #[test]
    fn test_proba_in_unit_interval() {
        let data = Dataset::synthetic(100, 42);
        let model = RandomForest::fit(&default_params(), &data);
        for i in 0..data.len() {
            let p = model.predict_proba(&data.sample(i));
            assert!((0.0..=1.0).contains(&p));
        }
    }
}
