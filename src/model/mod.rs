//! Classifier variants trained by the experiment runner
//!
//! Model kinds are a closed enum rather than a string dispatch: adding a
//! kind forces every match site to handle it, and an unsupported kind can
//! only enter the system at the config-parsing boundary (the `FromStr`
//! impl on [`ModelKind`]), where it fails with a descriptive error.
//!
//! - **`ModelKind`**: which estimator to construct
//! - **`Classifier`**: a trained estimator, serializable as the run artifact
//! - **`accuracy`**: the validation metric recorded for every run

mod boosting;
mod forest;
mod linear;
mod tree;

pub use boosting::{BoostingParams, GradientBoosting};
pub use forest::{ForestParams, RandomForest};
pub use linear::{LogRegParams, LogisticRegression};
pub use tree::{RegressionTree, TreeParams};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::data::{Dataset, N_FEATURES};
use crate::search::{ParamError, ParamSet};

/// Errors from model construction and training
#[derive(Debug, thiserror::Error)]
pub enum ModelError {
    #[error("Unsupported model kind: '{0}' (expected one of: logreg, random_forest, gradient_boosting)")]
    UnsupportedKind(String),

    #[error("Invalid hyperparameter value for '{name}': {value}")]
    InvalidValue { name: String, value: String },

    #[error(transparent)]
    Param(#[from] ParamError),
}

/// Result alias for model operations
pub type Result<T> = std::result::Result<T, ModelError>;

/// The supported estimator kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelKind {
    /// L2-regularized logistic regression, batch gradient descent
    LogReg,
    /// Bagged ensemble of randomized trees
    RandomForest,
    /// Logistic-loss gradient boosting over shallow trees
    GradientBoosting,
}

impl ModelKind {
    /// All supported kinds, in training order
    pub const ALL: [ModelKind; 3] = [
        ModelKind::LogReg,
        ModelKind::RandomForest,
        ModelKind::GradientBoosting,
    ];

    /// Stable string name, used in run params and export metadata
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            ModelKind::LogReg => "logreg",
            ModelKind::RandomForest => "random_forest",
            ModelKind::GradientBoosting => "gradient_boosting",
        }
    }
}

impl fmt::Display for ModelKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ModelKind {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "logreg" => Ok(ModelKind::LogReg),
            "random_forest" => Ok(ModelKind::RandomForest),
            "gradient_boosting" => Ok(ModelKind::GradientBoosting),
            other => Err(ModelError::UnsupportedKind(other.to_string())),
        }
    }
}

/// A trained classifier, one variant per [`ModelKind`]
///
/// Serializes to tagged JSON; this is the on-disk artifact format for both
/// the run store and the export directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Classifier {
    LogReg(LogisticRegression),
    RandomForest(RandomForest),
    GradientBoosting(GradientBoosting),
}

impl Classifier {
    /// Construct and fit an estimator of `kind` with the given parameters
    ///
    /// Parameters are extracted from the merged set with per-kind defaults;
    /// a type mismatch or invalid categorical value is an error.
    pub fn fit(kind: ModelKind, params: &ParamSet, train: &Dataset) -> Result<Self> {
        match kind {
            ModelKind::LogReg => {
                let p = LogRegParams::from_param_set(params)?;
                Ok(Classifier::LogReg(LogisticRegression::fit(&p, train)))
            }
            ModelKind::RandomForest => {
                let p = ForestParams::from_param_set(params)?;
                Ok(Classifier::RandomForest(RandomForest::fit(&p, train)))
            }
            ModelKind::GradientBoosting => {
                let p = BoostingParams::from_param_set(params)?;
                Ok(Classifier::GradientBoosting(GradientBoosting::fit(
                    &p, train,
                )))
            }
        }
    }

    /// The kind this classifier was trained as
    #[must_use]
    pub fn kind(&self) -> ModelKind {
        match self {
            Classifier::LogReg(_) => ModelKind::LogReg,
            Classifier::RandomForest(_) => ModelKind::RandomForest,
            Classifier::GradientBoosting(_) => ModelKind::GradientBoosting,
        }
    }

    /// Probability of the positive class, in [0, 1]
    #[must_use]
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        match self {
            Classifier::LogReg(m) => m.predict_proba(x),
            Classifier::RandomForest(m) => m.predict_proba(x),
            Classifier::GradientBoosting(m) => m.predict_proba(x),
        }
    }

    /// Hard class prediction at the 0.5 threshold
    #[must_use]
    pub fn predict(&self, x: &[f64; N_FEATURES]) -> u8 {
        u8::from(self.predict_proba(x) >= 0.5)
    }

    /// Predict every row of a dataset
    #[must_use]
    pub fn predict_all(&self, data: &Dataset) -> Vec<u8> {
        (0..data.len()).map(|i| self.predict(&data.sample(i))).collect()
    }
}

/// Fraction of predictions matching the targets, in [0, 1]
///
/// # Panics
///
/// Panics if the slices differ in length.
#[must_use]
pub fn accuracy(predictions: &[u8], targets: &[u8]) -> f64 {
    assert_eq!(
        predictions.len(),
        targets.len(),
        "Predictions and targets must have same length"
    );
    if predictions.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / predictions.len() as f64
}

/// Numerically clamped logistic function
pub(crate) fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z.clamp(-30.0, 30.0)).exp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::ParamValue;

    #[test]
    fn test_model_kind_roundtrip_via_name() {
        for kind in ModelKind::ALL {
            assert_eq!(kind.name().parse::<ModelKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_unknown_kind_is_descriptive_error() {
        let err = "svm".parse::<ModelKind>().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("svm"));
        assert!(msg.contains("logreg"));
    }

    #[test]
    fn test_accuracy_basic() {
        assert_eq!(accuracy(&[1, 0, 1, 1], &[1, 0, 0, 1]), 0.75);
        assert_eq!(accuracy(&[], &[]), 0.0);
    }

    #[test]
    fn test_fit_dispatches_every_kind() {
        let data = Dataset::synthetic(80, 42);
        for kind in ModelKind::ALL {
            let model = Classifier::fit(kind, &ParamSet::new(), &data).unwrap();
            assert_eq!(model.kind(), kind);
            let proba = model.predict_proba(&[0.5, 0.5, 0.5]);
            assert!((0.0..=1.0).contains(&proba));
        }
    }

    #[test]
    fn test_classifier_serde_roundtrip_preserves_predictions() {
        let data = Dataset::synthetic(120, 42);
        for kind in ModelKind::ALL {
            let model = Classifier::fit(kind, &ParamSet::new(), &data).unwrap();
            let json = serde_json::to_string(&model).unwrap();
            let restored: Classifier = serde_json::from_str(&json).unwrap();

            for i in 0..data.len() {
                let x = data.sample(i);
                assert_eq!(model.predict(&x), restored.predict(&x));
            }
        }
    }

    #[test]
    fn test_fit_rejects_mistyped_param() {
        let data = Dataset::synthetic(40, 42);
        let mut params = ParamSet::new();
        params.set("max_iter", ParamValue::Str("many".into()));
        assert!(Classifier::fit(ModelKind::LogReg, &params, &data).is_err());
    }

    #[test]
    fn test_sigmoid_bounds() {
        assert!(sigmoid(-1000.0) > 0.0);
        assert!(sigmoid(1000.0) < 1.0);
        assert!((sigmoid(0.0) - 0.5).abs() < 1e-12);
    }
}
