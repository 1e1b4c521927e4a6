//! L2-regularized logistic regression via batch gradient descent

use serde::{Deserialize, Serialize};

use super::{sigmoid, Result};
use crate::data::{Dataset, N_FEATURES};
use crate::search::ParamSet;

/// Hyperparameters for [`LogisticRegression`]
#[derive(Debug, Clone, PartialEq)]
pub struct LogRegParams {
    /// Inverse regularization strength (sklearn convention: larger = weaker)
    pub c: f64,
    /// Gradient descent iterations
    pub max_iter: usize,
    /// Whether to learn a bias term
    pub fit_intercept: bool,
    /// Gradient descent step size
    pub lr: f64,
}

impl LogRegParams {
    /// Extract from a merged parameter set, with defaults for absent names
    pub fn from_param_set(params: &ParamSet) -> Result<Self> {
        Ok(Self {
            c: params.get_f64("C", 1.0)?,
            max_iter: params.get_i64("max_iter", 200)?.max(0) as usize,
            fit_intercept: params.get_bool("fit_intercept", true)?,
            lr: params.get_f64("lr", 0.1)?,
        })
    }
}

/// A trained logistic regression model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: [f64; N_FEATURES],
    bias: f64,
}

impl LogisticRegression {
    /// Fit with full-batch gradient descent on the logistic loss
    #[must_use]
    pub fn fit(params: &LogRegParams, train: &Dataset) -> Self {
        let n = train.len();
        let mut weights = [0.0; N_FEATURES];
        let mut bias = 0.0;
        if n == 0 {
            return Self { weights, bias };
        }

        // L2 penalty scaled by 1/(C*n), matching the sklearn objective
        let reg = 1.0 / (params.c * n as f64);

        for _ in 0..params.max_iter {
            let mut grad_w = [0.0; N_FEATURES];
            let mut grad_b = 0.0;

            for i in 0..n {
                let x = train.sample(i);
                let mut z = bias;
                for (w, xi) in weights.iter().zip(x.iter()) {
                    z += w * xi;
                }
                let err = sigmoid(z) - f64::from(train.labels[i]);
                for (g, xi) in grad_w.iter_mut().zip(x.iter()) {
                    *g += err * xi;
                }
                grad_b += err;
            }

            for (w, g) in weights.iter_mut().zip(grad_w.iter()) {
                *w -= params.lr * (g / n as f64 + reg * *w);
            }
            if params.fit_intercept {
                bias -= params.lr * grad_b / n as f64;
            }
        }

        Self { weights, bias }
    }

    /// Probability of the positive class
    #[must_use]
    pub fn predict_proba(&self, x: &[f64; N_FEATURES]) -> f64 {
        let mut z = self.bias;
        for (w, xi) in self.weights.iter().zip(x.iter()) {
            z += w * xi;
        }
        sigmoid(z)
    }
}
