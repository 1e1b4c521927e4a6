//! Toy classification dataset
//!
//! Generates a deterministic synthetic binary-classification problem with
//! three features, matching the three-feature predict endpoint of the
//! serving façade. Labels follow a noisy linear rule, so linear models do
//! well but not perfectly and tree ensembles have signal to work with.

use ndarray::Array2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Number of features per sample
pub const N_FEATURES: usize = 3;

/// Linear weights of the label-generating rule
///
/// Shared with the serving façade's fallback scoring formula.
pub const TRUE_WEIGHTS: [f64; N_FEATURES] = [0.5, 0.3, 0.2];

/// A feature matrix with binary labels
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Samples, one row per sample
    pub features: Array2<f64>,
    /// Binary labels, 0 or 1, one per row
    pub labels: Vec<u8>,
}

impl Dataset {
    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// True if the dataset holds no samples
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// Generate `n_samples` points deterministically from `seed`
    ///
    /// Features are uniform in [-1, 1]; the label is 1 when the noisy linear
    /// score `0.5*x1 + 0.3*x2 + 0.2*x3 + noise` is positive.
    #[must_use]
    pub fn synthetic(n_samples: usize, seed: u64) -> Self {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut values = Vec::with_capacity(n_samples * N_FEATURES);
        let mut labels = Vec::with_capacity(n_samples);

        for _ in 0..n_samples {
            let mut score = 0.0;
            for &w in &TRUE_WEIGHTS {
                let x: f64 = rng.gen_range(-1.0..1.0);
                score += w * x;
                values.push(x);
            }
            let noise: f64 = rng.gen_range(-0.15..0.15);
            labels.push(u8::from(score + noise > 0.0));
        }

        let features = Array2::from_shape_vec((n_samples, N_FEATURES), values)
            .expect("row-major layout matches sample count");
        Self { features, labels }
    }

    /// Split into (train, test) with a seeded shuffle
    ///
    /// `test_size` is a fraction in (0, 1); the test set gets
    /// `ceil(n * test_size)` samples. The shuffle is deterministic in `seed`.
    #[must_use]
    pub fn train_test_split(&self, test_size: f64, seed: u64) -> (Dataset, Dataset) {
        let n = self.len();
        let n_test = ((n as f64) * test_size).ceil() as usize;

        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(seed);
        // Fisher-Yates, matching rand's SliceRandom::shuffle
        for i in (1..n).rev() {
            let j = rng.gen_range(0..=i);
            indices.swap(i, j);
        }

        let subset = |idx: &[usize]| {
            let mut values = Vec::with_capacity(idx.len() * N_FEATURES);
            let mut labels = Vec::with_capacity(idx.len());
            for &i in idx {
                values.extend(self.features.row(i).iter().copied());
                labels.push(self.labels[i]);
            }
            Dataset {
                features: Array2::from_shape_vec((idx.len(), N_FEATURES), values)
                    .expect("row-major layout matches index count"),
                labels,
            }
        };

        let test = subset(&indices[..n_test]);
        let train = subset(&indices[n_test..]);
        (train, test)
    }

    /// Row accessor as a fixed-size feature array
    #[must_use]
    pub fn sample(&self, i: usize) -> [f64; N_FEATURES] {
        let row = self.features.row(i);
        [row[0], row[1], row[2]]
    }
}
