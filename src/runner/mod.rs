//! Experiment runner: grid search over every configured model kind
//!
//! For each (kind, combination) pair the runner merges the kind's base
//! parameters with the combination (combination wins), fits a classifier on
//! a fixed train/test split, and records one tracked run with the merged
//! parameters, the held-out `val_accuracy`, and the serialized model
//! artifact.
//!
//! Execution is sequential and all-or-nothing: a failure marks the current
//! run failed and propagates; there is no retry and no cross-run recovery.

use serde::Serialize;

use crate::data::Dataset;
use crate::model::{accuracy, Classifier, ModelError, ModelKind};
use crate::search::{ParamGrid, ParamSet, ParamValue};
use crate::tracking::storage::RunStore;
use crate::tracking::{ExperimentTracker, RunStatus, TrackingError, VAL_ACCURACY};

/// Errors from the experiment runner
#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    #[error(transparent)]
    Tracking(#[from] TrackingError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("Artifact serialization failed: {0}")]
    Artifact(#[from] serde_json::Error),
}

/// Result alias for runner operations
pub type Result<T> = std::result::Result<T, RunnerError>;

/// Dataset and split settings shared by every run
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Samples in the generated dataset
    pub n_samples: usize,
    /// Held-out fraction
    pub test_size: f64,
    /// Seed for dataset generation
    pub data_seed: u64,
    /// Seed for the train/test shuffle
    pub split_seed: u64,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            n_samples: 400,
            test_size: 0.2,
            data_seed: 42,
            split_seed: 42,
        }
    }
}

/// One model kind with its fixed base parameters and search grid
#[derive(Debug, Clone)]
pub struct KindGrid {
    pub kind: ModelKind,
    pub base: ParamSet,
    pub grid: ParamGrid,
}

impl KindGrid {
    /// Total runs this grid expands to
    #[must_use]
    pub fn run_count(&self) -> usize {
        self.grid.combination_count()
    }
}

/// The built-in grids: one per supported kind
///
/// Sized so a full sweep stays fast while still separating good settings
/// from bad ones on the toy dataset.
#[must_use]
pub fn default_grids() -> Vec<KindGrid> {
    let mut grids = Vec::new();

    // Logistic regression: 5 * 2 * 2 = 20 runs
    let mut base = ParamSet::new();
    base.set("lr", ParamValue::Float(0.1));
    let mut grid = ParamGrid::new();
    grid.add(
        "C",
        [0.001, 0.01, 0.1, 1.0, 10.0]
            .into_iter()
            .map(ParamValue::Float)
            .collect(),
    );
    grid.add("max_iter", vec![ParamValue::Int(100), ParamValue::Int(200)]);
    grid.add(
        "fit_intercept",
        vec![ParamValue::Bool(true), ParamValue::Bool(false)],
    );
    grids.push(KindGrid {
        kind: ModelKind::LogReg,
        base,
        grid,
    });

    // Random forest: 3 * 3 * 2 = 18 runs
    let mut base = ParamSet::new();
    base.set("max_features", ParamValue::Str("sqrt".into()));
    base.set("seed", ParamValue::Int(42));
    let mut grid = ParamGrid::new();
    grid.add(
        "n_estimators",
        vec![ParamValue::Int(10), ParamValue::Int(25), ParamValue::Int(50)],
    );
    grid.add(
        "max_depth",
        vec![ParamValue::Int(3), ParamValue::Int(5), ParamValue::Int(8)],
    );
    grid.add(
        "min_samples_split",
        vec![ParamValue::Int(2), ParamValue::Int(5)],
    );
    grids.push(KindGrid {
        kind: ModelKind::RandomForest,
        base,
        grid,
    });

    // Gradient boosting: 3 * 3 * 2 = 18 runs
    let mut base = ParamSet::new();
    base.set("min_samples_split", ParamValue::Int(2));
    let mut grid = ParamGrid::new();
    grid.add(
        "n_estimators",
        vec![ParamValue::Int(25), ParamValue::Int(50), ParamValue::Int(100)],
    );
    grid.add(
        "learning_rate",
        [0.05, 0.1, 0.2].into_iter().map(ParamValue::Float).collect(),
    );
    grid.add("max_depth", vec![ParamValue::Int(2), ParamValue::Int(3)]);
    grids.push(KindGrid {
        kind: ModelKind::GradientBoosting,
        base,
        grid,
    });

    grids
}

/// The result of one completed run, surfaced to the caller for reporting
#[derive(Debug, Clone, Serialize)]
pub struct RunOutcome {
    pub run_id: String,
    pub kind: ModelKind,
    pub val_accuracy: f64,
}

/// Summary of a full grid sweep
#[derive(Debug, Clone, Serialize)]
pub struct SweepSummary {
    pub total_runs: usize,
    pub best: Option<RunOutcome>,
}

/// Run every combination of every grid, recording one tracked run each
///
/// `on_run` fires after each completed run, in execution order.
pub fn run_experiments<S: RunStore>(
    tracker: &mut ExperimentTracker<S>,
    config: &RunnerConfig,
    grids: &[KindGrid],
    mut on_run: impl FnMut(&RunOutcome),
) -> Result<SweepSummary> {
    let data = Dataset::synthetic(config.n_samples, config.data_seed);
    let (train, test) = data.train_test_split(config.test_size, config.split_seed);

    let mut total_runs = 0;
    let mut best: Option<RunOutcome> = None;

    for kind_grid in grids {
        for combo in kind_grid.grid.combinations() {
            let params = kind_grid.base.merged_with(&combo);
            let outcome = train_one_run(tracker, kind_grid.kind, &params, &train, &test)?;

            if best.as_ref().map_or(true, |b| outcome.val_accuracy > b.val_accuracy) {
                best = Some(outcome.clone());
            }
            total_runs += 1;
            on_run(&outcome);
        }
    }

    Ok(SweepSummary { total_runs, best })
}

/// Train one model and record it as a run
///
/// On a training or serialization failure the run is persisted as `Failed`
/// before the error propagates.
fn train_one_run<S: RunStore>(
    tracker: &mut ExperimentTracker<S>,
    kind: ModelKind,
    params: &ParamSet,
    train: &Dataset,
    test: &Dataset,
) -> Result<RunOutcome> {
    let run_id = tracker.start_run();
    tracker.log_param(&run_id, "model_name", kind.name())?;
    for (name, value) in params.iter() {
        tracker.log_param(&run_id, name, &value.to_string())?;
    }

    match fit_and_score(kind, params, train, test) {
        Ok((model, val_accuracy)) => {
            tracker.log_metric(&run_id, VAL_ACCURACY, val_accuracy)?;
            let artifact = serde_json::to_vec_pretty(&model)?;
            tracker.log_artifact(&run_id, &artifact)?;
            tracker.end_run(&run_id, RunStatus::Completed)?;
            Ok(RunOutcome {
                run_id,
                kind,
                val_accuracy,
            })
        }
        Err(e) => {
            tracker.end_run(&run_id, RunStatus::Failed)?;
            Err(e.into())
        }
    }
}

fn fit_and_score(
    kind: ModelKind,
    params: &ParamSet,
    train: &Dataset,
    test: &Dataset,
) -> std::result::Result<(Classifier, f64), ModelError> {
    let model = Classifier::fit(kind, params, train)?;
    let predictions = model.predict_all(test);
    Ok((model, accuracy(&predictions, &test.labels)))
}
