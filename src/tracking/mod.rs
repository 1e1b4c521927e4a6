//! Experiment tracking
//!
//! Records each training attempt as an immutable [`Run`] under a named
//! experiment, persisted through a pluggable [`RunStore`](storage::RunStore)
//! backend.
//!
//! # Architecture
//!
//! - **`ExperimentTracker`**: handle that manages runs for one experiment
//! - **`Run`**: a single attempt with params, metrics, and an artifact
//! - **`RunStore`**: pluggable persistence (JSON files, in-memory)
//!
//! Run IDs are zero-padded (`run-0007`) and continue from the highest
//! persisted ID, so the lexicographic order used everywhere equals creation
//! order.
//!
//! # Example
//!
//! ```
//! use elegir::tracking::{ExperimentTracker, RunStatus};
//! use elegir::tracking::storage::InMemoryStore;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut tracker = ExperimentTracker::new("demo", InMemoryStore::new())?;
//!
//! let run_id = tracker.start_run();
//! tracker.log_param(&run_id, "C", "0.1")?;
//! tracker.log_metric(&run_id, "val_accuracy", 0.94)?;
//! tracker.end_run(&run_id, RunStatus::Completed)?;
//!
//! let runs = tracker.list_runs()?;
//! assert_eq!(runs.len(), 1);
//! assert_eq!(runs[0].val_accuracy(), Some(0.94));
//! # Ok(())
//! # }
//! ```

pub mod storage;

use std::collections::HashMap;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use storage::{RunStore, StoreError};

/// Terminal status of a tracked run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Run is actively recording
    Active,
    /// Run completed successfully
    Completed,
    /// Run failed before producing a usable model
    Failed,
}

/// A single experiment run
///
/// Immutable once persisted: the pipeline never rewrites or deletes a
/// recorded run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Run {
    /// Unique, zero-padded identifier (`run-0001`)
    pub run_id: String,
    /// Parent experiment name
    pub experiment_name: String,
    /// Current status
    pub status: RunStatus,
    /// Hyperparameters, string-encoded
    pub params: HashMap<String, String>,
    /// Metrics, latest value per name
    pub metrics: HashMap<String, f64>,
    /// Locator of the trained artifact, if one was logged
    pub artifact: Option<String>,
    /// Unix timestamp (ms) when the run started
    pub start_time_ms: Option<u64>,
    /// Unix timestamp (ms) when the run ended
    pub end_time_ms: Option<u64>,
}

impl Run {
    fn new(run_id: String, experiment_name: String) -> Self {
        Self {
            run_id,
            experiment_name,
            status: RunStatus::Active,
            params: HashMap::new(),
            metrics: HashMap::new(),
            artifact: None,
            start_time_ms: Some(now_ms()),
            end_time_ms: None,
        }
    }

    /// The recorded validation accuracy, if logged
    #[must_use]
    pub fn val_accuracy(&self) -> Option<f64> {
        self.metrics.get(VAL_ACCURACY).copied()
    }
}

/// Metric name recorded by the runner and compared by the selector
pub const VAL_ACCURACY: &str = "val_accuracy";

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// Errors from experiment tracking operations
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("Run not active: '{0}'")]
    RunNotActive(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result alias for tracking operations
pub type Result<T> = std::result::Result<T, TrackingError>;

/// Manages runs for one named experiment over a [`RunStore`]
#[derive(Debug)]
pub struct ExperimentTracker<S: RunStore> {
    experiment_name: String,
    store: S,
    /// Active runs held in memory until ended
    active_runs: HashMap<String, Run>,
    next_run_id: u64,
}

impl<S: RunStore> ExperimentTracker<S> {
    /// Open a tracker, continuing run numbering from any persisted runs
    pub fn new(experiment_name: impl Into<String>, store: S) -> Result<Self> {
        let experiment_name = experiment_name.into();
        let next_run_id = if store.experiment_exists(&experiment_name) {
            store
                .list_runs(&experiment_name)?
                .iter()
                .filter_map(|r| r.run_id.strip_prefix("run-")?.parse::<u64>().ok())
                .max()
                .map_or(1, |max| max + 1)
        } else {
            1
        };

        Ok(Self {
            experiment_name,
            store,
            active_runs: HashMap::new(),
            next_run_id,
        })
    }

    /// The experiment this tracker writes to
    #[must_use]
    pub fn experiment_name(&self) -> &str {
        &self.experiment_name
    }

    /// Access the underlying store
    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Start a new run, returning its ID
    pub fn start_run(&mut self) -> String {
        let run_id = format!("run-{:04}", self.next_run_id);
        self.next_run_id += 1;

        let run = Run::new(run_id.clone(), self.experiment_name.clone());
        self.active_runs.insert(run_id.clone(), run);
        run_id
    }

    /// End a run, persisting it to the store
    pub fn end_run(&mut self, run_id: &str, status: RunStatus) -> Result<()> {
        let mut run = self
            .active_runs
            .remove(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))?;

        run.status = status;
        run.end_time_ms = Some(now_ms());
        self.store.save_run(&run)?;
        Ok(())
    }

    /// Log a single string-encoded parameter
    pub fn log_param(&mut self, run_id: &str, key: &str, value: &str) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        run.params.insert(key.to_string(), value.to_string());
        Ok(())
    }

    /// Log multiple parameters at once
    pub fn log_params<'a>(
        &mut self,
        run_id: &str,
        params: impl IntoIterator<Item = (&'a str, String)>,
    ) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        for (key, value) in params {
            run.params.insert(key.to_string(), value);
        }
        Ok(())
    }

    /// Log a metric value, replacing any prior value under the same name
    pub fn log_metric(&mut self, run_id: &str, key: &str, value: f64) -> Result<()> {
        let run = self.active_run_mut(run_id)?;
        run.metrics.insert(key.to_string(), value);
        Ok(())
    }

    /// Store artifact bytes for a run and record their locator
    pub fn log_artifact(&mut self, run_id: &str, data: &[u8]) -> Result<()> {
        if !self.active_runs.contains_key(run_id) {
            return Err(TrackingError::RunNotActive(run_id.to_string()));
        }
        let locator = self.store.save_artifact(&self.experiment_name, run_id, data)?;
        if let Some(run) = self.active_runs.get_mut(run_id) {
            run.artifact = Some(locator);
        }
        Ok(())
    }

    /// Retrieve a run by ID, checking active runs before the store
    pub fn get_run(&self, run_id: &str) -> Result<Run> {
        if let Some(run) = self.active_runs.get(run_id) {
            return Ok(run.clone());
        }
        Ok(self.store.load_run(&self.experiment_name, run_id)?)
    }

    /// List all runs, active and persisted, sorted by run ID
    pub fn list_runs(&self) -> Result<Vec<Run>> {
        let mut runs: Vec<Run> = self.active_runs.values().cloned().collect();
        if self.store.experiment_exists(&self.experiment_name) {
            for run in self.store.list_runs(&self.experiment_name)? {
                if !self.active_runs.contains_key(&run.run_id) {
                    runs.push(run);
                }
            }
        }
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn active_run_mut(&mut self, run_id: &str) -> Result<&mut Run> {
        self.active_runs
            .get_mut(run_id)
            .ok_or_else(|| TrackingError::RunNotActive(run_id.to_string()))
    }
}
