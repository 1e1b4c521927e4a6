//! Run store backends
//!
//! Provides the `RunStore` trait with a JSON file-based implementation and
//! an in-memory one for tests.
//!
//! The file layout mirrors one directory per experiment:
//!
//! ```text
//! <root>/<experiment>/<run_id>.json            run record
//! <root>/<experiment>/artifacts/<run_id>/model.json   trained artifact
//! ```
//!
//! An experiment exists iff its directory does; it is created implicitly by
//! the first persisted run.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::Run;

/// Errors from run store operations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Experiment not found: '{0}'")]
    ExperimentNotFound(String),

    #[error("Run not found: '{0}'")]
    RunNotFound(String),

    #[error("No artifact recorded for run '{0}'")]
    ArtifactNotFound(String),
}

/// Result alias for run store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistence for experiment runs and their artifacts
///
/// Runs are immutable once saved; nothing in the pipeline deletes them.
pub trait RunStore {
    /// Persist a run under its experiment
    fn save_run(&mut self, run: &Run) -> Result<()>;

    /// Load one run by ID
    fn load_run(&self, experiment: &str, run_id: &str) -> Result<Run>;

    /// List an experiment's runs, sorted by run ID
    ///
    /// Fails with [`StoreError::ExperimentNotFound`] when the experiment has
    /// never been written.
    fn list_runs(&self, experiment: &str) -> Result<Vec<Run>>;

    /// Whether the experiment has been created
    fn experiment_exists(&self, experiment: &str) -> bool;

    /// Store serialized artifact bytes for a run, returning a locator string
    fn save_artifact(&mut self, experiment: &str, run_id: &str, data: &[u8]) -> Result<String>;

    /// Load a run's artifact bytes
    fn load_artifact(&self, experiment: &str, run_id: &str) -> Result<Vec<u8>>;
}

/// JSON file-based run store
///
/// One JSON file per run under the experiment directory.
#[derive(Debug)]
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    /// Create a store rooted at `root`; directories are created lazily on
    /// first write
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// The store's root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    fn experiment_dir(&self, experiment: &str) -> PathBuf {
        self.root.join(experiment)
    }

    fn run_path(&self, experiment: &str, run_id: &str) -> PathBuf {
        self.experiment_dir(experiment).join(format!("{run_id}.json"))
    }

    fn artifact_path(&self, experiment: &str, run_id: &str) -> PathBuf {
        self.experiment_dir(experiment)
            .join("artifacts")
            .join(run_id)
            .join("model.json")
    }
}

impl RunStore for JsonFileStore {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        let dir = self.experiment_dir(&run.experiment_name);
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let json = serde_json::to_string_pretty(run)?;
        fs::write(self.run_path(&run.experiment_name, &run.run_id), json)?;
        Ok(())
    }

    fn load_run(&self, experiment: &str, run_id: &str) -> Result<Run> {
        let path = self.run_path(experiment, run_id);
        if !path.exists() {
            return Err(StoreError::RunNotFound(run_id.to_string()));
        }
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    fn list_runs(&self, experiment: &str) -> Result<Vec<Run>> {
        let dir = self.experiment_dir(experiment);
        if !dir.exists() {
            return Err(StoreError::ExperimentNotFound(experiment.to_string()));
        }
        let mut runs = Vec::new();
        for entry in fs::read_dir(&dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) == Some("json") {
                let json = fs::read_to_string(&path)?;
                runs.push(serde_json::from_str(&json)?);
            }
        }
        runs.sort_by(|a: &Run, b: &Run| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn experiment_exists(&self, experiment: &str) -> bool {
        self.experiment_dir(experiment).is_dir()
    }

    fn save_artifact(&mut self, experiment: &str, run_id: &str, data: &[u8]) -> Result<String> {
        let path = self.artifact_path(experiment, run_id);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, data)?;
        Ok(path.to_string_lossy().into_owned())
    }

    fn load_artifact(&self, experiment: &str, run_id: &str) -> Result<Vec<u8>> {
        let path = self.artifact_path(experiment, run_id);
        if !path.exists() {
            return Err(StoreError::ArtifactNotFound(run_id.to_string()));
        }
        Ok(fs::read(path)?)
    }
}

/// In-memory run store for tests
///
/// No persistence; runs and artifacts live in `HashMap`s.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    /// experiment -> run_id -> run
    runs: HashMap<String, HashMap<String, Run>>,
    /// (experiment, run_id) -> artifact bytes
    artifacts: HashMap<(String, String), Vec<u8>>,
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl RunStore for InMemoryStore {
    fn save_run(&mut self, run: &Run) -> Result<()> {
        self.runs
            .entry(run.experiment_name.clone())
            .or_default()
            .insert(run.run_id.clone(), run.clone());
        Ok(())
    }

    fn load_run(&self, experiment: &str, run_id: &str) -> Result<Run> {
        self.runs
            .get(experiment)
            .and_then(|runs| runs.get(run_id))
            .cloned()
            .ok_or_else(|| StoreError::RunNotFound(run_id.to_string()))
    }

    fn list_runs(&self, experiment: &str) -> Result<Vec<Run>> {
        let runs = self
            .runs
            .get(experiment)
            .ok_or_else(|| StoreError::ExperimentNotFound(experiment.to_string()))?;
        let mut runs: Vec<Run> = runs.values().cloned().collect();
        runs.sort_by(|a, b| a.run_id.cmp(&b.run_id));
        Ok(runs)
    }

    fn experiment_exists(&self, experiment: &str) -> bool {
        self.runs.contains_key(experiment)
    }

    fn save_artifact(&mut self, experiment: &str, run_id: &str, data: &[u8]) -> Result<String> {
        let key = (experiment.to_string(), run_id.to_string());
        self.artifacts.insert(key, data.to_vec());
        Ok(format!("mem://{experiment}/{run_id}/model.json"))
    }

    fn load_artifact(&self, experiment: &str, run_id: &str) -> Result<Vec<u8>> {
        self.artifacts
            .get(&(experiment.to_string(), run_id.to_string()))
            .cloned()
            .ok_or_else(|| StoreError::ArtifactNotFound(run_id.to_string()))
    }
}
