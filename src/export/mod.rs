//! Best-run selection and model export
//!
//! Scans every run of an experiment, picks the one with the highest
//! `val_accuracy` (ties broken by earliest run ID, which equals creation
//! order), re-materializes its artifact from the run store, and writes the
//! model plus a metadata sidecar to the export directory consumed by the
//! serving façade.
//!
//! Export overwrites any previous artifact; I/O failures propagate with no
//! partial-write cleanup.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::Classifier;
use crate::tracking::storage::{RunStore, StoreError};
use crate::tracking::{Run, RunStatus};

/// File name of the exported model inside the export directory
pub const MODEL_FILE: &str = "model.json";

/// File name of the metadata sidecar inside the export directory
pub const METADATA_FILE: &str = "metadata.json";

/// Errors from selection and export
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("Experiment '{0}' has no completed runs with a recorded val_accuracy; run training first")]
    NoScoredRuns(String),

    #[error("Artifact of run '{run_id}' is not a valid model: {source}")]
    CorruptArtifact {
        run_id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Metadata serialization failed: {0}")]
    Metadata(#[from] serde_json::Error),

    #[error("I/O error writing export: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// The metadata sidecar written next to the exported model
///
/// `val_accuracy` always equals the maximum recorded accuracy among the
/// experiment's runs at the time of export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub best_run_id: String,
    pub val_accuracy: f64,
    pub experiment_name: String,
    pub model_name: String,
}

/// Select the run with the highest recorded `val_accuracy`
///
/// Only completed runs with the metric count. Fails with a descriptive
/// error when the experiment does not exist
/// ([`StoreError::ExperimentNotFound`]) or has no scored runs. Ties go to
/// the earliest run ID: candidates are scanned in run-ID order and only a
/// strictly higher accuracy displaces the current best.
pub fn select_best_run(store: &impl RunStore, experiment: &str) -> Result<Run> {
    let runs = store.list_runs(experiment)?;

    let mut best: Option<Run> = None;
    for run in runs {
        if run.status != RunStatus::Completed {
            continue;
        }
        let Some(acc) = run.val_accuracy() else {
            continue;
        };
        let displaces = match &best {
            Some(current) => acc > current.val_accuracy().unwrap_or(f64::NEG_INFINITY),
            None => true,
        };
        if displaces {
            best = Some(run);
        }
    }

    best.ok_or_else(|| ExportError::NoScoredRuns(experiment.to_string()))
}

/// Export the best run's model and metadata to `out_dir`
///
/// The artifact is re-loaded from the run store and parsed before writing,
/// so a corrupt artifact fails the export instead of propagating to the
/// serving side. The directory is created if absent and prior contents are
/// overwritten.
pub fn export_best(
    store: &impl RunStore,
    experiment: &str,
    out_dir: impl AsRef<Path>,
) -> Result<ExportMetadata> {
    let best = select_best_run(store, experiment)?;
    let val_accuracy = best
        .val_accuracy()
        .expect("selected run always carries val_accuracy");

    let bytes = store.load_artifact(experiment, &best.run_id)?;
    let model: Classifier =
        serde_json::from_slice(&bytes).map_err(|source| ExportError::CorruptArtifact {
            run_id: best.run_id.clone(),
            source,
        })?;

    let metadata = ExportMetadata {
        best_run_id: best.run_id.clone(),
        val_accuracy,
        experiment_name: experiment.to_string(),
        model_name: model.kind().name().to_string(),
    };

    let out_dir = out_dir.as_ref();
    fs::create_dir_all(out_dir)?;
    fs::write(out_dir.join(MODEL_FILE), serde_json::to_vec_pretty(&model)?)?;
    fs::write(
        out_dir.join(METADATA_FILE),
        serde_json::to_vec_pretty(&metadata)?,
    )?;

    Ok(metadata)
}

/// Read back the metadata sidecar from an export directory
pub fn read_metadata(dir: impl AsRef<Path>) -> Result<ExportMetadata> {
    let json = fs::read_to_string(dir.as_ref().join(METADATA_FILE))?;
    Ok(serde_json::from_str(&json)?)
}

/// Read back the exported model from an export directory
pub fn read_model(dir: impl AsRef<Path>) -> Result<Classifier> {
    let json = fs::read_to_string(dir.as_ref().join(MODEL_FILE))?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::model::{Classifier, ModelKind};
    use crate::search::ParamSet;
    use crate::tracking::storage::InMemoryStore;
    use crate::tracking::VAL_ACCURACY;
    use tempfile::TempDir;

    fn scored_run(id: &str, accuracy: f64) -> Run {
        let mut run = Run {
            run_id: id.to_string(),
            experiment_name: "exp".to_string(),
            status: RunStatus::Completed,
            params: Default::default(),
            metrics: Default::default(),
            artifact: None,
            start_time_ms: Some(0),
            end_time_ms: Some(1),
        };
        run.metrics.insert(VAL_ACCURACY.to_string(), accuracy);
        run
    }

    fn store_with_accuracies(pairs: &[(&str, f64)]) -> InMemoryStore {
        let mut store = InMemoryStore::new();
        for (id, acc) in pairs {
            store.save_run(&scored_run(id, *acc)).unwrap();
        }
        store
    }

    #[test]
    fn test_selects_maximum_accuracy() {
        let store = store_with_accuracies(&[
            ("run-0001", 0.91),
            ("run-0002", 0.95),
            ("run-0003", 0.93),
        ]);
        let best = select_best_run(&store, "exp").unwrap();
        assert_eq!(best.run_id, "run-0002");
        assert_eq!(best.val_accuracy(), Some(0.95));
    }

    #[test]
    fn test_tie_goes_to_earliest_run() {
        let store = store_with_accuracies(&[
            ("run-0001", 0.95),
            ("run-0002", 0.95),
            ("run-0003", 0.90),
        ]);
        let best = select_best_run(&store, "exp").unwrap();
        assert_eq!(best.run_id, "run-0001");
    }

    #[test]
    fn test_missing_experiment_is_descriptive() {
        let store = InMemoryStore::new();
        let err = select_best_run(&store, "never-ran").unwrap_err();
        assert!(err.to_string().contains("never-ran"));
    }

    #[test]
    fn test_experiment_with_no_scored_runs_is_descriptive() {
        let mut store = InMemoryStore::new();
        let mut run = scored_run("run-0001", 0.9);
        run.metrics.clear();
        store.save_run(&run).unwrap();

        let err = select_best_run(&store, "exp").unwrap_err();
        assert!(matches!(err, ExportError::NoScoredRuns(_)));
        assert!(err.to_string().contains("exp"));
    }

    #[test]
    fn test_failed_runs_are_ignored() {
        let mut store = store_with_accuracies(&[("run-0001", 0.80)]);
        let mut failed = scored_run("run-0002", 0.99);
        failed.status = RunStatus::Failed;
        store.save_run(&failed).unwrap();

        let best = select_best_run(&store, "exp").unwrap();
        assert_eq!(best.run_id, "run-0001");
    }

    fn trained_artifact() -> Vec<u8> {
        let data = Dataset::synthetic(60, 42);
        let model = Classifier::fit(ModelKind::LogReg, &ParamSet::new(), &data).unwrap();
        serde_json::to_vec(&model).unwrap()
    }

    #[test]
    fn test_export_roundtrip_metadata_matches_selected_run() {
        let mut store = store_with_accuracies(&[("run-0001", 0.91), ("run-0002", 0.95)]);
        store.save_artifact("exp", "run-0002", &trained_artifact()).unwrap();

        let dir = TempDir::new().unwrap();
        let written = export_best(&store, "exp", dir.path()).unwrap();

        let read_back = read_metadata(dir.path()).unwrap();
        assert_eq!(read_back, written);
        assert_eq!(read_back.best_run_id, "run-0002");
        assert_eq!(read_back.val_accuracy, 0.95);
        assert_eq!(read_back.experiment_name, "exp");
        assert_eq!(read_back.model_name, "logreg");

        let model = read_model(dir.path()).unwrap();
        assert_eq!(model.kind(), ModelKind::LogReg);
    }

    #[test]
    fn test_export_overwrites_previous_artifact() {
        let mut store = store_with_accuracies(&[("run-0001", 0.90)]);
        store.save_artifact("exp", "run-0001", &trained_artifact()).unwrap();

        let dir = TempDir::new().unwrap();
        export_best(&store, "exp", dir.path()).unwrap();

        // A better run appears; re-export must replace the metadata
        store.save_run(&scored_run("run-0002", 0.97)).unwrap();
        store.save_artifact("exp", "run-0002", &trained_artifact()).unwrap();
        export_best(&store, "exp", dir.path()).unwrap();

        let metadata = read_metadata(dir.path()).unwrap();
        assert_eq!(metadata.best_run_id, "run-0002");
        assert_eq!(metadata.val_accuracy, 0.97);
    }

    #[test]
    fn test_missing_artifact_fails_export() {
        let store = store_with_accuracies(&[("run-0001", 0.9)]);
        let dir = TempDir::new().unwrap();
        let err = export_best(&store, "exp", dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::Store(StoreError::ArtifactNotFound(_))));
    }

    #[test]
    fn test_corrupt_artifact_fails_export() {
        let mut store = store_with_accuracies(&[("run-0001", 0.9)]);
        store.save_artifact("exp", "run-0001", b"not json").unwrap();

        let dir = TempDir::new().unwrap();
        let err = export_best(&store, "exp", dir.path()).unwrap_err();
        assert!(matches!(err, ExportError::CorruptArtifact { .. }));
    }
}
