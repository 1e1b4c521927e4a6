//! Serving context: the model (or fallback) behind the HTTP façade
//!
//! Built once at process start and shared immutably across request
//! handlers; reloading a newer export means restarting the process.

use std::path::Path;
use std::sync::Arc;

use crate::data::TRUE_WEIGHTS;
use crate::export::{self, ExportMetadata};
use crate::model::Classifier;

use super::metrics::Metrics;

/// Name reported when no artifact is loaded
pub const DUMMY_MODEL_NAME: &str = "dummy";

/// A successfully loaded export
#[derive(Debug)]
pub struct LoadedModel {
    pub classifier: Classifier,
    pub metadata: ExportMetadata,
}

/// Immutable per-process serving state
#[derive(Debug)]
pub struct ServingContext {
    model: Option<LoadedModel>,
    metrics: Metrics,
}

/// Shared handle passed to every handler
pub type AppState = Arc<ServingContext>;

impl ServingContext {
    /// Load the exported artifact from `model_dir`
    ///
    /// A missing or unreadable export is not an error: the context falls
    /// back to the hand-written linear formula and reports the condition
    /// through `/health`.
    #[must_use]
    pub fn load(model_dir: impl AsRef<Path>) -> Self {
        let model_dir = model_dir.as_ref();
        let model = match (export::read_model(model_dir), export::read_metadata(model_dir)) {
            (Ok(classifier), Ok(metadata)) => {
                tracing::info!(
                    model = %metadata.model_name,
                    run = %metadata.best_run_id,
                    val_accuracy = metadata.val_accuracy,
                    "loaded exported model"
                );
                Some(LoadedModel {
                    classifier,
                    metadata,
                })
            }
            (model_result, metadata_result) => {
                let reason = model_result
                    .err()
                    .or(metadata_result.err())
                    .map_or_else(|| "unknown".to_string(), |e| e.to_string());
                tracing::warn!(
                    dir = %model_dir.display(),
                    %reason,
                    "no exported model; serving dummy fallback"
                );
                None
            }
        };

        Self {
            model,
            metrics: Metrics::new(),
        }
    }

    /// A context with no model, always serving the fallback formula
    #[must_use]
    pub fn dummy() -> Self {
        Self {
            model: None,
            metrics: Metrics::new(),
        }
    }

    /// Whether an exported model is loaded
    #[must_use]
    pub fn model_loaded(&self) -> bool {
        self.model.is_some()
    }

    /// The request metrics registry
    #[must_use]
    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// Score one sample, returning `(prediction, model name)`
    ///
    /// With a loaded model the prediction is the positive-class
    /// probability; without one it is the linear fallback score
    /// `0.5*x1 + 0.3*x2 + 0.2*x3`.
    #[must_use]
    pub fn score(&self, x1: f64, x2: f64, x3: f64) -> (f64, &str) {
        match &self.model {
            Some(loaded) => (
                loaded.classifier.predict_proba(&[x1, x2, x3]),
                loaded.metadata.model_name.as_str(),
            ),
            None => {
                let [w1, w2, w3] = TRUE_WEIGHTS;
                (w1 * x1 + w2 * x2 + w3 * x3, DUMMY_MODEL_NAME)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Dataset;
    use crate::model::ModelKind;
    use crate::search::ParamSet;
    use crate::tracking::storage::{InMemoryStore, RunStore};
    use crate::tracking::{Run, RunStatus, VAL_ACCURACY};
    use tempfile::TempDir;

    #[test]
    fn test_dummy_fallback_formula() {
        let ctx = ServingContext::dummy();
        assert!(!ctx.model_loaded());

        let (prediction, model) = ctx.score(1.0, 1.0, 1.0);
        assert!((prediction - 1.0).abs() < 1e-12);
        assert_eq!(model, DUMMY_MODEL_NAME);

        let (prediction, _) = ctx.score(2.0, 0.0, -1.0);
        assert!((prediction - 0.8).abs() < 1e-12);
    }

    #[test]
    fn test_missing_export_dir_falls_back() {
        let ctx = ServingContext::load("/nonexistent/export/dir");
        assert!(!ctx.model_loaded());
        assert_eq!(ctx.score(0.0, 0.0, 0.0).1, DUMMY_MODEL_NAME);
    }

    #[test]
    fn test_loads_exported_model() {
        let data = Dataset::synthetic(80, 42);
        let model = Classifier::fit(ModelKind::LogReg, &ParamSet::new(), &data).unwrap();

        let mut store = InMemoryStore::new();
        let mut run = Run {
            run_id: "run-0001".into(),
            experiment_name: "exp".into(),
            status: RunStatus::Completed,
            params: Default::default(),
            metrics: Default::default(),
            artifact: None,
            start_time_ms: Some(0),
            end_time_ms: Some(1),
        };
        run.metrics.insert(VAL_ACCURACY.into(), 0.9);
        store.save_run(&run).unwrap();
        store
            .save_artifact("exp", "run-0001", &serde_json::to_vec(&model).unwrap())
            .unwrap();

        let dir = TempDir::new().unwrap();
        crate::export::export_best(&store, "exp", dir.path()).unwrap();

        let ctx = ServingContext::load(dir.path());
        assert!(ctx.model_loaded());

        let (prediction, name) = ctx.score(0.5, 0.5, 0.5);
        assert_eq!(name, "logreg");
        assert!((0.0..=1.0).contains(&prediction));
    }

    #[test]
    fn test_corrupt_export_falls_back() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join(crate::export::MODEL_FILE), b"garbage").unwrap();
        std::fs::write(dir.path().join(crate::export::METADATA_FILE), b"{}").unwrap();

        let ctx = ServingContext::load(dir.path());
        assert!(!ctx.model_loaded());
    }
}
