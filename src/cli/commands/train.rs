//! `elegir train`: run the full hyperparameter sweep

use crate::cli::logging::{log, LogLevel};
use crate::config::TrainArgs;
use crate::runner::{default_grids, run_experiments, KindGrid, RunnerConfig};
use crate::tracking::storage::JsonFileStore;
use crate::tracking::ExperimentTracker;

pub fn run_train(args: TrainArgs, log_level: LogLevel) -> Result<(), String> {
    let store = JsonFileStore::new(&args.runs_dir);
    let mut tracker = ExperimentTracker::new(&args.experiment, store)
        .map_err(|e| format!("Failed to open run store: {e}"))?;

    let grids = default_grids();
    let planned: usize = grids.iter().map(KindGrid::run_count).sum();
    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Sweeping {planned} runs across {} model kinds (experiment '{}')",
            grids.len(),
            args.experiment
        ),
    );

    let config = RunnerConfig {
        n_samples: args.n_samples,
        ..RunnerConfig::default()
    };

    let summary = run_experiments(&mut tracker, &config, &grids, |outcome| {
        log(
            log_level,
            LogLevel::Verbose,
            &format!(
                "{}  model={}  val_accuracy={:.4}",
                outcome.run_id, outcome.kind, outcome.val_accuracy
            ),
        );
    })
    .map_err(|e| format!("Training sweep failed: {e}"))?;

    match &summary.best {
        Some(best) => log(
            log_level,
            LogLevel::Normal,
            &format!(
                "Completed {} runs. Best: {} (model={}, val_accuracy={:.4})",
                summary.total_runs, best.run_id, best.kind, best.val_accuracy
            ),
        ),
        None => log(
            log_level,
            LogLevel::Normal,
            &format!("Completed {} runs.", summary.total_runs),
        ),
    }

    Ok(())
}
