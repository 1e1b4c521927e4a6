//! `elegir export`: select the best run and write the serving artifact

use crate::cli::logging::{log, LogLevel};
use crate::config::ExportArgs;
use crate::export::export_best;
use crate::tracking::storage::JsonFileStore;

pub fn run_export(args: ExportArgs, log_level: LogLevel) -> Result<(), String> {
    let store = JsonFileStore::new(&args.runs_dir);

    let metadata = export_best(&store, &args.experiment, &args.output)
        .map_err(|e| format!("Export failed: {e}"))?;

    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Best run: {} (model={}, val_accuracy={:.4})",
            metadata.best_run_id, metadata.model_name, metadata.val_accuracy
        ),
    );
    log(
        log_level,
        LogLevel::Normal,
        &format!("Exported model and metadata to {}", args.output.display()),
    );

    Ok(())
}
