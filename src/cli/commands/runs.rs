//! `elegir runs`: list an experiment's recorded runs

use crate::config::{OutputFormat, RunsArgs};
use crate::tracking::storage::{JsonFileStore, RunStore};
use crate::tracking::Run;

pub fn run_runs(args: RunsArgs) -> Result<(), String> {
    let store = JsonFileStore::new(&args.runs_dir);
    let runs = store
        .list_runs(&args.experiment)
        .map_err(|e| format!("Failed to list runs: {e}"))?;

    if runs.is_empty() {
        eprintln!("No runs recorded for experiment '{}'", args.experiment);
        return Ok(());
    }

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&runs)
                .map_err(|e| format!("JSON serialization failed: {e}"))?;
            println!("{json}");
        }
        OutputFormat::Table => {
            println!(
                "{:<10} {:<20} {:<14} {:<11} {:<20}",
                "ID", "MODEL", "VAL_ACCURACY", "STATUS", "STARTED"
            );
            println!("{}", "-".repeat(77));
            for run in &runs {
                println!(
                    "{:<10} {:<20} {:<14} {:<11} {:<20}",
                    run.run_id,
                    model_name(run),
                    run.val_accuracy()
                        .map_or_else(|| "-".to_string(), |a| format!("{a:.4}")),
                    format!("{:?}", run.status).to_lowercase(),
                    started_at(run),
                );
            }
            println!("\n{} run(s)", runs.len());
        }
    }

    Ok(())
}

fn model_name(run: &Run) -> &str {
    run.params.get("model_name").map_or("-", String::as_str)
}

fn started_at(run: &Run) -> String {
    run.start_time_ms
        .and_then(|ms| chrono::DateTime::from_timestamp_millis(ms as i64))
        .map_or_else(
            || "-".to_string(),
            |t| t.format("%Y-%m-%d %H:%M:%S").to_string(),
        )
}
