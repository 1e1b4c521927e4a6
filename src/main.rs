//! Elegir CLI
//!
//! Pipeline entry point: train a grid of classifier variants, export the
//! best one, and serve it.
//!
//! # Usage
//!
//! ```bash
//! # Run the full hyperparameter sweep
//! elegir train --runs-dir runs
//!
//! # Export the best run's model for serving
//! elegir export --runs-dir runs --output model
//!
//! # Inspect recorded runs
//! elegir runs --runs-dir runs --format json
//!
//! # Serve the exported model
//! elegir serve --model-dir model --address 127.0.0.1:8000
//! ```

use clap::Parser;
use elegir::cli::run_command;
use elegir::config::Cli;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run_command(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}
