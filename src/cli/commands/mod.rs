//! CLI command handlers

mod export;
mod runs;
mod serve;
mod train;

use crate::cli::LogLevel;
use crate::config::{Cli, Command};

/// Dispatch a parsed CLI invocation to its command handler
pub fn run_command(cli: Cli) -> Result<(), String> {
    let log_level = LogLevel::from_flags(cli.quiet, cli.verbose);

    match cli.command {
        Command::Train(args) => train::run_train(args, log_level),
        Command::Export(args) => export::run_export(args, log_level),
        Command::Runs(args) => runs::run_runs(args),
        Command::Serve(args) => serve::run_serve(args, log_level),
    }
}
