//! CLI argument parsing
//!
//! # Usage
//!
//! ```bash
//! elegir train --runs-dir runs
//! elegir export --runs-dir runs --output model
//! elegir runs --runs-dir runs --format json
//! elegir serve --model-dir model --address 127.0.0.1:8000
//! ```

use std::ffi::OsString;
use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Experiment name used when none is given
pub const DEFAULT_EXPERIMENT: &str = "synthetic-multi-model";

/// Top-level CLI
#[derive(Debug, Parser)]
#[command(name = "elegir", version, about = "Train, track, select, export, and serve toy classifiers")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Suppress all output
    #[arg(long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Print per-run details
    #[arg(long, global = true)]
    pub verbose: bool,
}

/// Subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the full hyperparameter sweep, recording one run per combination
    Train(TrainArgs),
    /// Export the best run's model and metadata for serving
    Export(ExportArgs),
    /// List an experiment's recorded runs
    Runs(RunsArgs),
    /// Serve the exported model over HTTP
    Serve(ServeArgs),
}

/// Arguments for `elegir train`
#[derive(Debug, clap::Args)]
pub struct TrainArgs {
    /// Run store root directory
    #[arg(long, default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Experiment name to record runs under
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Samples in the generated dataset
    #[arg(long, default_value_t = 400)]
    pub n_samples: usize,
}

/// Arguments for `elegir export`
#[derive(Debug, clap::Args)]
pub struct ExportArgs {
    /// Run store root directory
    #[arg(long, default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Experiment to select the best run from
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Export directory for the model and metadata
    #[arg(long, default_value = "model")]
    pub output: PathBuf,
}

/// Arguments for `elegir runs`
#[derive(Debug, clap::Args)]
pub struct RunsArgs {
    /// Run store root directory
    #[arg(long, default_value = "runs")]
    pub runs_dir: PathBuf,

    /// Experiment to list
    #[arg(long, default_value = DEFAULT_EXPERIMENT)]
    pub experiment: String,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    pub format: OutputFormat,
}

/// Arguments for `elegir serve`
#[derive(Debug, clap::Args)]
pub struct ServeArgs {
    /// Directory holding the exported model
    #[arg(long, default_value = "model")]
    pub model_dir: PathBuf,

    /// Listen address
    #[arg(long, default_value = "127.0.0.1:8000")]
    pub address: SocketAddr,
}

/// Output format for listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

/// Parse arguments, returning a clap error on invalid input
///
/// Split out from `Cli::parse` so tests can drive the parser directly.
pub fn parse_args<I, T>(args: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Cli::try_parse_from(args)
}
