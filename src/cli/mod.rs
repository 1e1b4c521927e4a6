//! CLI module
//!
//! Command handlers and output utilities for the `elegir` binary.

mod commands;
mod logging;

pub use commands::run_command;
pub use logging::LogLevel;
