//! `elegir serve`: serve the exported model over HTTP

use tracing_subscriber::EnvFilter;

use crate::cli::logging::{log, LogLevel};
use crate::config::ServeArgs;
use crate::server::{run_server, ServerConfig, ServingContext};

pub fn run_serve(args: ServeArgs, log_level: LogLevel) -> Result<(), String> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if log_level == LogLevel::Quiet { "warn" } else { "info" }));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let context = ServingContext::load(&args.model_dir);
    log(
        log_level,
        LogLevel::Normal,
        &format!(
            "Serving on http://{} (model_loaded={})",
            args.address,
            context.model_loaded()
        ),
    );

    let config = ServerConfig {
        address: args.address,
        model_dir: args.model_dir,
    };

    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;
    runtime
        .block_on(run_server(config, context))
        .map_err(|e| format!("Server error: {e}"))
}
