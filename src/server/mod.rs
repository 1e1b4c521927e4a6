//! HTTP serving façade
//!
//! Loads the exported artifact once at startup into an immutable
//! [`ServingContext`](state::ServingContext) and serves three endpoints:
//!
//! - `GET /health` → `{status, model_loaded}`
//! - `POST /predict` with three numeric features → `{prediction, model}`
//! - `GET /metrics` → Prometheus text exposition
//!
//! When no artifact is present the façade serves a hand-written linear
//! scoring formula under the model name `"dummy"`; a missing model is a
//! degraded mode, not an error.

mod handlers;
mod metrics;
mod state;

pub use metrics::Metrics;
pub use state::{AppState, LoadedModel, ServingContext, DUMMY_MODEL_NAME};

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use serde::{Deserialize, Serialize};

/// Server errors
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for server operations
pub type Result<T> = std::result::Result<T, ServerError>;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    pub address: SocketAddr,
    /// Directory holding the exported model and metadata
    pub model_dir: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            address: SocketAddr::from(([127, 0, 0, 1], 8000)),
            model_dir: PathBuf::from("model"),
        }
    }
}

/// `GET /health` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub model_loaded: bool,
}

/// `POST /predict` request body: one sample's three features
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub x1: f64,
    pub x2: f64,
    pub x3: f64,
}

/// `POST /predict` response body
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub prediction: f64,
    /// The exported model's name, or `"dummy"` for the fallback
    pub model: String,
}

/// Build the router over a shared serving context
#[must_use]
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/predict", post(handlers::predict))
        .route("/metrics", get(handlers::metrics))
        .with_state(state)
}

/// Bind and serve until the process is terminated
pub async fn run_server(config: ServerConfig, context: ServingContext) -> Result<()> {
    let state: AppState = Arc::new(context);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(config.address)
        .await
        .map_err(|source| ServerError::Bind {
            addr: config.address,
            source,
        })?;
    tracing::info!(address = %config.address, "serving façade listening");

    axum::serve(listener, app).await?;
    Ok(())
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.address.port(), 8000);
        assert_eq!(config.model_dir, PathBuf::from("model"));
    }

    #[test]
    fn test_predict_request_deserializes() {
        let json = r#"{"x1": 0.5, "x2": -0.2, "x3": 1.0}"#;
        let req: PredictRequest = serde_json::from_str(json).unwrap();
        assert_eq!(req.x1, 0.5);
        assert_eq!(req.x2, -0.2);
        assert_eq!(req.x3, 1.0);
    }

    #[test]
    fn test_predict_request_rejects_missing_feature() {
        let json = r#"{"x1": 0.5, "x2": -0.2}"#;
        assert!(serde_json::from_str::<PredictRequest>(json).is_err());
    }

    #[test]
    fn test_health_response_serializes() {
        let health = HealthResponse {
            status: "ok".to_string(),
            model_loaded: false,
        };
        let json = serde_json::to_string(&health).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"model_loaded\":false"));
    }

    #[test]
    fn test_predict_response_serializes() {
        let response = PredictResponse {
            prediction: 0.42,
            model: DUMMY_MODEL_NAME.to_string(),
        };
        let json = serde_json::to_string(&response).unwrap();
        assert!(json.contains("\"prediction\":0.42"));
        assert!(json.contains("\"model\":\"dummy\""));
    }

    #[test]
    fn test_build_router_accepts_dummy_context() {
        let state: AppState = Arc::new(ServingContext::dummy());
        let _router = build_router(state);
    }
}
