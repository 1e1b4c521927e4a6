//! HTTP request handlers
//!
//! Axum handlers for the serving façade. All state flows in through the
//! shared [`AppState`](super::state::AppState); handlers never touch
//! globals.

use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::Json;

use super::state::AppState;
use super::{HealthResponse, PredictRequest, PredictResponse};

/// `GET /health`
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    state.metrics().record_health();
    Json(HealthResponse {
        status: "ok".to_string(),
        model_loaded: state.model_loaded(),
    })
}

/// `POST /predict`
pub async fn predict(
    State(state): State<AppState>,
    Json(payload): Json<PredictRequest>,
) -> Json<PredictResponse> {
    let started = Instant::now();
    let (prediction, model) = state.score(payload.x1, payload.x2, payload.x3);
    let response = PredictResponse {
        prediction,
        model: model.to_string(),
    };
    state.metrics().record_predict(started.elapsed());
    Json(response)
}

/// `GET /metrics`
pub async fn metrics(
    State(state): State<AppState>,
) -> (StatusCode, [(header::HeaderName, &'static str); 1], String) {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics().render(),
    )
}
