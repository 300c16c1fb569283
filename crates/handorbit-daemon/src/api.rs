//! REST API handlers

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

use crate::state::{parse_frame, AppState};

/// API error response
#[derive(Serialize)]
struct ApiError {
    error: String,
}

impl ApiError {
    fn new(msg: impl Into<String>) -> Self {
        Self { error: msg.into() }
    }
}

/// Liveness check
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Get the latest camera view
pub async fn get_camera(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.latest().await)
}

/// Reset the camera to its configured starting pose
pub async fn reset_camera(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    info!("Camera reset requested");
    match state.reset_camera().await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"status": "queued"})),
        )
            .into_response(),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::new(e.to_string())),
        )
            .into_response(),
    }
}

/// Submit a single detection frame
///
/// A body that isn't a valid frame is queued as a frame with no hands.
pub async fn submit_frame(State(state): State<Arc<AppState>>, body: String) -> impl IntoResponse {
    match state.submit_frame(parse_frame(&body)).await {
        Ok(()) => (
            StatusCode::ACCEPTED,
            Json(serde_json::json!({"status": "queued"})),
        )
            .into_response(),
        Err(e) => {
            warn!(error = %e, "Failed to queue frame");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ApiError::new(e.to_string())),
            )
                .into_response()
        }
    }
}

/// Get current configuration
pub async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.config.clone())
}
