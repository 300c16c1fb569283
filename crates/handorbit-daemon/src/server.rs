//! Web server setup and routing

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::info;

use crate::api;
use crate::state::AppState;
use crate::ws;

/// Build the application router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // API routes
        .route("/api/health", get(api::health))
        .route("/api/camera", get(api::get_camera))
        .route("/api/camera/reset", post(api::reset_camera))
        .route("/api/frames", post(api::submit_frame))
        .route("/api/config", get(api::get_config))
        // WebSocket for frame streaming and view updates
        .route("/ws", get(ws::websocket_handler))
        // Static files (tracking frontend)
        .fallback_service(ServeDir::new(&state.config.daemon.web_root))
        // CORS
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        // State
        .with_state(state)
}

/// Run the web server
pub async fn run(state: Arc<AppState>, bind: &str) -> Result<()> {
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(bind).await?;
    info!(address = %bind, protocol = "HTTP", "Starting web server");
    axum::serve(listener, app).await?;
    Ok(())
}
