//! API Routes
//!
//! - `POST /api/` - Answer a question, optionally about an uploaded file
//! - `GET /api/health` - Liveness probe

pub mod ask;
pub mod health;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::middleware::cors_layer;
use crate::models::AppState;

/// Create the main application router
pub fn create_router(state: AppState) -> Router {
    info!("Creating application router");

    let cors = cors_layer(&state.config);
    let body_limit = DefaultBodyLimit::max(state.config.server.max_upload_bytes);

    Router::new()
        .merge(ask::router(state))
        .merge(health::router())
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
