use std::path::Path;

use axum::{Router, routing::get};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;

use super::{api, assets, page};
use crate::app::SharedState;

/// Create the axum router with all routes.
pub fn create_router(state: SharedState, static_dir: &Path) -> Router {
    Router::new()
        // --- Page ---
        .route("/", get(page::index))
        // --- JSON ---
        .route("/status", get(api::status))
        .route("/api/streak", get(api::streak))
        // --- Static assets ---
        .nest_service("/static", assets::static_files(static_dir))
        .fallback(assets::not_found)
        // --- Middleware ---
        .layer(CompressionLayer::new())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
