//! Static file serving from the configured asset directory.

use std::path::Path;

use axum::http::{StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use serde_json::json;
use tower_http::services::ServeDir;

pub fn static_files(dir: &Path) -> ServeDir {
    if !dir.is_dir() {
        tracing::warn!("Static directory {} does not exist", dir.display());
    }
    ServeDir::new(dir)
}

/// Fallback handler for unmatched paths.
pub async fn not_found(uri: Uri) -> Response {
    (
        StatusCode::NOT_FOUND,
        axum::Json(json!({
            "error": "Not Found",
            "path": uri.path(),
        })),
    )
        .into_response()
}
