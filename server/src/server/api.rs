//! JSON endpoints for the current streak and service status.

use axum::Json;
use axum::extract::State;
use serde_json::{Value, json};

use crate::app::SharedState;

type ApiResult = Result<Json<Value>, (axum::http::StatusCode, Json<Value>)>;

/// Standard error response.
pub fn err_json(status: u16, message: &str) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::from_u16(status)
            .unwrap_or(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
        Json(json!({ "status": "error", "error": message })),
    )
}

/// GET /status
pub async fn status(State(state): State<SharedState>) -> Json<Value> {
    let target_url = state.config().await.target_url.clone();
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "target_url": target_url,
        "last_probe": state.last_probe().await,
    }))
}

/// GET /api/streak
pub async fn streak(State(state): State<SharedState>) -> ApiResult {
    let size = state.config().await.leaderboard_size;
    let db = state.db().clone();
    let tracker = state.tracker().clone();
    let (snapshot, archived) = tokio::task::spawn_blocking(move || {
        Ok::<_, streak_db::DbError>((tracker.snapshot(size)?, db.count_history()?))
    })
    .await
    .map_err(|e| err_json(500, &e.to_string()))?
    .map_err(|e| err_json(500, &e.to_string()))?;

    Ok(Json(json!({
        "value": snapshot.value,
        "digits": super::page::digits(snapshot.value),
        "archived_streaks": archived,
        "leaderboard": snapshot.leaderboard,
    })))
}
