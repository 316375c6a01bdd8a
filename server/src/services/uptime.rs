//! Probe job body: check the target and end the streak on downtime.

use chrono::{DateTime, Utc};
use serde::Serialize;
use streak_db::{DbError, ResetOutcome};
use uptime_probe::ProbeOutcome;

use crate::app::SharedState;
use crate::services::streak::StreakTracker;

/// Result of the most recent probe, exposed on `/status`.
#[derive(Debug, Clone, Serialize)]
pub struct ProbeReport {
    pub url: String,
    pub checked_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: ProbeOutcome,
    /// Length of the streak archived by this probe, if it caused a reset.
    pub archived_score: Option<i64>,
}

/// Reset the streak when the outcome is confirmed downtime.
pub fn apply_outcome(
    tracker: &StreakTracker,
    outcome: &ProbeOutcome,
) -> Result<Option<ResetOutcome>, DbError> {
    if !outcome.is_unhealthy() {
        return Ok(None);
    }
    tracker.reset()
}

/// Run one probe against the configured URL and apply its outcome.
pub async fn run_probe_once(state: &SharedState) -> Result<ProbeReport, anyhow::Error> {
    let url = state.config().await.target_url.clone();
    let outcome = state.prober().probe(&url).await;

    let reset = if outcome.is_unhealthy() {
        tracing::warn!(url = %url, "Downtime detected, resetting streak");
        let tracker = state.tracker().clone();
        let checked = outcome.clone();
        tokio::task::spawn_blocking(move || apply_outcome(&tracker, &checked)).await??
    } else {
        None
    };

    let report = ProbeReport {
        url,
        checked_at: Utc::now(),
        outcome,
        archived_score: reset.and_then(|r| r.archived).map(|h| h.score),
    };
    state.set_last_probe(report.clone()).await;
    Ok(report)
}
