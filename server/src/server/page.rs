//! The streak page: counter digits plus the high-score table.

use std::path::Path;

use axum::extract::State;
use axum::response::Html;
use chrono_tz::Tz;
use streak_db::HistoryRecord;

use crate::app::SharedState;
use crate::services::streak::StreakSnapshot;

const TEMPLATE_FILE: &str = "count.html";
const BUILTIN_TEMPLATE: &str = include_str!("../../templates/count.html");
const STATIC_PREFIX: &str = "/static/";

/// Page layout with `{{ digits }}`, `{{ leaderboard }}` and
/// `{{ static_prefix }}` placeholders.
#[derive(Debug, Clone)]
pub struct PageTemplate {
    source: String,
}

impl PageTemplate {
    /// Load `count.html` from the template directory, or the built-in layout.
    pub fn load(template_dir: &Path) -> Self {
        let path = template_dir.join(TEMPLATE_FILE);
        match std::fs::read_to_string(&path) {
            Ok(source) => {
                tracing::info!("Using page template {}", path.display());
                Self { source }
            }
            Err(e) => {
                tracing::info!("No page template at {} ({e}), using built-in", path.display());
                Self::builtin()
            }
        }
    }

    pub fn builtin() -> Self {
        Self {
            source: BUILTIN_TEMPLATE.to_string(),
        }
    }

    pub fn render(&self, snapshot: &StreakSnapshot, tz: Tz) -> String {
        self.source
            .replace("{{ static_prefix }}", STATIC_PREFIX)
            .replace("{{ digits }}", &render_digits(snapshot.value))
            .replace("{{ leaderboard }}", &render_leaderboard(&snapshot.leaderboard, tz))
    }
}

/// Streak value zero-padded to four digits. Longer values keep all digits.
pub fn digits(value: i64) -> String {
    format!("{:04}", value.max(0))
}

/// `DD Month YYYY HH:MM` in the page timezone.
pub fn format_date(at: &chrono::DateTime<chrono::Utc>, tz: Tz) -> String {
    at.with_timezone(&tz).format("%d %B %Y %H:%M").to_string()
}

fn render_digits(value: i64) -> String {
    digits(value)
        .chars()
        .map(|d| format!("<span class=\"digit\">{d}</span>"))
        .collect()
}

fn render_leaderboard(records: &[HistoryRecord], tz: Tz) -> String {
    if records.is_empty() {
        return "<p class=\"leaderboard-empty\">No downtime recorded yet.</p>".to_string();
    }
    let rows: String = records
        .iter()
        .map(|r| {
            format!(
                "<li><span class=\"score\">{}</span> <span class=\"range\">{} &ndash; {}</span></li>",
                r.score,
                format_date(&r.started_at, tz),
                format_date(&r.ended_at, tz),
            )
        })
        .collect();
    format!("<ol class=\"leaderboard\">{rows}</ol>")
}

/// Read the current snapshot, falling back to the last good one on store errors.
pub async fn current_snapshot(state: &SharedState) -> StreakSnapshot {
    let size = state.config().await.leaderboard_size;
    let tracker = state.tracker().clone();
    match tokio::task::spawn_blocking(move || tracker.snapshot(size)).await {
        Ok(Ok(snapshot)) => {
            state.remember_snapshot(snapshot.clone()).await;
            snapshot
        }
        Ok(Err(e)) => {
            tracing::error!("Failed to read streak, serving last snapshot: {e}");
            state.last_snapshot().await
        }
        Err(e) => {
            tracing::error!("Streak read task failed, serving last snapshot: {e}");
            state.last_snapshot().await
        }
    }
}

/// GET /
pub async fn index(State(state): State<SharedState>) -> Html<String> {
    let snapshot = current_snapshot(&state).await;
    let tz = state.config().await.tz();
    Html(state.page().render(&snapshot, tz))
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use streak_db::Database;

    use super::*;
    use crate::config::AppConfig;

    fn record(score: i64) -> HistoryRecord {
        HistoryRecord {
            id: score,
            score,
            started_at: Utc.with_ymd_and_hms(2017, 5, 1, 7, 0, 0).unwrap(),
            ended_at: Utc.with_ymd_and_hms(2017, 6, 9, 21, 5, 0).unwrap(),
        }
    }

    #[test]
    fn digits_are_zero_padded() {
        assert_eq!(digits(7), "0007");
        assert_eq!(digits(0), "0000");
        assert_eq!(digits(1234), "1234");
        assert_eq!(digits(12345), "12345");
        let chars: Vec<char> = digits(7).chars().collect();
        assert_eq!(chars, vec!['0', '0', '0', '7']);
    }

    #[test]
    fn dates_use_page_timezone() {
        let at = Utc.with_ymd_and_hms(2017, 6, 9, 21, 5, 0).unwrap();
        assert_eq!(format_date(&at, chrono_tz::UTC), "09 June 2017 21:05");
        assert_eq!(
            format_date(&at, chrono_tz::Europe::Moscow),
            "10 June 2017 00:05"
        );
    }

    #[test]
    fn render_fills_placeholders() {
        let page = PageTemplate {
            source: "<link href=\"{{ static_prefix }}style.css\">{{ digits }}|{{ leaderboard }}"
                .into(),
        };
        let snapshot = StreakSnapshot {
            value: 7,
            leaderboard: vec![record(3)],
        };
        let html = page.render(&snapshot, chrono_tz::UTC);

        assert!(html.starts_with("<link href=\"/static/style.css\">"));
        assert!(html.contains(
            "<span class=\"digit\">0</span><span class=\"digit\">0</span>\
             <span class=\"digit\">0</span><span class=\"digit\">7</span>"
        ));
        assert!(html.contains("<span class=\"score\">3</span>"));
        assert!(html.contains("01 May 2017 07:00 &ndash; 09 June 2017 21:05"));
    }

    #[test]
    fn empty_leaderboard_renders_placeholder_text() {
        let html = PageTemplate::builtin().render(&StreakSnapshot::default(), chrono_tz::UTC);
        assert!(html.contains("No downtime recorded yet."));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn missing_template_dir_uses_builtin() {
        let dir = tempfile::tempdir().unwrap();
        let page = PageTemplate::load(&dir.path().join("missing"));
        assert_eq!(page.source, BUILTIN_TEMPLATE);

        std::fs::write(dir.path().join(TEMPLATE_FILE), "custom {{ digits }}").unwrap();
        let page = PageTemplate::load(dir.path());
        let html = page.render(&StreakSnapshot::default(), chrono_tz::UTC);
        assert!(html.starts_with("custom <span class=\"digit\">0</span>"));
    }

    #[tokio::test]
    async fn index_renders_current_streak() {
        let state =
            SharedState::new(Database::open_in_memory().unwrap(), AppConfig::default()).unwrap();
        for _ in 0..7 {
            state.tracker().increment().unwrap();
        }

        let Html(html) = index(State(state.clone())).await;
        assert!(html.contains("<span class=\"digit\">7</span>"));
        assert_eq!(state.last_snapshot().await.value, 7);
    }

    #[tokio::test]
    async fn store_failure_serves_last_snapshot() {
        let state =
            SharedState::new(Database::open_in_memory().unwrap(), AppConfig::default()).unwrap();
        for _ in 0..42 {
            state.tracker().increment().unwrap();
        }
        let Html(first) = index(State(state.clone())).await;

        state
            .db()
            .with_conn(|conn| Ok(conn.execute_batch("DROP TABLE counters;")?))
            .unwrap();
        assert!(state.tracker().current_value().is_err());

        let Html(second) = index(State(state.clone())).await;
        assert_eq!(first, second);
        assert!(second.contains(
            "<span class=\"digit\">0</span><span class=\"digit\">0</span>\
             <span class=\"digit\">4</span><span class=\"digit\">2</span>"
        ));
    }
}
