//! Archived streaks (the high-score table).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Database, DbError, from_unix};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryRecord {
    pub id: i64,
    pub score: i64,
    pub started_at: DateTime<Utc>,
    pub ended_at: DateTime<Utc>,
}

impl Database {
    /// Highest scores first; equal scores keep insertion order.
    pub fn get_top_history(&self, limit: usize) -> Result<Vec<HistoryRecord>, DbError> {
        if limit == 0 {
            return Ok(Vec::new());
        }
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, score, started_at, ended_at
                 FROM streak_history
                 ORDER BY score DESC, id ASC
                 LIMIT ?1",
            )?;
            let rows = stmt.query_map([limit], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, i64>(3)?,
                ))
            })?;
            rows.map(|row| -> Result<HistoryRecord, DbError> {
                let (id, score, started_at, ended_at) = row?;
                Ok(HistoryRecord {
                    id,
                    score,
                    started_at: from_unix(started_at)?,
                    ended_at: from_unix(ended_at)?,
                })
            })
            .collect()
        })
    }

    pub fn count_history(&self) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM streak_history", [], |row| {
                row.get::<_, i64>(0)
            })?;
            Ok(count)
        })
    }
}
