//! Named counters holding the length of the running streak.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::history::HistoryRecord;
use crate::{Database, DbError, OptionalExt, from_unix};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Counter {
    pub name: String,
    pub value: i64,
    pub started_at: DateTime<Utc>,
}

/// Result of archiving and zeroing a counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetOutcome {
    pub previous: i64,
    /// Present only when the finished streak was longer than zero.
    pub archived: Option<HistoryRecord>,
}

impl Database {
    pub fn get_counter(&self, name: &str) -> Result<Option<Counter>, DbError> {
        self.with_conn(|conn| {
            let row = conn
                .query_row(
                    "SELECT name, COALESCE(value, 0), started_at FROM counters WHERE name = ?1",
                    [name],
                    |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, i64>(1)?,
                            row.get::<_, i64>(2)?,
                        ))
                    },
                )
                .optional()?;
            row.map(|(name, value, started_at)| -> Result<Counter, DbError> {
                Ok(Counter {
                    name,
                    value,
                    started_at: from_unix(started_at)?,
                })
            })
            .transpose()
        })
    }

    /// Current counter value, 0 when the counter has never been created.
    pub fn get_counter_value(&self, name: &str) -> Result<i64, DbError> {
        Ok(self.get_counter(name)?.map_or(0, |c| c.value))
    }

    /// Add one to the counter, creating it with value 1 if absent.
    ///
    /// Returns the value after the increment.
    pub fn increment_counter(&self, name: &str, now: DateTime<Utc>) -> Result<i64, DbError> {
        self.with_conn(|conn| {
            let value = conn.query_row(
                "INSERT INTO counters (name, value, started_at) VALUES (?1, 1, ?2)
                 ON CONFLICT(name) DO UPDATE SET value = COALESCE(value, 0) + 1
                 RETURNING value",
                rusqlite::params![name, now.timestamp()],
                |row| row.get::<_, i64>(0),
            )?;
            Ok(value)
        })
    }

    /// Archive the running streak and zero the counter in one transaction.
    ///
    /// Returns `None` when the counter does not exist; nothing is written in
    /// that case. Zero-length streaks are not archived.
    pub fn reset_counter(
        &self,
        name: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ResetOutcome>, DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let current = tx
                .query_row(
                    "SELECT COALESCE(value, 0), started_at FROM counters WHERE name = ?1",
                    [name],
                    |row| Ok((row.get::<_, i64>(0)?, row.get::<_, i64>(1)?)),
                )
                .optional()?;

            let Some((previous, started_at)) = current else {
                return Ok(None);
            };

            let archived = if previous > 0 {
                tx.execute(
                    "INSERT INTO streak_history (score, started_at, ended_at) VALUES (?1, ?2, ?3)",
                    rusqlite::params![previous, started_at, now.timestamp()],
                )?;
                Some(HistoryRecord {
                    id: tx.last_insert_rowid(),
                    score: previous,
                    started_at: from_unix(started_at)?,
                    ended_at: from_unix(now.timestamp())?,
                })
            } else {
                None
            };

            tx.execute(
                "UPDATE counters SET value = 0, started_at = ?2 WHERE name = ?1",
                rusqlite::params![name, now.timestamp()],
            )?;
            tx.commit()?;

            Ok(Some(ResetOutcome { previous, archived }))
        })
    }
}
