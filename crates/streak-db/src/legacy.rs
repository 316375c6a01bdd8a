//! One-time import of the old single-file layout (`counter` / `history`).
//!
//! The old layout counted one tick per hour and stored naive local
//! timestamps. Imported streaks keep their real start and end instants and
//! are scored in whole days, the unit the counter uses now.

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use rusqlite::Connection;

use crate::{Database, DbError};

const SECS_PER_HOUR: i64 = 3600;
const HOURS_PER_DAY: i64 = 24;

/// Rows taken over from the old tables.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LegacyImport {
    pub counters: usize,
    pub history: usize,
}

impl Database {
    /// Import and retire the old tables, reading their timestamps as local
    /// time in `tz`.
    ///
    /// Runs in one transaction; the old tables are renamed to `*_legacy` on
    /// success, so a later call is a no-op. On error nothing is imported
    /// and the old tables stay in place.
    pub fn import_legacy_tables<Tz: TimeZone>(
        &self,
        tz: &Tz,
        now: DateTime<Utc>,
    ) -> Result<LegacyImport, DbError> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let mut imported = LegacyImport::default();

            if column_exists(&tx, "counter", "counter")? {
                imported.counters = import_counters(&tx, now)?;
                tx.execute_batch("ALTER TABLE counter RENAME TO counter_legacy;")?;
            }
            if column_exists(&tx, "history", "date")? {
                imported.history = import_history(&tx, tz)?;
                tx.execute_batch("ALTER TABLE history RENAME TO history_legacy;")?;
            }

            tx.commit()?;
            if imported != LegacyImport::default() {
                tracing::info!(
                    counters = imported.counters,
                    history = imported.history,
                    "Imported legacy streak data"
                );
            }
            Ok(imported)
        })
    }
}

/// counter(name, counter) → counters(name, value, started_at)
fn import_counters(conn: &Connection, now: DateTime<Utc>) -> Result<usize, DbError> {
    let rows = {
        let mut stmt =
            conn.prepare("SELECT name, COALESCE(counter, 0) FROM counter WHERE name IS NOT NULL")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut imported = 0;
    for (name, hours) in rows {
        let hours = hours.max(0);
        imported += conn.execute(
            "INSERT OR IGNORE INTO counters (name, value, started_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![name, hours / HOURS_PER_DAY, now.timestamp() - hours * SECS_PER_HOUR],
        )?;
    }
    Ok(imported)
}

/// history(score, date) → streak_history(score, started_at, ended_at)
///
/// Streaks shorter than a day score zero and are dropped, as are rows whose
/// date cannot be read.
fn import_history<Tz: TimeZone>(conn: &Connection, tz: &Tz) -> Result<usize, DbError> {
    let rows = {
        let mut stmt = conn.prepare("SELECT score, date FROM history ORDER BY id")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;
        rows
    };

    let mut imported = 0;
    for (hours, date) in rows {
        let days = hours / HOURS_PER_DAY;
        if days <= 0 {
            continue;
        }
        let Some(ended_at) = parse_local(&date, tz) else {
            tracing::warn!(date = %date, "Skipping legacy history row with unreadable date");
            continue;
        };
        conn.execute(
            "INSERT INTO streak_history (score, started_at, ended_at) VALUES (?1, ?2, ?3)",
            rusqlite::params![days, ended_at - hours * SECS_PER_HOUR, ended_at],
        )?;
        imported += 1;
    }
    Ok(imported)
}

/// Unix time of a naive `YYYY-MM-DD HH:MM:SS[.ffffff]` read in `tz`.
///
/// Ambiguous times take the earlier instant; times inside a DST gap are
/// shifted forward one hour.
fn parse_local<Tz: TimeZone>(raw: &str, tz: &Tz) -> Option<i64> {
    let naive = NaiveDateTime::parse_from_str(raw.trim(), "%Y-%m-%d %H:%M:%S%.f").ok()?;
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.timestamp())
}

fn column_exists(conn: &Connection, table: &str, column: &str) -> Result<bool, DbError> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({})", table))?;
    let exists = stmt
        .query_map([], |row| row.get::<_, String>(1))?
        .any(|name| name.as_deref() == Ok(column));
    Ok(exists)
}
