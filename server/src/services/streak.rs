//! Streak tracker: the only writer of the counter and its history.

use chrono::Utc;
use serde::Serialize;
use streak_db::{Database, DbError, HistoryRecord, ResetOutcome};

/// Name of the singleton counter row.
pub const COUNTER_NAME: &str = "days_without_downtime";

/// Current streak plus the best finished streaks, as shown on the page.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct StreakSnapshot {
    pub value: i64,
    pub leaderboard: Vec<HistoryRecord>,
}

#[derive(Clone)]
pub struct StreakTracker {
    db: Database,
    name: String,
}

impl StreakTracker {
    pub fn new(db: Database) -> Self {
        Self {
            db,
            name: COUNTER_NAME.to_string(),
        }
    }

    /// Add one day to the streak, creating the counter on first use.
    pub fn increment(&self) -> Result<i64, DbError> {
        let value = self.db.increment_counter(&self.name, Utc::now())?;
        tracing::info!(counter = %self.name, value, "Streak incremented");
        Ok(value)
    }

    /// End the running streak: archive it (when nonzero) and zero the counter.
    ///
    /// No-op when the counter has never been created.
    pub fn reset(&self) -> Result<Option<ResetOutcome>, DbError> {
        let outcome = self.db.reset_counter(&self.name, Utc::now())?;
        match &outcome {
            Some(ResetOutcome {
                previous,
                archived: Some(record),
            }) => tracing::info!(
                counter = %self.name,
                previous,
                history_id = record.id,
                "Streak reset and archived"
            ),
            Some(ResetOutcome { previous, .. }) => {
                tracing::info!(counter = %self.name, previous, "Streak reset")
            }
            None => tracing::debug!(counter = %self.name, "Reset skipped: counter absent"),
        }
        Ok(outcome)
    }

    pub fn current_value(&self) -> Result<i64, DbError> {
        self.db.get_counter_value(&self.name)
    }

    pub fn top_history(&self, n: usize) -> Result<Vec<HistoryRecord>, DbError> {
        self.db.get_top_history(n)
    }

    pub fn snapshot(&self, leaderboard_size: usize) -> Result<StreakSnapshot, DbError> {
        Ok(StreakSnapshot {
            value: self.current_value()?,
            leaderboard: self.top_history(leaderboard_size)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracker() -> StreakTracker {
        StreakTracker::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn absent_counter_reads_zero() {
        let t = tracker();
        assert_eq!(t.current_value().unwrap(), 0);
        assert!(t.top_history(8).unwrap().is_empty());
    }

    #[test]
    fn increment_then_reset() {
        let t = tracker();
        assert_eq!(t.increment().unwrap(), 1);
        assert_eq!(t.increment().unwrap(), 2);

        let outcome = t.reset().unwrap().unwrap();
        assert_eq!(outcome.previous, 2);
        assert_eq!(outcome.archived.unwrap().score, 2);
        assert_eq!(t.current_value().unwrap(), 0);
    }

    #[test]
    fn reset_without_counter_writes_nothing() {
        let t = tracker();
        assert!(t.reset().unwrap().is_none());
        assert_eq!(t.current_value().unwrap(), 0);
        assert!(t.top_history(8).unwrap().is_empty());
    }

    #[test]
    fn snapshot_combines_value_and_leaderboard() {
        let t = tracker();
        t.increment().unwrap();
        t.reset().unwrap();
        t.increment().unwrap();
        t.increment().unwrap();

        let snapshot = t.snapshot(8).unwrap();
        assert_eq!(snapshot.value, 2);
        assert_eq!(snapshot.leaderboard.len(), 1);
        assert_eq!(snapshot.leaderboard[0].score, 1);
    }
}
