//! Background jobs: the daily streak increment and the periodic probe.
//!
//! Each job allows at most one running instance. A tick that fires while the
//! previous run is still in flight is skipped, not queued.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Days, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;
use streak_db::DbError;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, sleep};
use tokio_util::sync::CancellationToken;

use crate::app::SharedState;
use crate::services::uptime;

/// Tracks whether a job instance is currently running.
#[derive(Clone)]
pub struct JobGuard {
    name: &'static str,
    running: Arc<AtomicBool>,
}

/// Held for the duration of one job run; releases the guard on drop.
pub struct RunningJob {
    running: Arc<AtomicBool>,
}

impl Drop for RunningJob {
    fn drop(&mut self) {
        self.running.store(false, Ordering::Release);
    }
}

impl JobGuard {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            running: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Claim the job, or `None` if an instance is already running.
    pub fn try_start(&self) -> Option<RunningJob> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| RunningJob {
                running: self.running.clone(),
            })
    }
}

fn claim(guard: &JobGuard) -> Option<RunningJob> {
    let running = guard.try_start();
    if running.is_none() {
        tracing::warn!(job = guard.name(), "Previous run still in progress, skipping tick");
    }
    running
}

/// Run a blocking job on the blocking pool unless one is already running.
pub fn spawn_blocking_job<F>(guard: &JobGuard, job: F) -> Option<JoinHandle<()>>
where
    F: FnOnce() -> Result<(), DbError> + Send + 'static,
{
    let running = claim(guard)?;
    let name = guard.name();
    Some(tokio::task::spawn_blocking(move || {
        let _running = running;
        if let Err(e) = job() {
            tracing::error!(job = name, "Job failed: {e}");
        }
    }))
}

/// Run an async job on the runtime unless one is already running.
pub fn spawn_async_job<F>(guard: &JobGuard, job: F) -> Option<JoinHandle<()>>
where
    F: Future<Output = anyhow::Result<()>> + Send + 'static,
{
    let running = claim(guard)?;
    let name = guard.name();
    Some(tokio::spawn(async move {
        let _running = running;
        if let Err(e) = job.await {
            tracing::error!(job = name, "Job failed: {e}");
        }
    }))
}

/// Next occurrence of `at` strictly after `now`, in `now`'s timezone.
///
/// Local times that do not exist on a given day (DST gaps) move to the next
/// day on which they do.
pub fn next_daily_fire(now: DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let today = now.date_naive();
    (0..=3)
        .filter_map(|offset| today.checked_add_days(Days::new(offset)))
        .filter_map(|day| tz.from_local_datetime(&day.and_time(at)).earliest())
        .find(|candidate| *candidate > now)
        .unwrap_or_else(|| now + chrono::Duration::days(1))
}

/// Next slot after `now` that has not fired yet.
///
/// A wall clock that reads slightly behind the monotonic sleep would
/// otherwise land on the slot that just fired.
pub fn next_fire_after(
    now: DateTime<Tz>,
    last_fired: Option<DateTime<Tz>>,
    at: NaiveTime,
) -> DateTime<Tz> {
    let from = last_fired.map_or(now, |last| last.max(now));
    next_daily_fire(from, at)
}

async fn sleep_or_cancel(token: &CancellationToken, duration: Duration) -> bool {
    tokio::select! {
        _ = token.cancelled() => true,
        _ = sleep(duration) => false,
    }
}

/// Increment the streak once a day at the configured local time.
pub async fn increment_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();
    let guard = JobGuard::new("increment");
    let mut last_fired: Option<DateTime<Tz>> = None;

    loop {
        let (tz, at) = {
            let config = state.config().await;
            (config.tz(), config.increment_time)
        };
        let now = Utc::now().with_timezone(&tz);
        let next = next_fire_after(now, last_fired, at);
        let wait = (next - now).to_std().unwrap_or(Duration::ZERO);
        tracing::info!(next = %next, "Next streak increment scheduled");

        if sleep_or_cancel(&shutdown_token, wait).await {
            tracing::info!("Increment loop stopped (shutdown)");
            return;
        }

        let tracker = state.tracker().clone();
        spawn_blocking_job(&guard, move || tracker.increment().map(|_| ()));
        last_fired = Some(next);
    }
}

/// Probe the target URL at a fixed interval, starting immediately.
pub async fn probe_loop(state: SharedState) {
    let shutdown_token = state.shutdown_token().clone();
    let guard = JobGuard::new("probe");
    let period = state.config().await.probe_interval();

    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            _ = shutdown_token.cancelled() => {
                tracing::info!("Probe loop stopped (shutdown)");
                return;
            }
            _ = ticker.tick() => {}
        }

        let s = state.clone();
        spawn_async_job(&guard, async move {
            uptime::run_probe_once(&s).await.map(|_| ())
        });
    }
}
