use std::sync::Arc;

use streak_db::Database;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uptime_probe::UptimeProber;

use crate::config::AppConfig;
use crate::server::page::PageTemplate;
use crate::services::streak::{StreakSnapshot, StreakTracker};
use crate::services::uptime::ProbeReport;

/// Application context shared by axum handlers and background jobs.
#[derive(Clone)]
pub struct SharedState {
    inner: Arc<SharedStateInner>,
}

struct SharedStateInner {
    /// Application configuration
    config: RwLock<AppConfig>,
    /// Database handle
    db: Database,
    tracker: StreakTracker,
    prober: UptimeProber,
    page: PageTemplate,
    /// Result of the most recent probe
    last_probe: RwLock<Option<ProbeReport>>,
    /// Last snapshot read successfully, served when the store is unavailable
    last_snapshot: RwLock<StreakSnapshot>,
    shutdown_token: CancellationToken,
}

impl SharedState {
    /// Create shared state from an already-opened database and loaded config.
    pub fn new(db: Database, config: AppConfig) -> Result<Self, anyhow::Error> {
        let prober = UptimeProber::new(config.probe_timeout())?;
        let page = PageTemplate::load(&config.template_dir);

        Ok(Self {
            inner: Arc::new(SharedStateInner {
                tracker: StreakTracker::new(db.clone()),
                config: RwLock::new(config),
                db,
                prober,
                page,
                last_probe: RwLock::new(None),
                last_snapshot: RwLock::new(StreakSnapshot::default()),
                shutdown_token: CancellationToken::new(),
            }),
        })
    }

    pub fn server_port(&self) -> u16 {
        // Read from config; fallback to 8888.
        self.inner
            .config
            .try_read()
            .map(|c| c.server_port)
            .unwrap_or(8888)
    }

    pub fn db(&self) -> &Database {
        &self.inner.db
    }

    pub fn tracker(&self) -> &StreakTracker {
        &self.inner.tracker
    }

    pub fn prober(&self) -> &UptimeProber {
        &self.inner.prober
    }

    pub fn page(&self) -> &PageTemplate {
        &self.inner.page
    }

    pub fn shutdown_token(&self) -> &CancellationToken {
        &self.inner.shutdown_token
    }

    /// Get a read lock on the current config.
    pub async fn config(&self) -> tokio::sync::RwLockReadGuard<'_, AppConfig> {
        self.inner.config.read().await
    }

    pub async fn last_probe(&self) -> Option<ProbeReport> {
        self.inner.last_probe.read().await.clone()
    }

    pub async fn set_last_probe(&self, report: ProbeReport) {
        *self.inner.last_probe.write().await = Some(report);
    }

    pub async fn last_snapshot(&self) -> StreakSnapshot {
        self.inner.last_snapshot.read().await.clone()
    }

    pub async fn remember_snapshot(&self, snapshot: StreakSnapshot) {
        *self.inner.last_snapshot.write().await = snapshot;
    }
}
