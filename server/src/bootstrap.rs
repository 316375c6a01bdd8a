use std::path::PathBuf;

use chrono::Utc;
use streak_db::Database;

use crate::app::SharedState;
use crate::config::{AppConfig, SettingsManager};
use crate::services::scheduler;

/// Foundation init: data directory, database, settings (fatal on error).
pub fn init_foundation() -> Result<(Database, AppConfig, PathBuf), anyhow::Error> {
    load_dotenv();
    let dir = data_dir();
    std::fs::create_dir_all(&dir)?;

    let db_path = dir.join("streak.db");
    tracing::info!("Opening database at {}", db_path.display());
    let db = Database::open(&db_path)?;

    let sm = SettingsManager::new(db.clone());
    if let Err(e) = sm.migrate_from_env() {
        tracing::error!("Failed to migrate from env: {e}");
    }
    sm.initialize_defaults()?;

    let config = AppConfig::load(&sm)?;
    tracing::info!(
        port = config.server_port,
        target = %config.target_url,
        "Settings loaded"
    );

    // Old tables stored naive local times; read them in the page timezone.
    db.import_legacy_tables(&config.tz(), Utc::now())?;
    Ok((db, config, dir))
}

/// Spawn the scheduled jobs (non-fatal).
pub fn spawn_background_tasks(state: &SharedState) {
    // Daily streak increment
    let s = state.clone();
    tokio::spawn(async move { scheduler::increment_loop(s).await });

    // Uptime probe (fires immediately, then every interval)
    let s = state.clone();
    tokio::spawn(async move { scheduler::probe_loop(s).await });
}

/// Determine the data directory for the application.
/// Priority: STREAK_DATA_DIR env var > ~/.uptime-streak
fn data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("STREAK_DATA_DIR") {
        return PathBuf::from(dir);
    }
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".uptime-streak")
}

/// Load .env from multiple candidate paths.
fn load_dotenv() {
    let candidates = [".env", "../.env", "../../.env"];
    for path in &candidates {
        if dotenvy::from_filename(path).is_ok() {
            tracing::info!("Loaded .env from: {path}");
            return;
        }
    }
    tracing::info!("No .env file found, using system environment variables");
}
