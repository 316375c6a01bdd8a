//! Runtime application configuration loaded from DB + environment overrides.

use std::path::PathBuf;
use std::time::Duration;

use chrono::NaiveTime;
use chrono_tz::Tz;

use super::manager::SettingsManager;

/// Runtime configuration populated from the settings DB.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub server_port: u16,
    pub target_url: String,
    pub probe_interval_secs: u64,
    pub probe_timeout_secs: u64,
    pub increment_time: NaiveTime,
    pub timezone: String,
    pub leaderboard_size: usize,
    pub static_dir: PathBuf,
    pub template_dir: PathBuf,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server_port: 8888,
            target_url: "https://www.cian.ru/".into(),
            probe_interval_secs: 60,
            probe_timeout_secs: uptime_probe::DEFAULT_TIMEOUT.as_secs(),
            increment_time: NaiveTime::MIN,
            timezone: "Europe/Moscow".into(),
            leaderboard_size: 8,
            static_dir: PathBuf::from("static"),
            template_dir: PathBuf::from("templates"),
        }
    }
}

impl AppConfig {
    /// Load configuration from the settings manager (DB-first, env overrides).
    pub fn load(sm: &SettingsManager) -> Result<Self, anyhow::Error> {
        let g = |key: &str| -> String { sm.get_setting(key).unwrap_or_default() };
        let defaults = Self::default();

        let mut server_port = parse_or(&g("SERVER_PORT"), defaults.server_port);

        // Environment variable override (backwards compatibility)
        if let Ok(v) = std::env::var("SERVER_PORT") {
            if let Ok(p) = v.parse::<u16>() {
                server_port = p;
            }
        }

        Ok(Self {
            server_port,
            target_url: non_empty_or(g("TARGET_URL"), defaults.target_url),
            probe_interval_secs: parse_or(&g("PROBE_INTERVAL_SECS"), defaults.probe_interval_secs)
                .max(1),
            probe_timeout_secs: parse_or(&g("PROBE_TIMEOUT_SECS"), defaults.probe_timeout_secs)
                .max(1),
            increment_time: NaiveTime::parse_from_str(&g("INCREMENT_TIME"), "%H:%M")
                .unwrap_or(defaults.increment_time),
            timezone: non_empty_or(g("TIMEZONE"), defaults.timezone),
            leaderboard_size: parse_or(&g("LEADERBOARD_SIZE"), defaults.leaderboard_size),
            static_dir: PathBuf::from(non_empty_or(g("STATIC_DIR"), "static".into())),
            template_dir: PathBuf::from(non_empty_or(g("TEMPLATE_DIR"), "templates".into())),
        })
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    /// Configured timezone, falling back to Moscow time when unparseable.
    pub fn tz(&self) -> Tz {
        parse_timezone(&self.timezone)
    }
}

fn parse_timezone(name: &str) -> Tz {
    name.parse::<Tz>().unwrap_or(chrono_tz::Europe::Moscow)
}

fn parse_or<T: std::str::FromStr>(s: &str, default: T) -> T {
    if s.is_empty() {
        return default;
    }
    s.parse().unwrap_or(default)
}

fn non_empty_or(s: String, default: String) -> String {
    if s.trim().is_empty() { default } else { s }
}
