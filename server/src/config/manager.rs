//! SettingsManager: DB-backed settings with defaults and env migration.

use streak_db::Database;

use super::defaults::DEFAULT_SETTINGS;
use super::validation::validate_setting;

/// Wraps [`Database`] to provide high-level settings operations.
pub struct SettingsManager {
    db: Database,
}

impl SettingsManager {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Get a setting value. Falls back to default if not in DB.
    pub fn get_setting(&self, key: &str) -> Result<String, anyhow::Error> {
        if let Some(val) = self.db.get_setting(key)? {
            return Ok(val);
        }
        if let Some(def) = DEFAULT_SETTINGS.get(key) {
            return Ok(def.default.to_string());
        }
        anyhow::bail!("setting not found: {key}");
    }

    /// Set a setting value with validation.
    pub fn set_setting(&self, key: &str, value: &str) -> Result<(), anyhow::Error> {
        if !DEFAULT_SETTINGS.contains_key(key) {
            anyhow::bail!("unknown setting key: {key}");
        }
        validate_setting(key, value)
            .map_err(|e| anyhow::anyhow!("validation error for {key}: {e}"))?;
        self.db.set_setting(key, value)?;
        Ok(())
    }

    /// Initialize default settings in DB (skip existing).
    pub fn initialize_defaults(&self) -> Result<(), anyhow::Error> {
        for (key, def) in DEFAULT_SETTINGS.iter() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            self.db.set_setting(key, def.default)?;
        }
        Ok(())
    }

    /// Copy settings from environment variables into the DB (one-time).
    ///
    /// Keys already present in the DB are left alone; invalid values are
    /// skipped with a warning.
    pub fn migrate_from_env(&self) -> Result<u32, anyhow::Error> {
        self.migrate_from(|key| std::env::var(key).ok())
    }

    fn migrate_from(&self, lookup: impl Fn(&str) -> Option<String>) -> Result<u32, anyhow::Error> {
        let mut migrated = 0u32;
        for &key in DEFAULT_SETTINGS.keys() {
            if self.db.get_setting(key)?.is_some() {
                continue;
            }
            let Some(env_val) = lookup(key).filter(|v| !v.is_empty()) else {
                continue;
            };
            if let Err(e) = validate_setting(key, &env_val) {
                tracing::warn!("Ignoring invalid {key} from env: {e}");
                continue;
            }
            self.db.set_setting(key, &env_val)?;
            tracing::info!("Migrated setting from env: {key}");
            migrated += 1;
        }
        if migrated > 0 {
            tracing::info!("Migration completed: {migrated} settings migrated");
        }
        Ok(migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn manager() -> SettingsManager {
        SettingsManager::new(Database::open_in_memory().unwrap())
    }

    #[test]
    fn get_falls_back_to_default() {
        let sm = manager();
        assert_eq!(sm.get_setting("LEADERBOARD_SIZE").unwrap(), "8");
        assert!(sm.get_setting("NOPE").is_err());
    }

    #[test]
    fn set_validates_and_persists() {
        let sm = manager();
        sm.set_setting("LEADERBOARD_SIZE", "5").unwrap();
        assert_eq!(sm.get_setting("LEADERBOARD_SIZE").unwrap(), "5");

        assert!(sm.set_setting("LEADERBOARD_SIZE", "0").is_err());
        assert!(sm.set_setting("UNKNOWN_KEY", "1").is_err());
        assert_eq!(sm.get_setting("LEADERBOARD_SIZE").unwrap(), "5");
    }

    #[test]
    fn initialize_defaults_keeps_existing_values() {
        let sm = manager();
        sm.set_setting("SERVER_PORT", "9000").unwrap();
        sm.initialize_defaults().unwrap();

        assert_eq!(sm.db.get_setting("SERVER_PORT").unwrap(), Some("9000".into()));
        assert_eq!(
            sm.db.get_setting("TIMEZONE").unwrap(),
            Some("Europe/Moscow".into())
        );
    }

    #[test]
    fn migrate_copies_only_missing_valid_values() {
        let sm = manager();
        sm.set_setting("SERVER_PORT", "9000").unwrap();

        let migrated = sm
            .migrate_from(|key| match key {
                "SERVER_PORT" => Some("7000".into()),
                "TARGET_URL" => Some("https://status.example.com/".into()),
                "PROBE_INTERVAL_SECS" => Some("not-a-number".into()),
                "STATIC_DIR" => Some(String::new()),
                _ => None,
            })
            .unwrap();

        assert_eq!(migrated, 1);
        assert_eq!(sm.get_setting("SERVER_PORT").unwrap(), "9000");
        assert_eq!(
            sm.get_setting("TARGET_URL").unwrap(),
            "https://status.example.com/"
        );
        assert_eq!(sm.db.get_setting("PROBE_INTERVAL_SECS").unwrap(), None);
    }
}
