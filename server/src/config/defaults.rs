//! All setting definitions with their default values.

use std::collections::HashMap;
use std::sync::LazyLock;

type DefTuple = (&'static str, &'static str, &'static str);

const DEFS: &[DefTuple] = &[
    ("SERVER_PORT", "8888", "HTTP listen port"),
    ("TARGET_URL", "https://www.cian.ru/", "Website whose uptime is tracked"),
    ("PROBE_INTERVAL_SECS", "60", "Seconds between uptime probes"),
    ("PROBE_TIMEOUT_SECS", "20", "Timeout of a single probe request"),
    ("INCREMENT_TIME", "00:00", "Local wall-clock time (HH:MM) of the daily increment"),
    ("TIMEZONE", "Europe/Moscow", "Timezone for the daily increment and page dates"),
    ("LEADERBOARD_SIZE", "8", "Number of past streaks shown on the page"),
    ("STATIC_DIR", "static", "Directory served under /static"),
    ("TEMPLATE_DIR", "templates", "Directory holding an optional count.html override"),
];

/// A single setting definition.
#[derive(Debug, Clone)]
pub struct SettingDef {
    pub key: &'static str,
    pub default: &'static str,
    pub description: &'static str,
}

/// Global setting definitions indexed by key.
pub static DEFAULT_SETTINGS: LazyLock<HashMap<&'static str, SettingDef>> = LazyLock::new(|| {
    DEFS.iter()
        .map(|&(key, default, description)| {
            (
                key,
                SettingDef {
                    key,
                    default,
                    description,
                },
            )
        })
        .collect()
});
