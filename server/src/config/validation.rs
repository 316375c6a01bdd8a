//! Setting value validation.

use regex::Regex;
use std::sync::LazyLock;

static RE_HH_MM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([01][0-9]|2[0-3]):[0-5][0-9]$").unwrap());

/// Validate a setting value. Returns `Ok(())` if valid, or an error message.
pub fn validate_setting(key: &str, value: &str) -> Result<(), String> {
    match key {
        "SERVER_PORT" => validate_int_range(value, 1, 65535)?,
        "TARGET_URL" => {
            uptime_probe::parse_target(value).map_err(|e| e.to_string())?;
        }
        "PROBE_INTERVAL_SECS" => validate_int_range(value, 5, 3600)?,
        "PROBE_TIMEOUT_SECS" => validate_int_range(value, 1, 300)?,
        "INCREMENT_TIME" => {
            if !RE_HH_MM.is_match(value) {
                return Err("must be HH:MM (24-hour)".into());
            }
        }
        "TIMEZONE" => {
            value
                .parse::<chrono_tz::Tz>()
                .map_err(|_| format!("unknown timezone: {value}"))?;
        }
        "LEADERBOARD_SIZE" => validate_int_range(value, 1, 100)?,
        "STATIC_DIR" | "TEMPLATE_DIR" => {
            if value.trim().is_empty() {
                return Err("path must not be empty".into());
            }
        }
        _ => {}
    }
    Ok(())
}

fn validate_int_range(value: &str, min: i64, max: i64) -> Result<(), String> {
    let v: i64 = value.parse().map_err(|_| "must be an integer")?;
    if !(min..=max).contains(&v) {
        return Err(format!("must be between {min} and {max}"));
    }
    Ok(())
}
