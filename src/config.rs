//! Runtime configuration
//!
//! Everything comes from environment variables; there is no config file.

use std::path::PathBuf;

use crate::engine::{StreakGate, StreakOptions};

pub const DATABASE_PATH_VAR: &str = "MEALSTREAK_DATABASE_PATH";
pub const STREAK_GATE_VAR: &str = "MEALSTREAK_STREAK_GATE";
pub const REFRESH_SUMMARY_VAR: &str = "MEALSTREAK_REFRESH_SUMMARY";

#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
    pub streaks: StreakOptions,
}

impl Config {
    /// Read the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or unparseable values fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_path = lookup(DATABASE_PATH_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(default_database_path);

        let defaults = StreakOptions::default();

        let gate = match lookup(STREAK_GATE_VAR) {
            Some(raw) => StreakGate::parse(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown {}, using per_type", STREAK_GATE_VAR);
                defaults.gate
            }),
            None => defaults.gate,
        };

        let refresh_summary = match lookup(REFRESH_SUMMARY_VAR) {
            Some(raw) => parse_bool(&raw).unwrap_or_else(|| {
                tracing::warn!(value = %raw, "unknown {}, using true", REFRESH_SUMMARY_VAR);
                defaults.refresh_summary
            }),
            None => defaults.refresh_summary,
        };

        Self {
            database_path,
            streaks: StreakOptions { gate, refresh_summary },
        }
    }
}

fn parse_bool(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `<project>/data/mealstreak.db`, located from the executable
fn default_database_path() -> PathBuf {
    let mut path = std::env::current_exe()
        .ok()
        .and_then(|p| p.parent().map(|p| p.to_path_buf()))
        .unwrap_or_else(|| PathBuf::from("."));

    // Go up from target/release or target/debug to project root
    if path.ends_with("release") || path.ends_with("debug") {
        if let Some(grandparent) = path.parent().and_then(|p| p.parent()) {
            path = grandparent.to_path_buf();
        }
    }

    path.push("data");
    path.push("mealstreak.db");
    path
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(vars: &[(&str, &str)]) -> Config {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let cfg = config(&[]);
        assert!(cfg.database_path.ends_with("data/mealstreak.db"));
        assert_eq!(cfg.streaks, StreakOptions::default());
    }

    #[test]
    fn test_overrides() {
        let cfg = config(&[
            (DATABASE_PATH_VAR, "/tmp/meals.db"),
            (STREAK_GATE_VAR, "logging"),
            (REFRESH_SUMMARY_VAR, "off"),
        ]);
        assert_eq!(cfg.database_path, PathBuf::from("/tmp/meals.db"));
        assert_eq!(cfg.streaks.gate, StreakGate::LoggingOnly);
        assert!(!cfg.streaks.refresh_summary);
    }

    #[test]
    fn test_bad_values_fall_back() {
        let cfg = config(&[(STREAK_GATE_VAR, "weekly"), (REFRESH_SUMMARY_VAR, "maybe")]);
        assert_eq!(cfg.streaks.gate, StreakGate::PerType);
        assert!(cfg.streaks.refresh_summary);
    }
}
