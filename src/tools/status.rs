//! Meal Streak Status Tool
//!
//! Runtime status of the service, plus usage notes for assistants.

use serde::Serialize;
use std::path::PathBuf;
use std::time::Instant;
use sysinfo::{Pid, ProcessesToUpdate, System};

use crate::build_info::BuildInfo;
use crate::engine::StreakOptions;

/// How to drive the tools, for AI assistants
pub const USAGE_INSTRUCTIONS: &str = r#"
# Meal Streak Usage

## Logging
- `log_meal` for meals typed in by hand (calories required, macros optional).
- `log_estimated_meal` with the raw body returned by the photo estimator. If
  the body cannot be read the meal is still logged as "Meal" with 0 calories
  and `needs_manual_entry: true`; follow up with `update_meal`.
- Timestamps are RFC 3339 (`2026-01-13T08:30:00Z`); omitted means now.

## Days
Dates are `YYYY-MM-DD` in the server's local time zone; omitted means today.
A day runs from local midnight to the next local midnight.

## Goals
- Calorie goal: met when the day's calories are at or under the goal.
- Protein target: 1.2 g per kg of body weight; met at or over the target.
- Without a profile the goal is 2000 kcal and the weight 70 kg.

## Streaks
Call `update_streaks` once a day (extra calls the same day change nothing).
- Logging streak: at least one meal that day.
- Goal streak: both goals met that day.
A missed day restarts the streak at 1 on the next qualifying day.

## History
- `daily_progress` for live totals against today's goals.
- `compute_daily_summary` stores a day's totals; `recent_activity` and
  `list_summaries` read stored summaries back.
"#;

/// Runtime status of the service
#[derive(Debug, Clone, Serialize)]
pub struct ServiceStatus {
    pub name: &'static str,
    pub build_number: u64,
    pub build_timestamp: &'static str,
    pub version: &'static str,

    pub database_path: String,
    pub database_size_bytes: Option<u64>,

    pub streak_options: StreakOptions,

    pub uptime_seconds: u64,
    pub process_id: u32,
    pub memory_usage_bytes: u64,
}

/// Status tracker for collecting runtime information
pub struct StatusTracker {
    start_time: Instant,
    database_path: PathBuf,
    streak_options: StreakOptions,
}

impl StatusTracker {
    pub fn new(database_path: PathBuf, streak_options: StreakOptions) -> Self {
        Self {
            start_time: Instant::now(),
            database_path,
            streak_options,
        }
    }

    pub fn get_status(&self) -> ServiceStatus {
        let build_info = BuildInfo::current();

        let database_size_bytes = std::fs::metadata(&self.database_path)
            .ok()
            .map(|m| m.len());

        let pid = std::process::id();
        let mut sys = System::new();
        sys.refresh_processes(ProcessesToUpdate::Some(&[Pid::from_u32(pid)]));

        let memory_usage_bytes = sys
            .process(Pid::from_u32(pid))
            .map(|p| p.memory())
            .unwrap_or(0);

        ServiceStatus {
            name: build_info.name,
            build_number: build_info.build_number,
            build_timestamp: build_info.build_timestamp,
            version: build_info.version,
            database_path: self.database_path.display().to_string(),
            database_size_bytes,
            streak_options: self.streak_options,
            uptime_seconds: self.start_time.elapsed().as_secs(),
            process_id: pid,
            memory_usage_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_for_missing_database() {
        let tracker = StatusTracker::new(PathBuf::from("/nonexistent/mealstreak.db"), StreakOptions::default());
        let status = tracker.get_status();
        assert_eq!(status.database_size_bytes, None);
        assert_eq!(status.process_id, std::process::id());
        assert_eq!(status.name, "mealstreak");
    }
}
