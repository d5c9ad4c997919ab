//! Meal Streak Tools module
//!
//! Service functions behind each MCP tool. Each returns `Result<_, String>`
//! with a message ready to hand back to the client.

pub mod data;
pub mod meals;
pub mod profile;
pub mod status;
pub mod streaks;
pub mod summaries;

use chrono::{NaiveDate, TimeZone};

use crate::engine::Engine;
use crate::models::dates::parse_date;

/// Parse an ISO date, or take today in the engine's time zone when absent
pub(crate) fn resolve_date<Tz: TimeZone>(engine: &Engine<Tz>, date: Option<&str>) -> Result<NaiveDate, String> {
    match date.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_date(s).map_err(|e| e.to_string()),
        None => Ok(engine.today()),
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{NaiveDate, Utc};

    use crate::db::migrations::run_migrations;
    use crate::db::Database;
    use crate::engine::{Calendar, Engine, StreakOptions};

    pub fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    pub fn utc_engine() -> Engine<Utc> {
        Engine::new(Calendar::new(Utc), StreakOptions::default())
    }

    pub fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }
}
