//! Streak MCP Tools

use chrono::TimeZone;
use serde::Serialize;

use crate::db::{Database, SqliteStore};
use crate::engine::{Engine, EngineError, StreakUpdate};
use crate::models::{Streak, StreakKind};

use super::resolve_date;

/// One streak with its display title
#[derive(Debug, Serialize)]
pub struct StreakView {
    pub title: &'static str,
    #[serde(flatten)]
    pub streak: Streak,
}

impl From<Streak> for StreakView {
    fn from(streak: Streak) -> Self {
        Self {
            title: streak.kind.title(),
            streak,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StreaksResponse {
    pub logging: StreakView,
    pub goal: StreakView,
}

/// Evaluate a day (today when `date` is absent) for both streaks, in one
/// transaction
pub fn update_streaks<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    date: Option<&str>,
) -> Result<StreakUpdate, String> {
    let today = resolve_date(engine, date)?;
    db.transaction(|tx| {
        let mut store = SqliteStore::new(tx);
        engine.update_streaks(&mut store, today)
    })
    .map_err(|e: EngineError| format!("Failed to update streaks: {}", e))
}

/// Current streak records. Missing records read as zero and are not created.
pub fn get_streaks(db: &Database) -> Result<StreaksResponse, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;

    let load = |kind: StreakKind| -> Result<StreakView, String> {
        let streak = Streak::get(&conn, kind)
            .map_err(|e| format!("Failed to get {} streak: {}", kind.as_str(), e))?
            .unwrap_or_else(|| Streak::new(kind));
        Ok(streak.into())
    };

    Ok(StreaksResponse {
        logging: load(StreakKind::Logging)?,
        goal: load(StreakKind::Goal)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::StreakOutcome;
    use crate::tools::meals::log_meal;
    use crate::tools::test_support::{setup, utc_engine};

    #[test]
    fn test_get_streaks_defaults_without_writing() {
        let db = setup();
        let streaks = get_streaks(&db).unwrap();
        assert_eq!(streaks.logging.title, "Logging Streak");
        assert_eq!(streaks.goal.streak.current_count, 0);

        let stored = db.with_conn(|conn| Streak::get(conn, StreakKind::Goal)).unwrap();
        assert!(stored.is_none());
    }

    #[test]
    fn test_update_streaks_over_three_days() {
        let db = setup();
        let engine = utc_engine();
        log_meal(&db, None, None, 1800.0, Some(90.0), None, None, Some("2025-01-08T12:00:00Z")).unwrap();
        log_meal(&db, None, None, 1900.0, Some(100.0), None, None, Some("2025-01-09T12:00:00Z")).unwrap();
        log_meal(&db, None, None, 2600.0, Some(100.0), None, None, Some("2025-01-10T12:00:00Z")).unwrap();

        for d in ["2025-01-08", "2025-01-09", "2025-01-10"] {
            update_streaks(&db, &engine, Some(d)).unwrap();
        }

        let streaks = get_streaks(&db).unwrap();
        assert_eq!(streaks.logging.streak.current_count, 3);
        assert_eq!(streaks.goal.streak.current_count, 2);
        assert_eq!(streaks.goal.streak.longest_count, 2);

        let again = update_streaks(&db, &engine, Some("2025-01-10")).unwrap();
        assert_eq!(again.logging.outcome, StreakOutcome::Skipped);
        assert!(!again.saved);
    }
}
