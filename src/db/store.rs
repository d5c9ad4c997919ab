//! SQLite implementation of the engine's store traits

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::Connection;

use crate::engine::{MealSource, ProfileSource, StreakStore, SummaryStore};
use crate::models::{DailySummary, Meal, Streak, StreakKind, SummaryFigures, UserProfile};

use super::DbResult;

/// Borrows a connection (usually an open transaction) for one engine call
pub struct SqliteStore<'c> {
    conn: &'c Connection,
}

impl<'c> SqliteStore<'c> {
    pub fn new(conn: &'c Connection) -> Self {
        Self { conn }
    }
}

impl MealSource for SqliteStore<'_> {
    fn meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Meal>> {
        Meal::list_between(self.conn, &start, &end)
    }

    fn count_meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<usize> {
        let count = Meal::count_between(self.conn, &start, &end)?;
        Ok(count.max(0) as usize)
    }
}

impl ProfileSource for SqliteStore<'_> {
    fn current_profile(&self) -> DbResult<Option<UserProfile>> {
        UserProfile::get(self.conn)
    }
}

impl SummaryStore for SqliteStore<'_> {
    fn summary_for_day(&self, date: NaiveDate) -> DbResult<Option<DailySummary>> {
        DailySummary::get_by_date(self.conn, date)
    }

    fn insert_summary(&mut self, date: NaiveDate, figures: &SummaryFigures) -> DbResult<DailySummary> {
        DailySummary::create(self.conn, date, figures)
    }

    fn update_summary(&mut self, summary: &DailySummary) -> DbResult<()> {
        DailySummary::update_figures(self.conn, summary)
    }
}

impl StreakStore for SqliteStore<'_> {
    fn streak_for_type(&self, kind: StreakKind) -> DbResult<Option<Streak>> {
        Streak::get(self.conn, kind)
    }

    fn save_streaks(&mut self, logging: &Streak, goal: &Streak) -> DbResult<()> {
        Streak::save(self.conn, logging)?;
        Streak::save(self.conn, goal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;
    use crate::db::{Database, DbError};
    use crate::engine::{Calendar, Engine, EngineError, StreakOptions, StreakOutcome};
    use crate::models::{MealCreate, MealOrigin, ProfileSet};
    use chrono::TimeZone;

    fn setup() -> Database {
        let db = Database::in_memory().unwrap();
        db.with_conn(|conn| run_migrations(conn)).unwrap();
        db
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn log(conn: &Connection, d: u32, hour: u32, calories: f64, protein: Option<f64>) {
        Meal::create(
            conn,
            &MealCreate {
                title: "Meal".to_string(),
                notes: None,
                calories,
                protein,
                carbs: None,
                fat: None,
                timestamp: Utc.with_ymd_and_hms(2025, 3, d, hour, 0, 0).unwrap(),
                origin: MealOrigin::Manual,
                ai_request_id: None,
            },
        )
        .unwrap();
    }

    fn engine() -> Engine<Utc> {
        Engine::new(Calendar::new(Utc), StreakOptions::default())
    }

    #[test]
    fn test_day_boundaries_against_sqlite() {
        let db = setup();
        db.with_conn(|conn| {
            log(conn, 9, 0, 100.0, None);
            log(conn, 9, 23, 200.0, None);
            log(conn, 10, 0, 400.0, None);
            let store = SqliteStore::new(conn);
            let totals = engine().aggregate(&store, day(9)).unwrap();
            assert_eq!(totals.calories, 300.0);
            assert_eq!(store.count_meals_between(
                Calendar::new(Utc).day_range(day(10)).start,
                Calendar::new(Utc).day_range(day(10)).end,
            )?, 1);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_streaks_across_days_in_transactions() {
        let db = setup();
        db.with_conn(|conn| {
            UserProfile::set(conn, &ProfileSet { name: "A".into(), weight_kg: 70.0, calorie_goal: 2000.0 })?;
            log(conn, 1, 12, 1800.0, Some(90.0));
            log(conn, 2, 12, 1500.0, Some(85.0));
            log(conn, 4, 12, 1200.0, Some(10.0));
            Ok(())
        })
        .unwrap();

        let engine = engine();
        for d in 1..=4 {
            db.transaction(|tx| {
                let mut store = SqliteStore::new(tx);
                engine.update_streaks(&mut store, day(d))
            })
            .unwrap();
        }

        db.with_conn(|conn| {
            let logging = Streak::get(conn, StreakKind::Logging)?.unwrap();
            assert_eq!(logging.current_count, 1);
            assert_eq!(logging.longest_count, 2);
            assert_eq!(logging.last_date_counted, Some(day(4)));

            let goal = Streak::get(conn, StreakKind::Goal)?.unwrap();
            assert_eq!(goal.current_count, 2);
            assert_eq!(goal.longest_count, 2);
            assert_eq!(goal.last_date_counted, Some(day(2)));

            let summary = DailySummary::get_by_date(conn, day(4))?.unwrap();
            assert!(summary.hit_calorie_goal);
            assert!(!summary.hit_protein_goal);
            Ok(())
        })
        .unwrap();
    }

    #[test]
    fn test_repeat_run_same_day_changes_nothing() {
        let db = setup();
        db.with_conn(|conn| {
            log(conn, 5, 9, 500.0, Some(100.0));
            Ok(())
        })
        .unwrap();

        let engine = engine();
        let run = || {
            db.transaction(|tx| {
                let mut store = SqliteStore::new(tx);
                engine.update_streaks(&mut store, day(5))
            })
            .unwrap()
        };

        let first = run();
        assert_eq!(first.logging.outcome, StreakOutcome::Restarted);
        let second = run();
        assert_eq!(second.logging.outcome, StreakOutcome::Skipped);
        assert_eq!(second.goal.outcome, StreakOutcome::Skipped);
        assert!(!second.saved);
        assert_eq!(second.logging.streak, first.logging.streak);
    }

    #[test]
    fn test_failed_streak_write_rolls_back_summary() {
        let db = setup();
        db.with_conn(|conn| {
            log(conn, 5, 9, 500.0, Some(100.0));
            conn.execute_batch(
                "CREATE TRIGGER reject_streaks BEFORE INSERT ON streaks
                 BEGIN SELECT RAISE(ABORT, 'streaks are read-only'); END;",
            )?;
            Ok(())
        })
        .unwrap();

        let engine = engine();
        let result: Result<_, EngineError> = db.transaction(|tx| {
            let mut store = SqliteStore::new(tx);
            engine.update_streaks(&mut store, day(5))
        });
        assert!(matches!(result, Err(EngineError::StoreWrite(DbError::Sqlite(_)))));

        let summaries = db
            .with_conn(|conn| DailySummary::list(conn, None, None, 10))
            .unwrap();
        assert!(summaries.is_empty());
    }
}
