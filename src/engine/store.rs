//! Store capabilities the engine runs against
//!
//! The engine never touches SQL. It reads meals and the profile, and reads and
//! writes summaries and streaks, through these four traits. `db::SqliteStore`
//! is the production implementation.

use chrono::{DateTime, NaiveDate, Utc};

use crate::db::DbResult;
use crate::models::{DailySummary, Meal, Streak, StreakKind, SummaryFigures, UserProfile};

/// Read access to logged meals
pub trait MealSource {
    /// Meals with `start <= timestamp < end`, in any order
    fn meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Meal>>;

    /// Number of meals with `start <= timestamp < end`
    fn count_meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<usize> {
        Ok(self.meals_between(start, end)?.len())
    }
}

/// Read access to the (at most one) user profile
pub trait ProfileSource {
    fn current_profile(&self) -> DbResult<Option<UserProfile>>;
}

/// Summary lookup and upsert, keyed by calendar day
pub trait SummaryStore {
    fn summary_for_day(&self, date: NaiveDate) -> DbResult<Option<DailySummary>>;

    /// Store a summary for a day that has none; the store assigns the id
    fn insert_summary(&mut self, date: NaiveDate, figures: &SummaryFigures) -> DbResult<DailySummary>;

    /// Overwrite the computed fields of an already stored summary
    fn update_summary(&mut self, summary: &DailySummary) -> DbResult<()>;
}

/// Streak lookup and persistence
pub trait StreakStore {
    fn streak_for_type(&self, kind: StreakKind) -> DbResult<Option<Streak>>;

    /// Persist both streaks as one unit
    fn save_streaks(&mut self, logging: &Streak, goal: &Streak) -> DbResult<()>;
}

/// Everything `update_streaks` needs
pub trait EngineStore: MealSource + ProfileSource + SummaryStore + StreakStore {}

impl<T: MealSource + ProfileSource + SummaryStore + StreakStore + ?Sized> EngineStore for T {}
