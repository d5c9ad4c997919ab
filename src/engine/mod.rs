//! Streak and summary engine
//!
//! Stateless over a store: every call reads what it needs, computes, and
//! writes back through the traits in [`store`].

pub mod aggregator;
pub mod calendar;
pub mod error;
pub mod goals;
pub mod store;
pub mod streaks;
pub mod summary;

#[cfg(test)]
pub(crate) mod testing;

use chrono::{Local, NaiveDate, TimeZone};

use crate::models::{DailySummary, Nutrition};

pub use aggregator::{aggregate, has_logged_meal, sum_meals};
pub use calendar::{Calendar, DayRange};
pub use error::{EngineError, EngineResult};
pub use goals::{evaluate, GoalEvaluation, Targets};
pub use store::{EngineStore, MealSource, ProfileSource, StreakStore, SummaryStore};
pub use streaks::{count_day, StreakChange, StreakGate, StreakOptions, StreakOutcome, StreakUpdate};
pub use summary::{backfill_summaries, compute_daily_summary, summary_figures, MAX_BACKFILL_DAYS};

/// A calendar plus streak options; the entry points callers use
#[derive(Clone)]
pub struct Engine<Tz: TimeZone = Local> {
    calendar: Calendar<Tz>,
    options: StreakOptions,
}

impl Engine<Local> {
    pub fn local(options: StreakOptions) -> Self {
        Self::new(Calendar::local(), options)
    }
}

impl<Tz: TimeZone> Engine<Tz> {
    pub fn new(calendar: Calendar<Tz>, options: StreakOptions) -> Self {
        Self { calendar, options }
    }

    pub fn calendar(&self) -> &Calendar<Tz> {
        &self.calendar
    }

    pub fn options(&self) -> &StreakOptions {
        &self.options
    }

    /// Today in the engine's time zone
    pub fn today(&self) -> NaiveDate {
        self.calendar.today()
    }

    pub fn aggregate<S: MealSource + ?Sized>(&self, store: &S, date: NaiveDate) -> EngineResult<Nutrition> {
        aggregate(store, &self.calendar, date)
    }

    pub fn compute_daily_summary<S: EngineStore + ?Sized>(
        &self,
        store: &mut S,
        date: NaiveDate,
    ) -> EngineResult<DailySummary> {
        compute_daily_summary(store, &self.calendar, date)
    }

    pub fn backfill_summaries<S: EngineStore + ?Sized>(
        &self,
        store: &mut S,
        start: NaiveDate,
        end: NaiveDate,
    ) -> EngineResult<Option<Vec<DailySummary>>> {
        backfill_summaries(store, &self.calendar, start, end)
    }

    pub fn update_streaks<S: EngineStore + ?Sized>(
        &self,
        store: &mut S,
        today: NaiveDate,
    ) -> EngineResult<StreakUpdate> {
        streaks::update_streaks(store, &self.calendar, today, &self.options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::StreakKind;
    use chrono::{FixedOffset, TimeZone, Utc};
    use super::testing::{day, MemoryStore};

    #[test]
    fn test_engine_uses_its_time_zone() {
        // 23:30 UTC on the 8th is already the 9th at UTC+2
        let mut store = MemoryStore::with_profile(70.0, 2000.0);
        store.add_meal(Utc.with_ymd_and_hms(2025, 1, 8, 23, 30, 0).unwrap(), 500.0, Some(20.0));

        let utc = Engine::new(Calendar::new(Utc), StreakOptions::default());
        let east = Engine::new(
            Calendar::new(FixedOffset::east_opt(2 * 3600).unwrap()),
            StreakOptions::default(),
        );

        assert_eq!(utc.aggregate(&store, day(8)).unwrap().calories, 500.0);
        assert_eq!(east.aggregate(&store, day(8)).unwrap().calories, 0.0);
        assert_eq!(east.aggregate(&store, day(9)).unwrap().calories, 500.0);
    }

    #[test]
    fn test_engine_runs_a_full_day() {
        let mut store = MemoryStore::with_profile(70.0, 2000.0);
        store.add_meal(Utc.with_ymd_and_hms(2025, 1, 9, 8, 0, 0).unwrap(), 1800.0, Some(90.0));
        let engine = Engine::new(Calendar::new(Utc), StreakOptions::default());

        let update = engine.update_streaks(&mut store, day(9)).unwrap();
        assert!(update.saved);
        assert_eq!(store.streak(StreakKind::Logging).unwrap().current_count, 1);
        assert_eq!(store.streak(StreakKind::Goal).unwrap().current_count, 1);
        assert!(store.summaries.contains_key(&day(9)));
    }
}
