//! In-memory store for engine tests

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

use crate::db::{DbError, DbResult};
use crate::models::{
    DailySummary, Meal, MealOrigin, Streak, StreakKind, SummaryFigures, UserProfile,
};

use super::store::{MealSource, ProfileSource, StreakStore, SummaryStore};

#[derive(Default)]
pub struct MemoryStore {
    pub meals: Vec<Meal>,
    pub profile: Option<UserProfile>,
    pub summaries: BTreeMap<NaiveDate, DailySummary>,
    pub streaks: HashMap<StreakKind, Streak>,
    pub fail_reads: bool,
    pub fail_writes: bool,
    pub streak_saves: usize,
    next_id: i64,
}

fn unavailable() -> DbError {
    DbError::Sqlite(rusqlite::Error::InvalidQuery)
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile(weight_kg: f64, calorie_goal: f64) -> Self {
        let mut store = Self::new();
        store.profile = Some(UserProfile {
            id: 1,
            name: "Test".to_string(),
            weight_kg,
            calorie_goal,
            created_at: String::new(),
            updated_at: String::new(),
        });
        store
    }

    pub fn add_meal(&mut self, at: DateTime<Utc>, calories: f64, protein: Option<f64>) {
        self.next_id += 1;
        self.meals.push(Meal {
            id: self.next_id,
            title: "Meal".to_string(),
            notes: None,
            calories,
            protein,
            carbs: None,
            fat: None,
            timestamp: at,
            origin: MealOrigin::Manual,
            is_edited: false,
            ai_request_id: None,
            created_at: String::new(),
            updated_at: String::new(),
        });
    }

    pub fn streak(&self, kind: StreakKind) -> Option<&Streak> {
        self.streaks.get(&kind)
    }

    fn read<T>(&self, value: T) -> DbResult<T> {
        if self.fail_reads {
            Err(unavailable())
        } else {
            Ok(value)
        }
    }

    fn write(&self) -> DbResult<()> {
        if self.fail_writes {
            Err(unavailable())
        } else {
            Ok(())
        }
    }
}

impl MealSource for MemoryStore {
    fn meals_between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Vec<Meal>> {
        let meals = self
            .meals
            .iter()
            .filter(|m| m.timestamp >= start && m.timestamp < end)
            .cloned()
            .collect();
        self.read(meals)
    }
}

impl ProfileSource for MemoryStore {
    fn current_profile(&self) -> DbResult<Option<UserProfile>> {
        self.read(self.profile.clone())
    }
}

impl SummaryStore for MemoryStore {
    fn summary_for_day(&self, date: NaiveDate) -> DbResult<Option<DailySummary>> {
        self.read(self.summaries.get(&date).cloned())
    }

    fn insert_summary(&mut self, date: NaiveDate, figures: &SummaryFigures) -> DbResult<DailySummary> {
        self.write()?;
        self.next_id += 1;
        let summary = DailySummary::from_figures(self.next_id, date, figures);
        self.summaries.insert(date, summary.clone());
        Ok(summary)
    }

    fn update_summary(&mut self, summary: &DailySummary) -> DbResult<()> {
        self.write()?;
        self.summaries.insert(summary.date, summary.clone());
        Ok(())
    }
}

impl StreakStore for MemoryStore {
    fn streak_for_type(&self, kind: StreakKind) -> DbResult<Option<Streak>> {
        self.read(self.streaks.get(&kind).cloned())
    }

    fn save_streaks(&mut self, logging: &Streak, goal: &Streak) -> DbResult<()> {
        self.write()?;
        self.streak_saves += 1;
        self.streaks.insert(StreakKind::Logging, logging.clone());
        self.streaks.insert(StreakKind::Goal, goal.clone());
        Ok(())
    }
}

pub fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
}

/// Noon UTC on 2025-01-`d`
pub fn noon(d: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, d, 12, 0, 0).unwrap()
}
