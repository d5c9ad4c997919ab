//! Daily Summary MCP Tools
//!
//! Summary upsert, history, and today's progress.

use chrono::{Days, NaiveDate, TimeZone};
use serde::Serialize;

use crate::db::{Database, SqliteStore};
use crate::engine::{summary_figures, Engine, EngineError, MealSource, MAX_BACKFILL_DAYS};
use crate::models::dates::{format_date, parse_date};
use crate::models::{DailySummary, Nutrition};

use super::resolve_date;

/// Days of history `recent_activity` looks back over by default
pub const DEFAULT_ACTIVITY_DAYS: u64 = 30;

/// Entries `recent_activity` returns by default
pub const DEFAULT_ACTIVITY_LIMIT: usize = 7;

/// How a day looks in the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DayStatus {
    /// Both the calorie and the protein goal were met
    GoalsHit,
    /// Something was logged, goals missed
    Logged,
    Empty,
}

impl DayStatus {
    pub fn of(summary: &DailySummary) -> Self {
        if summary.hit_goals() {
            DayStatus::GoalsHit
        } else if summary.total_calories > 0.0 {
            DayStatus::Logged
        } else {
            DayStatus::Empty
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ActivityEntry {
    pub status: DayStatus,
    #[serde(flatten)]
    pub summary: DailySummary,
}

#[derive(Debug, Serialize)]
pub struct ListSummariesResponse {
    pub summaries: Vec<DailySummary>,
    pub count: usize,
}

#[derive(Debug, Serialize)]
pub struct BackfillResponse {
    pub start: String,
    pub end: String,
    pub days: usize,
    pub summaries: Vec<DailySummary>,
}

/// Live progress for one day; nothing is written
#[derive(Debug, Serialize)]
pub struct DailyProgress {
    pub date: String,
    pub totals: Nutrition,
    pub meal_count: usize,
    pub calorie_goal: f64,
    pub protein_target: f64,
    /// `total / goal`, capped at 1
    pub calorie_progress: f64,
    pub protein_progress: f64,
    /// Negative once over the goal
    pub calories_remaining: f64,
    pub hit_calorie_goal: bool,
    pub hit_protein_goal: bool,
}

fn progress(total: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        (total / goal).min(1.0)
    } else {
        0.0
    }
}

fn parse_optional_date(date: Option<&str>) -> Result<Option<NaiveDate>, String> {
    date.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| parse_date(s).map_err(|e| e.to_string()))
        .transpose()
}

/// Recompute and store the summary for a day (today when `date` is absent)
pub fn compute_daily_summary<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    date: Option<&str>,
) -> Result<DailySummary, String> {
    let date = resolve_date(engine, date)?;
    db.transaction(|tx| {
        let mut store = SqliteStore::new(tx);
        engine.compute_daily_summary(&mut store, date)
    })
    .map_err(|e: EngineError| format!("Failed to compute daily summary: {}", e))
}

/// Stored summaries in a date range, newest first
pub fn list_summaries(
    db: &Database,
    start_date: Option<&str>,
    end_date: Option<&str>,
    limit: i64,
) -> Result<ListSummariesResponse, String> {
    let limit = limit.min(MAX_BACKFILL_DAYS as i64).max(1);
    let start = parse_optional_date(start_date)?;
    let end = parse_optional_date(end_date)?;

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let summaries = DailySummary::list(&conn, start, end, limit)
        .map_err(|e| format!("Failed to list summaries: {}", e))?;

    Ok(ListSummariesResponse {
        count: summaries.len(),
        summaries,
    })
}

/// The newest stored summaries from the last `days` days, with a status each
pub fn recent_activity<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    days: Option<u64>,
    limit: Option<usize>,
) -> Result<Vec<ActivityEntry>, String> {
    recent_activity_as_of(db, engine.today(), days, limit)
}

/// `recent_activity` with the window ending at `today`
pub fn recent_activity_as_of(
    db: &Database,
    today: NaiveDate,
    days: Option<u64>,
    limit: Option<usize>,
) -> Result<Vec<ActivityEntry>, String> {
    let days = days.unwrap_or(DEFAULT_ACTIVITY_DAYS).min(MAX_BACKFILL_DAYS);
    let limit = limit.unwrap_or(DEFAULT_ACTIVITY_LIMIT).max(1);
    let since = today.checked_sub_days(Days::new(days)).unwrap_or(NaiveDate::MIN);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let summaries = DailySummary::list(&conn, Some(since), None, limit as i64)
        .map_err(|e| format!("Failed to list summaries: {}", e))?;

    Ok(summaries
        .into_iter()
        .map(|summary| ActivityEntry {
            status: DayStatus::of(&summary),
            summary,
        })
        .collect())
}

/// Totals and goal progress for a day, computed from the meals directly
pub fn daily_progress<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    date: Option<&str>,
) -> Result<DailyProgress, String> {
    let date = resolve_date(engine, date)?;
    let range = engine.calendar().day_range(date);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let store = SqliteStore::new(&conn);

    let figures = summary_figures(&store, engine.calendar(), date)
        .map_err(|e| format!("Failed to compute progress: {}", e))?;
    let meal_count = store
        .count_meals_between(range.start, range.end)
        .map_err(|e| format!("Failed to count meals: {}", e))?;

    Ok(DailyProgress {
        date: format_date(date),
        totals: figures.totals,
        meal_count,
        calorie_goal: figures.calorie_goal,
        protein_target: figures.protein_target,
        calorie_progress: progress(figures.totals.calories, figures.calorie_goal),
        protein_progress: progress(figures.totals.protein, figures.protein_target),
        calories_remaining: figures.calorie_goal - figures.totals.calories,
        hit_calorie_goal: figures.hit_calorie_goal,
        hit_protein_goal: figures.hit_protein_goal,
    })
}

/// Recompute every summary in `start..=end` in one transaction
pub fn backfill_summaries<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    start_date: &str,
    end_date: Option<&str>,
) -> Result<BackfillResponse, String> {
    let start = parse_date(start_date).map_err(|e| e.to_string())?;
    let end = resolve_date(engine, end_date)?;

    let summaries = db
        .transaction(|tx| {
            let mut store = SqliteStore::new(tx);
            engine.backfill_summaries(&mut store, start, end)
        })
        .map_err(|e: EngineError| format!("Failed to backfill summaries: {}", e))?
        .ok_or_else(|| {
            format!(
                "Invalid range {}..{}: end must not precede start and the range must be under {} days",
                start, end, MAX_BACKFILL_DAYS
            )
        })?;

    Ok(BackfillResponse {
        start: format_date(start),
        end: format_date(end),
        days: summaries.len(),
        summaries,
    })
}
