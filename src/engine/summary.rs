//! Daily summary upsert
//!
//! Recomputes one day's totals and goal flags and writes them to the day's
//! summary record, creating it on first use. Recomputing with unchanged meals
//! yields the same record (same id, same values).

use chrono::{Days, NaiveDate, TimeZone};

use crate::models::{DailySummary, SummaryFigures};

use super::aggregator::aggregate;
use super::calendar::Calendar;
use super::error::{EngineError, EngineResult};
use super::goals::evaluate;
use super::store::{MealSource, ProfileSource, SummaryStore};

/// Longest range `backfill_summaries` accepts, in days
pub const MAX_BACKFILL_DAYS: u64 = 366;

/// Totals and goal evaluation for `date`, without touching the summary store
pub fn summary_figures<S, Tz>(store: &S, calendar: &Calendar<Tz>, date: NaiveDate) -> EngineResult<SummaryFigures>
where
    S: MealSource + ProfileSource + ?Sized,
    Tz: TimeZone,
{
    let totals = aggregate(store, calendar, date)?;
    let profile = store.current_profile().map_err(EngineError::StoreRead)?;
    let evaluation = evaluate(&totals, profile.as_ref());

    Ok(SummaryFigures {
        totals,
        calorie_goal: evaluation.calorie_goal,
        protein_target: evaluation.protein_target,
        hit_calorie_goal: evaluation.hit_calorie_goal,
        hit_protein_goal: evaluation.hit_protein_goal,
    })
}

/// Compute and store the summary for `date`
pub fn compute_daily_summary<S, Tz>(
    store: &mut S,
    calendar: &Calendar<Tz>,
    date: NaiveDate,
) -> EngineResult<DailySummary>
where
    S: MealSource + ProfileSource + SummaryStore + ?Sized,
    Tz: TimeZone,
{
    let figures = summary_figures(&*store, calendar, date)?;

    match store.summary_for_day(date).map_err(EngineError::StoreRead)? {
        Some(mut summary) => {
            summary.apply(&figures);
            store.update_summary(&summary).map_err(EngineError::StoreWrite)?;
            tracing::debug!(%date, id = summary.id, calories = figures.totals.calories, "updated daily summary");
            Ok(summary)
        }
        None => {
            let summary = store
                .insert_summary(date, &figures)
                .map_err(EngineError::StoreWrite)?;
            tracing::info!(%date, id = summary.id, calories = figures.totals.calories, "created daily summary");
            Ok(summary)
        }
    }
}

/// Recompute every day in `start..=end`, oldest first.
///
/// Returns `None` for an inverted range or one longer than
/// [`MAX_BACKFILL_DAYS`].
pub fn backfill_summaries<S, Tz>(
    store: &mut S,
    calendar: &Calendar<Tz>,
    start: NaiveDate,
    end: NaiveDate,
) -> EngineResult<Option<Vec<DailySummary>>>
where
    S: MealSource + ProfileSource + SummaryStore + ?Sized,
    Tz: TimeZone,
{
    if end < start || (end - start).num_days() as u64 >= MAX_BACKFILL_DAYS {
        return Ok(None);
    }

    let mut summaries = Vec::new();
    let mut date = start;
    while date <= end {
        summaries.push(compute_daily_summary(store, calendar, date)?);
        match date.checked_add_days(Days::new(1)) {
            Some(next) => date = next,
            None => break,
        }
    }

    tracing::info!(%start, %end, days = summaries.len(), "backfilled daily summaries");
    Ok(Some(summaries))
}
