//! Logging and goal streaks
//!
//! Each invocation evaluates one day. For each streak type whose gate is open:
//! if the day qualifies, the streak extends when the previous counted day was
//! yesterday and restarts at 1 otherwise. A day that does not qualify changes
//! nothing; a broken streak keeps its stale count until the next qualifying
//! day restarts it.
//!
//! Invariants after every call: `longest_count >= current_count`, and
//! `longest_count` never decreases.

use chrono::{NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::models::{Streak, StreakKind};

use super::aggregator::has_logged_meal;
use super::calendar::Calendar;
use super::error::{EngineError, EngineResult};
use super::store::EngineStore;
use super::summary::compute_daily_summary;

/// Which `last_date_counted` decides that a day was already evaluated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakGate {
    /// Once the logging streak has counted the day, both types are skipped,
    /// even if the goal streak has not counted it yet.
    LoggingOnly,
    /// Each type is skipped only once it has counted the day itself.
    #[default]
    PerType,
}

impl StreakGate {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "logging" | "logging_only" => Some(StreakGate::LoggingOnly),
            "per_type" | "per-type" => Some(StreakGate::PerType),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakOptions {
    pub gate: StreakGate,
    /// Recompute the day's summary before judging the goal streak, so the goal
    /// flags are never stale.
    pub refresh_summary: bool,
}

impl Default for StreakOptions {
    fn default() -> Self {
        Self {
            gate: StreakGate::PerType,
            refresh_summary: true,
        }
    }
}

/// What happened to one streak
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StreakOutcome {
    /// The gate was closed; the day had already been evaluated
    Skipped,
    /// The day did not qualify; nothing changed
    NotQualified,
    /// Previous counted day was yesterday
    Extended,
    /// First count, or a gap since the previous one
    Restarted,
}

impl StreakOutcome {
    pub fn counted(&self) -> bool {
        matches!(self, StreakOutcome::Extended | StreakOutcome::Restarted)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakChange {
    pub outcome: StreakOutcome,
    pub streak: Streak,
}

/// Result of one `update_streaks` call
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StreakUpdate {
    pub date: NaiveDate,
    pub logging: StreakChange,
    pub goal: StreakChange,
    /// Whether the streak records were written
    pub saved: bool,
}

/// Count `day` as a qualifying day for `streak`.
///
/// Extends when `last_date_counted` is the day before; anything else (never
/// counted, a gap, or a date after `day`) restarts at 1.
pub fn count_day(streak: &mut Streak, day: NaiveDate) -> StreakOutcome {
    let consecutive = match (streak.last_date_counted, day.pred_opt()) {
        (Some(last), Some(yesterday)) => last == yesterday,
        _ => false,
    };

    let outcome = if consecutive {
        streak.current_count = streak.current_count.saturating_add(1);
        StreakOutcome::Extended
    } else {
        streak.current_count = 1;
        StreakOutcome::Restarted
    };

    streak.last_date_counted = Some(day);
    streak.longest_count = streak.longest_count.max(streak.current_count);
    outcome
}

/// Load a streak, defaulting to an empty one. The flag is true when the
/// record did not exist yet.
fn load_streak<S: EngineStore + ?Sized>(store: &S, kind: StreakKind) -> EngineResult<(Streak, bool)> {
    match store.streak_for_type(kind).map_err(EngineError::StoreRead)? {
        Some(streak) => Ok((streak, false)),
        None => Ok((Streak::new(kind), true)),
    }
}

fn goals_hit_on<S: EngineStore + ?Sized>(store: &S, date: NaiveDate) -> EngineResult<bool> {
    let summary = store.summary_for_day(date).map_err(EngineError::StoreRead)?;
    Ok(summary.map_or(false, |s| s.hit_goals()))
}

/// Evaluate `today` for both streaks and persist the result.
///
/// Both records are written together at the end, and only when something
/// changed or a record had to be created. An error leaves the stored streaks
/// as they were; with `refresh_summary` on, the summary write happens first,
/// so callers wanting all-or-nothing run this inside one transaction.
pub fn update_streaks<S, Tz>(
    store: &mut S,
    calendar: &Calendar<Tz>,
    today: NaiveDate,
    options: &StreakOptions,
) -> EngineResult<StreakUpdate>
where
    S: EngineStore + ?Sized,
    Tz: TimeZone,
{
    let (mut logging, logging_created) = load_streak(&*store, StreakKind::Logging)?;
    let (mut goal, goal_created) = load_streak(&*store, StreakKind::Goal)?;

    let logging_open = logging.last_date_counted != Some(today);
    let goal_open = match options.gate {
        StreakGate::LoggingOnly => logging_open,
        StreakGate::PerType => goal.last_date_counted != Some(today),
    };

    if !logging_open && !goal_open {
        tracing::debug!(%today, gate = ?options.gate, "streaks already counted today");
        return Ok(StreakUpdate {
            date: today,
            logging: StreakChange { outcome: StreakOutcome::Skipped, streak: logging },
            goal: StreakChange { outcome: StreakOutcome::Skipped, streak: goal },
            saved: false,
        });
    }

    let logging_outcome = if !logging_open {
        StreakOutcome::Skipped
    } else if has_logged_meal(&*store, calendar, today)? {
        count_day(&mut logging, today)
    } else {
        StreakOutcome::NotQualified
    };

    let goal_outcome = if !goal_open {
        StreakOutcome::Skipped
    } else {
        if options.refresh_summary {
            compute_daily_summary(store, calendar, today)?;
        }
        if goals_hit_on(&*store, today)? {
            count_day(&mut goal, today)
        } else {
            StreakOutcome::NotQualified
        }
    };

    let dirty = logging_created || goal_created || logging_outcome.counted() || goal_outcome.counted();
    if dirty {
        store
            .save_streaks(&logging, &goal)
            .map_err(EngineError::StoreWrite)?;
    }

    tracing::info!(
        %today,
        logging = ?logging_outcome,
        logging_count = logging.current_count,
        goal = ?goal_outcome,
        goal_count = goal.current_count,
        saved = dirty,
        "evaluated streaks"
    );

    Ok(StreakUpdate {
        date: today,
        logging: StreakChange { outcome: logging_outcome, streak: logging },
        goal: StreakChange { outcome: goal_outcome, streak: goal },
        saved: dirty,
    })
}
