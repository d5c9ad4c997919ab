//! Nutrition aggregation per calendar day

use chrono::{NaiveDate, TimeZone};

use crate::models::{Meal, Nutrition};

use super::calendar::Calendar;
use super::error::{EngineError, EngineResult};
use super::store::MealSource;

/// Sum a set of meals. Absent macros count as zero; the meal still counts.
pub fn sum_meals<'a, I>(meals: I) -> Nutrition
where
    I: IntoIterator<Item = &'a Meal>,
{
    meals.into_iter().map(Meal::nutrition).sum()
}

/// Total calories and macros logged on `date`
pub fn aggregate<M, Tz>(meals: &M, calendar: &Calendar<Tz>, date: NaiveDate) -> EngineResult<Nutrition>
where
    M: MealSource + ?Sized,
    Tz: TimeZone,
{
    let range = calendar.day_range(date);
    let day_meals = meals
        .meals_between(range.start, range.end)
        .map_err(EngineError::StoreRead)?;
    Ok(sum_meals(&day_meals))
}

/// Whether at least one meal was logged on `date`
pub fn has_logged_meal<M, Tz>(meals: &M, calendar: &Calendar<Tz>, date: NaiveDate) -> EngineResult<bool>
where
    M: MealSource + ?Sized,
    Tz: TimeZone,
{
    let range = calendar.day_range(date);
    let count = meals
        .count_meals_between(range.start, range.end)
        .map_err(EngineError::StoreRead)?;
    Ok(count > 0)
}
