//! Meal MCP Tools
//!
//! Logging, editing, and listing meals.

use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;
use serde_json::Value;

use crate::db::Database;
use crate::engine::{sum_meals, Engine};
use crate::models::dates::{format_date, parse_instant};
use crate::models::{Meal, MealCreate, MealOrigin, MealUpdate, Nutrition};

use super::resolve_date;

/// Title used when the estimate carries no label, or could not be read
pub const DEFAULT_MEAL_TITLE: &str = "Meal";

/// Decoded body of the photo estimation webhook.
///
/// `{"calories": 540, "proteinG": 32, "carbsG": 41, "fatG": 22, "label": "Burrito bowl"}`
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EstimationResponse {
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub label: String,
    /// The body was not a JSON object; calories must be entered by hand
    pub needs_manual_entry: bool,
}

impl EstimationResponse {
    /// Decode a webhook body. Never fails: anything that is not a JSON
    /// object becomes an empty "Meal" flagged for manual entry, and fields
    /// of the wrong type are treated as absent.
    pub fn parse(body: &[u8]) -> Self {
        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Self {
                calories: map.get("calories").and_then(Value::as_f64).unwrap_or(0.0),
                protein: map.get("proteinG").and_then(Value::as_f64),
                carbs: map.get("carbsG").and_then(Value::as_f64),
                fat: map.get("fatG").and_then(Value::as_f64),
                label: map
                    .get("label")
                    .and_then(Value::as_str)
                    .unwrap_or(DEFAULT_MEAL_TITLE)
                    .to_string(),
                needs_manual_entry: false,
            },
            Ok(_) | Err(_) => {
                tracing::warn!(bytes = body.len(), "estimation response is not a JSON object");
                Self::fallback()
            }
        }
    }

    fn fallback() -> Self {
        Self {
            calories: 0.0,
            protein: None,
            carbs: None,
            fat: None,
            label: DEFAULT_MEAL_TITLE.to_string(),
            needs_manual_entry: true,
        }
    }
}

/// Response for log_estimated_meal
#[derive(Debug, Serialize)]
pub struct LogEstimatedMealResponse {
    pub meal: Meal,
    pub needs_manual_entry: bool,
}

/// Response for list_meals
#[derive(Debug, Serialize)]
pub struct ListMealsResponse {
    pub date: String,
    pub meals: Vec<Meal>,
    pub meal_count: usize,
    pub totals: Nutrition,
}

fn resolve_timestamp(timestamp: Option<&str>) -> Result<DateTime<Utc>, String> {
    match timestamp.map(str::trim).filter(|s| !s.is_empty()) {
        Some(s) => parse_instant(s).map_err(|e| e.to_string()),
        None => Ok(Utc::now()),
    }
}

fn title_or_default(title: Option<String>) -> String {
    title
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| DEFAULT_MEAL_TITLE.to_string())
}

/// Log a meal typed in by hand
#[allow(clippy::too_many_arguments)]
pub fn log_meal(
    db: &Database,
    title: Option<String>,
    notes: Option<String>,
    calories: f64,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    timestamp: Option<&str>,
) -> Result<Meal, String> {
    let data = MealCreate {
        title: title_or_default(title),
        notes,
        calories,
        protein,
        carbs,
        fat,
        timestamp: resolve_timestamp(timestamp)?,
        origin: MealOrigin::Manual,
        ai_request_id: None,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;
    tracing::info!(id = meal.id, calories = meal.calories, "logged meal");
    Ok(meal)
}

/// Log a meal from a photo estimation response body
pub fn log_estimated_meal(
    db: &Database,
    response_body: &str,
    notes: Option<String>,
    request_id: Option<String>,
    timestamp: Option<&str>,
) -> Result<LogEstimatedMealResponse, String> {
    let estimate = EstimationResponse::parse(response_body.as_bytes());

    let data = MealCreate {
        title: title_or_default(Some(estimate.label)),
        notes: notes.filter(|n| !n.is_empty()),
        calories: estimate.calories,
        protein: estimate.protein,
        carbs: estimate.carbs,
        fat: estimate.fat,
        timestamp: resolve_timestamp(timestamp)?,
        origin: MealOrigin::Camera,
        ai_request_id: request_id,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meal = Meal::create(&conn, &data).map_err(|e| format!("Failed to log meal: {}", e))?;
    tracing::info!(
        id = meal.id,
        calories = meal.calories,
        needs_manual_entry = estimate.needs_manual_entry,
        "logged estimated meal"
    );

    Ok(LogEstimatedMealResponse {
        meal,
        needs_manual_entry: estimate.needs_manual_entry,
    })
}

/// Get a meal by ID
pub fn get_meal(db: &Database, id: i64) -> Result<Option<Meal>, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::get_by_id(&conn, id).map_err(|e| format!("Failed to get meal: {}", e))
}

/// Edit a meal; any supplied field is overwritten and the meal is marked edited
#[allow(clippy::too_many_arguments)]
pub fn update_meal(
    db: &Database,
    id: i64,
    title: Option<String>,
    notes: Option<String>,
    calories: Option<f64>,
    protein: Option<f64>,
    carbs: Option<f64>,
    fat: Option<f64>,
    timestamp: Option<&str>,
) -> Result<Option<Meal>, String> {
    let timestamp = match timestamp {
        Some(s) => Some(parse_instant(s).map_err(|e| e.to_string())?),
        None => None,
    };

    let data = MealUpdate {
        title,
        notes,
        calories,
        protein,
        carbs,
        fat,
        timestamp,
    };

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::update(&conn, id, &data).map_err(|e| format!("Failed to update meal: {}", e))
}

/// Delete a meal
pub fn delete_meal(db: &Database, id: i64) -> Result<bool, String> {
    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    Meal::delete(&conn, id).map_err(|e| format!("Failed to delete meal: {}", e))
}

/// Meals logged on one calendar day, oldest first
pub fn list_meals<Tz: TimeZone>(
    db: &Database,
    engine: &Engine<Tz>,
    date: Option<&str>,
) -> Result<ListMealsResponse, String> {
    let date = resolve_date(engine, date)?;
    let range = engine.calendar().day_range(date);

    let conn = db.get_conn().map_err(|e| format!("Database error: {}", e))?;
    let meals = Meal::list_between(&conn, &range.start, &range.end)
        .map_err(|e| format!("Failed to list meals: {}", e))?;

    Ok(ListMealsResponse {
        date: format_date(date),
        meal_count: meals.len(),
        totals: sum_meals(&meals),
        meals,
    })
}
