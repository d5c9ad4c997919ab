//! Meal model
//!
//! A logged meal with its estimated calories and macros.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::dates::{format_instant, row_instant};
use super::Nutrition;

/// Where a meal came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealOrigin {
    /// Photo submitted to the estimation webhook
    Camera,
    /// Typed in by hand
    Manual,
}

impl MealOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealOrigin::Camera => "camera",
            MealOrigin::Manual => "manual",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "camera" => MealOrigin::Camera,
            _ => MealOrigin::Manual,
        }
    }
}

/// A logged meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Meal {
    pub id: i64,
    pub title: String,
    pub notes: Option<String>,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub origin: MealOrigin,
    pub is_edited: bool,
    pub ai_request_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for creating a meal
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MealCreate {
    pub title: String,
    pub notes: Option<String>,
    pub calories: f64,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub timestamp: DateTime<Utc>,
    pub origin: MealOrigin,
    pub ai_request_id: Option<String>,
}

/// Data for editing a meal. Any edit marks the meal as edited.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MealUpdate {
    pub title: Option<String>,
    pub notes: Option<String>,
    pub calories: Option<f64>,
    pub protein: Option<f64>,
    pub carbs: Option<f64>,
    pub fat: Option<f64>,
    pub timestamp: Option<DateTime<Utc>>,
}

fn check_amount(field: &str, value: Option<f64>) -> DbResult<()> {
    match value {
        Some(v) if !v.is_finite() || v < 0.0 => Err(DbError::InvalidData(format!(
            "{} must be a non-negative number, got {}",
            field, v
        ))),
        _ => Ok(()),
    }
}

impl MealCreate {
    fn validate(&self) -> DbResult<()> {
        check_amount("calories", Some(self.calories))?;
        check_amount("protein", self.protein)?;
        check_amount("carbs", self.carbs)?;
        check_amount("fat", self.fat)
    }
}

impl MealUpdate {
    fn validate(&self) -> DbResult<()> {
        check_amount("calories", self.calories)?;
        check_amount("protein", self.protein)?;
        check_amount("carbs", self.carbs)?;
        check_amount("fat", self.fat)
    }

    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.notes.is_none()
            && self.calories.is_none()
            && self.protein.is_none()
            && self.carbs.is_none()
            && self.fat.is_none()
            && self.timestamp.is_none()
    }
}

impl Meal {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let origin: String = row.get("source")?;
        Ok(Self {
            id: row.get("id")?,
            title: row.get("title")?,
            notes: row.get("notes")?,
            calories: row.get("calories")?,
            protein: row.get("protein")?,
            carbs: row.get("carbs")?,
            fat: row.get("fat")?,
            timestamp: row_instant(row, "timestamp")?,
            origin: MealOrigin::from_str(&origin),
            is_edited: row.get("is_edited")?,
            ai_request_id: row.get("ai_request_id")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Totals for this meal, with absent macros counted as zero
    pub fn nutrition(&self) -> Nutrition {
        Nutrition {
            calories: self.calories,
            protein: self.protein.unwrap_or(0.0),
            carbs: self.carbs.unwrap_or(0.0),
            fat: self.fat.unwrap_or(0.0),
        }
    }

    /// Create a new meal
    pub fn create(conn: &Connection, data: &MealCreate) -> DbResult<Self> {
        data.validate()?;

        conn.execute(
            r#"
            INSERT INTO meals (
                title, notes, calories, protein, carbs, fat,
                timestamp, source, ai_request_id
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                data.title,
                data.notes,
                data.calories,
                data.protein,
                data.carbs,
                data.fat,
                format_instant(&data.timestamp),
                data.origin.as_str(),
                data.ai_request_id,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a meal by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM meals WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(meal) => Ok(Some(meal)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Meals with `start <= timestamp < end`, oldest first
    pub fn list_between(
        conn: &Connection,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> DbResult<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT * FROM meals WHERE timestamp >= ?1 AND timestamp < ?2 ORDER BY timestamp, id",
        )?;

        let meals = stmt
            .query_map(params![format_instant(start), format_instant(end)], Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Number of meals with `start <= timestamp < end`
    pub fn count_between(
        conn: &Connection,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> DbResult<i64> {
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM meals WHERE timestamp >= ?1 AND timestamp < ?2",
            params![format_instant(start), format_instant(end)],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Update a meal
    pub fn update(conn: &Connection, id: i64, data: &MealUpdate) -> DbResult<Option<Self>> {
        data.validate()?;

        let Some(meal) = Self::get_by_id(conn, id)? else {
            return Ok(None);
        };

        if data.is_empty() {
            return Ok(Some(meal));
        }

        let mut updates = Vec::new();
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(ref title) = data.title {
            params_vec.push(Box::new(title.clone()));
            updates.push(format!("title = ?{}", params_vec.len()));
        }
        if let Some(ref notes) = data.notes {
            params_vec.push(Box::new(notes.clone()));
            updates.push(format!("notes = ?{}", params_vec.len()));
        }
        if let Some(calories) = data.calories {
            params_vec.push(Box::new(calories));
            updates.push(format!("calories = ?{}", params_vec.len()));
        }
        if let Some(protein) = data.protein {
            params_vec.push(Box::new(protein));
            updates.push(format!("protein = ?{}", params_vec.len()));
        }
        if let Some(carbs) = data.carbs {
            params_vec.push(Box::new(carbs));
            updates.push(format!("carbs = ?{}", params_vec.len()));
        }
        if let Some(fat) = data.fat {
            params_vec.push(Box::new(fat));
            updates.push(format!("fat = ?{}", params_vec.len()));
        }
        if let Some(ref timestamp) = data.timestamp {
            params_vec.push(Box::new(format_instant(timestamp)));
            updates.push(format!("timestamp = ?{}", params_vec.len()));
        }

        updates.push("is_edited = 1".to_string());
        updates.push("updated_at = datetime('now')".to_string());

        params_vec.push(Box::new(meal.id));
        let sql = format!(
            "UPDATE meals SET {} WHERE id = ?{}",
            updates.join(", "),
            params_vec.len()
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();
        conn.execute(&sql, params_refs.as_slice())?;

        Self::get_by_id(conn, id)
    }

    /// Delete a meal
    pub fn delete(conn: &Connection, id: i64) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM meals WHERE id = ?1", [id])?;
        Ok(rows > 0)
    }

    /// Delete every meal, returning how many were removed
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM meals", [])?)
    }
}
