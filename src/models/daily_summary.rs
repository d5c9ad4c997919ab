//! Daily summary model
//!
//! Materialized per-day totals with the goals they were judged against.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::dates::{format_date, row_date};
use super::Nutrition;

/// Everything a summary computation produces for one day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryFigures {
    pub totals: Nutrition,
    pub calorie_goal: f64,
    pub protein_target: f64,
    pub hit_calorie_goal: bool,
    pub hit_protein_goal: bool,
}

/// One day's summary. `date` is the key and never changes once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailySummary {
    pub id: i64,
    pub date: NaiveDate,
    pub total_calories: f64,
    pub total_protein: f64,
    pub total_carbs: f64,
    pub total_fat: f64,
    pub calorie_goal: f64,
    pub protein_target: f64,
    pub hit_calorie_goal: bool,
    pub hit_protein_goal: bool,
}

impl DailySummary {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            date: row_date(row, "date")?,
            total_calories: row.get("total_calories")?,
            total_protein: row.get("total_protein")?,
            total_carbs: row.get("total_carbs")?,
            total_fat: row.get("total_fat")?,
            calorie_goal: row.get("calorie_goal")?,
            protein_target: row.get("protein_target")?,
            hit_calorie_goal: row.get("hit_calorie_goal")?,
            hit_protein_goal: row.get("hit_protein_goal")?,
        })
    }

    /// Build an unsaved record; the store assigns the real id
    pub fn from_figures(id: i64, date: NaiveDate, figures: &SummaryFigures) -> Self {
        let mut summary = Self {
            id,
            date,
            total_calories: 0.0,
            total_protein: 0.0,
            total_carbs: 0.0,
            total_fat: 0.0,
            calorie_goal: 0.0,
            protein_target: 0.0,
            hit_calorie_goal: false,
            hit_protein_goal: false,
        };
        summary.apply(figures);
        summary
    }

    /// Overwrite every computed field, leaving id and date alone
    pub fn apply(&mut self, figures: &SummaryFigures) {
        self.total_calories = figures.totals.calories;
        self.total_protein = figures.totals.protein;
        self.total_carbs = figures.totals.carbs;
        self.total_fat = figures.totals.fat;
        self.calorie_goal = figures.calorie_goal;
        self.protein_target = figures.protein_target;
        self.hit_calorie_goal = figures.hit_calorie_goal;
        self.hit_protein_goal = figures.hit_protein_goal;
    }

    pub fn totals(&self) -> Nutrition {
        Nutrition {
            calories: self.total_calories,
            protein: self.total_protein,
            carbs: self.total_carbs,
            fat: self.total_fat,
        }
    }

    /// Both the calorie and the protein goal were met
    pub fn hit_goals(&self) -> bool {
        self.hit_calorie_goal && self.hit_protein_goal
    }

    /// Insert a summary for a day that has none yet
    pub fn create(conn: &Connection, date: NaiveDate, figures: &SummaryFigures) -> DbResult<Self> {
        conn.execute(
            r#"
            INSERT INTO daily_summaries (
                date, total_calories, total_protein, total_carbs, total_fat,
                calorie_goal, protein_target, hit_calorie_goal, hit_protein_goal
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                format_date(date),
                figures.totals.calories,
                figures.totals.protein,
                figures.totals.carbs,
                figures.totals.fat,
                figures.calorie_goal,
                figures.protein_target,
                figures.hit_calorie_goal,
                figures.hit_protein_goal,
            ],
        )?;

        let id = conn.last_insert_rowid();
        Self::get_by_id(conn, id)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Get a summary by ID
    pub fn get_by_id(conn: &Connection, id: i64) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM daily_summaries WHERE id = ?1")?;

        let result = stmt.query_row([id], Self::from_row);
        match result {
            Ok(summary) => Ok(Some(summary)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Get the summary for a calendar day
    pub fn get_by_date(conn: &Connection, date: NaiveDate) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM daily_summaries WHERE date = ?1")?;

        let result = stmt.query_row([format_date(date)], Self::from_row);
        match result {
            Ok(summary) => Ok(Some(summary)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Write the computed fields of an existing summary back
    pub fn update_figures(conn: &Connection, summary: &DailySummary) -> DbResult<()> {
        let rows = conn.execute(
            r#"
            UPDATE daily_summaries SET
                total_calories = ?1,
                total_protein = ?2,
                total_carbs = ?3,
                total_fat = ?4,
                calorie_goal = ?5,
                protein_target = ?6,
                hit_calorie_goal = ?7,
                hit_protein_goal = ?8,
                updated_at = datetime('now')
            WHERE id = ?9
            "#,
            params![
                summary.total_calories,
                summary.total_protein,
                summary.total_carbs,
                summary.total_fat,
                summary.calorie_goal,
                summary.protein_target,
                summary.hit_calorie_goal,
                summary.hit_protein_goal,
                summary.id,
            ],
        )?;

        if rows == 0 {
            return Err(DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows));
        }
        Ok(())
    }

    /// Summaries with `start <= date <= end`, newest first
    pub fn list(
        conn: &Connection,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        limit: i64,
    ) -> DbResult<Vec<Self>> {
        let mut sql = String::from("SELECT * FROM daily_summaries WHERE 1=1");
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(start) = start_date {
            params_vec.push(Box::new(format_date(start)));
            sql.push_str(&format!(" AND date >= ?{}", params_vec.len()));
        }

        if let Some(end) = end_date {
            params_vec.push(Box::new(format_date(end)));
            sql.push_str(&format!(" AND date <= ?{}", params_vec.len()));
        }

        sql.push_str(" ORDER BY date DESC");

        params_vec.push(Box::new(limit));
        sql.push_str(&format!(" LIMIT ?{}", params_vec.len()));

        let mut stmt = conn.prepare(&sql)?;
        let params_refs: Vec<&dyn rusqlite::ToSql> = params_vec.iter().map(|p| p.as_ref()).collect();

        let summaries = stmt
            .query_map(params_refs.as_slice(), Self::from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    /// Delete every summary (bulk reset only)
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM daily_summaries", [])?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::migrations::run_migrations;

    fn setup() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        conn
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, d).unwrap()
    }

    fn figures(calories: f64) -> SummaryFigures {
        SummaryFigures {
            totals: Nutrition { calories, protein: 90.0, carbs: 200.0, fat: 50.0 },
            calorie_goal: 2000.0,
            protein_target: 84.0,
            hit_calorie_goal: calories <= 2000.0,
            hit_protein_goal: true,
        }
    }

    #[test]
    fn test_create_and_lookup_by_date() {
        let conn = setup();
        let created = DailySummary::create(&conn, day(9), &figures(1800.0)).unwrap();

        let loaded = DailySummary::get_by_date(&conn, day(9)).unwrap().unwrap();
        assert_eq!(loaded, created);
        assert!(loaded.hit_goals());
        assert!(DailySummary::get_by_date(&conn, day(10)).unwrap().is_none());
    }

    #[test]
    fn test_update_keeps_id_and_date() {
        let conn = setup();
        let mut summary = DailySummary::create(&conn, day(9), &figures(1800.0)).unwrap();
        summary.apply(&figures(2400.0));
        DailySummary::update_figures(&conn, &summary).unwrap();

        let loaded = DailySummary::get_by_date(&conn, day(9)).unwrap().unwrap();
        assert_eq!(loaded.id, summary.id);
        assert_eq!(loaded.total_calories, 2400.0);
        assert!(!loaded.hit_calorie_goal);
    }

    #[test]
    fn test_list_is_newest_first_and_bounded() {
        let conn = setup();
        for d in 1..=5 {
            DailySummary::create(&conn, day(d), &figures(1000.0)).unwrap();
        }

        let listed = DailySummary::list(&conn, Some(day(2)), Some(day(4)), 10).unwrap();
        let dates: Vec<_> = listed.iter().map(|s| s.date).collect();
        assert_eq!(dates, vec![day(4), day(3), day(2)]);

        let capped = DailySummary::list(&conn, None, None, 2).unwrap();
        assert_eq!(capped.len(), 2);
        assert_eq!(capped[0].date, day(5));
    }
}
