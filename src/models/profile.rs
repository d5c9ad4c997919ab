//! User profile model
//!
//! Single-row table holding the goals the daily summaries are judged against.

use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};

/// The active user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub weight_kg: f64,
    pub calorie_goal: f64,
    pub created_at: String,
    pub updated_at: String,
}

/// Data for setting the profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileSet {
    pub name: String,
    pub weight_kg: f64,
    pub calorie_goal: f64,
}

impl ProfileSet {
    fn validate(&self) -> DbResult<()> {
        if !self.weight_kg.is_finite() || self.weight_kg < 0.0 {
            return Err(DbError::InvalidData(format!(
                "weight_kg must be a non-negative number, got {}",
                self.weight_kg
            )));
        }
        if !self.calorie_goal.is_finite() || self.calorie_goal <= 0.0 {
            return Err(DbError::InvalidData(format!(
                "calorie_goal must be greater than 0, got {}",
                self.calorie_goal
            )));
        }
        Ok(())
    }
}

impl UserProfile {
    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get("id")?,
            name: row.get("name")?,
            weight_kg: row.get("weight_kg")?,
            calorie_goal: row.get("calorie_goal")?,
            created_at: row.get("created_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    /// Get the profile, if one has been set
    pub fn get(conn: &Connection) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM user_profile WHERE id = 1")?;

        let result = stmt.query_row([], Self::from_row);
        match result {
            Ok(profile) => Ok(Some(profile)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Set or update the profile (upsert)
    pub fn set(conn: &Connection, data: &ProfileSet) -> DbResult<Self> {
        data.validate()?;

        conn.execute(
            r#"
            INSERT INTO user_profile (id, name, weight_kg, calorie_goal)
            VALUES (1, ?1, ?2, ?3)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                weight_kg = excluded.weight_kg,
                calorie_goal = excluded.calorie_goal,
                updated_at = datetime('now')
            "#,
            params![data.name, data.weight_kg, data.calorie_goal],
        )?;

        Self::get(conn)?.ok_or_else(|| {
            DbError::Sqlite(rusqlite::Error::QueryReturnedNoRows)
        })
    }

    /// Remove the profile, returning whether one existed
    pub fn delete(conn: &Connection) -> DbResult<bool> {
        let rows = conn.execute("DELETE FROM user_profile", [])?;
        Ok(rows > 0)
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

    #[test]
    fn test_no_profile_by_default() {
        let conn = setup();
        assert!(UserProfile::get(&conn).unwrap().is_none());
    }

    #[test]
    fn test_set_is_an_upsert() {
        let conn = setup();
        let first = UserProfile::set(
            &conn,
            &ProfileSet { name: "Sam".to_string(), weight_kg: 70.0, calorie_goal: 2000.0 },
        )
        .unwrap();
        let second = UserProfile::set(
            &conn,
            &ProfileSet { name: "Sam".to_string(), weight_kg: 68.5, calorie_goal: 1800.0 },
        )
        .unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.weight_kg, 68.5);
        assert_eq!(second.calorie_goal, 1800.0);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM user_profile", [], |r| r.get(0))
            .unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn test_rejects_zero_calorie_goal() {
        let conn = setup();
        let result = UserProfile::set(
            &conn,
            &ProfileSet { name: String::new(), weight_kg: 70.0, calorie_goal: 0.0 },
        );
        assert!(matches!(result, Err(DbError::InvalidData(_))));
    }
}
