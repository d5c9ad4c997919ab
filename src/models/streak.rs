//! Streak model
//!
//! Consecutive-day counters, one row per streak type.

use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};
use serde::{Deserialize, Serialize};

use crate::db::{DbError, DbResult};
use super::dates::{format_date, row_date_opt};

/// The two tracked streaks
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum StreakKind {
    /// At least one meal logged that day
    Logging,
    /// Calorie and protein goals both hit that day
    Goal,
}

impl StreakKind {
    pub const ALL: [StreakKind; 2] = [StreakKind::Logging, StreakKind::Goal];

    pub fn as_str(&self) -> &'static str {
        match self {
            StreakKind::Logging => "logging",
            StreakKind::Goal => "goal",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "logging" => Some(StreakKind::Logging),
            "goal" => Some(StreakKind::Goal),
            _ => None,
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            StreakKind::Logging => "Logging Streak",
            StreakKind::Goal => "Goal Streak",
        }
    }
}

/// Counter state for one streak type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Streak {
    pub kind: StreakKind,
    pub current_count: u32,
    /// Running maximum of every `current_count` seen
    pub longest_count: u32,
    pub last_date_counted: Option<NaiveDate>,
}

impl Streak {
    /// A streak that has never counted a day
    pub fn new(kind: StreakKind) -> Self {
        Self {
            kind,
            current_count: 0,
            longest_count: 0,
            last_date_counted: None,
        }
    }

    fn from_row(row: &Row) -> rusqlite::Result<Self> {
        let kind: String = row.get("streak_type")?;
        let kind = StreakKind::parse(&kind).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                0,
                rusqlite::types::Type::Text,
                Box::new(DbError::InvalidData(format!("unknown streak type '{}'", kind))),
            )
        })?;
        Ok(Self {
            kind,
            current_count: row.get("current_count")?,
            longest_count: row.get("longest_count")?,
            last_date_counted: row_date_opt(row, "last_date_counted")?,
        })
    }

    /// Get the stored streak of a kind
    pub fn get(conn: &Connection, kind: StreakKind) -> DbResult<Option<Self>> {
        let mut stmt = conn.prepare("SELECT * FROM streaks WHERE streak_type = ?1")?;

        let result = stmt.query_row([kind.as_str()], Self::from_row);
        match result {
            Ok(streak) => Ok(Some(streak)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Insert or overwrite the row for this streak's kind
    pub fn save(conn: &Connection, streak: &Streak) -> DbResult<()> {
        conn.execute(
            r#"
            INSERT INTO streaks (streak_type, current_count, longest_count, last_date_counted)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(streak_type) DO UPDATE SET
                current_count = excluded.current_count,
                longest_count = excluded.longest_count,
                last_date_counted = excluded.last_date_counted,
                updated_at = datetime('now')
            "#,
            params![
                streak.kind.as_str(),
                streak.current_count,
                streak.longest_count,
                streak.last_date_counted.map(format_date),
            ],
        )?;
        Ok(())
    }

    /// Delete every streak (bulk reset only)
    pub fn delete_all(conn: &Connection) -> DbResult<usize> {
        Ok(conn.execute("DELETE FROM streaks", [])?)
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
    fn test_missing_streak_is_none() {
        let conn = setup();
        assert!(Streak::get(&conn, StreakKind::Goal).unwrap().is_none());
    }

    #[test]
    fn test_save_overwrites_by_kind() {
        let conn = setup();
        let day = NaiveDate::from_ymd_opt(2025, 1, 9).unwrap();

        let mut streak = Streak::new(StreakKind::Logging);
        Streak::save(&conn, &streak).unwrap();

        streak.current_count = 3;
        streak.longest_count = 5;
        streak.last_date_counted = Some(day);
        Streak::save(&conn, &streak).unwrap();

        let loaded = Streak::get(&conn, StreakKind::Logging).unwrap().unwrap();
        assert_eq!(loaded, streak);
        assert!(Streak::get(&conn, StreakKind::Goal).unwrap().is_none());
    }

    #[test]
    fn test_kind_names() {
        assert_eq!(StreakKind::parse("GOAL"), Some(StreakKind::Goal));
        assert_eq!(StreakKind::parse("weekly"), None);
        assert_eq!(StreakKind::Logging.title(), "Logging Streak");
    }
}
