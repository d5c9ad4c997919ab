//! Database migrations
//!
//! Schema creation and migration logic.

use rusqlite::Connection;

use super::connection::DbResult;

/// Current schema version
const SCHEMA_VERSION: i32 = 1;

/// Run all migrations to bring the database up to the current schema version
pub fn run_migrations(conn: &Connection) -> DbResult<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_migrations (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )",
        [],
    )?;

    let current_version = get_schema_version(conn)?;

    if current_version < 1 {
        migrate_v1(conn)?;
        conn.execute("INSERT INTO schema_migrations (version) VALUES (1)", [])?;
        tracing::info!(version = 1, "applied schema migration");
    }

    Ok(())
}

/// Migration v1: Initial schema
fn migrate_v1(conn: &Connection) -> DbResult<()> {
    conn.execute_batch(
        r#"
        -- ============================================
        -- MEALS
        -- Logged meals, from the camera flow or typed in
        -- ============================================
        CREATE TABLE meals (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            title TEXT NOT NULL DEFAULT 'Meal',
            notes TEXT,

            calories REAL NOT NULL DEFAULT 0,
            protein REAL,                        -- grams, NULL when unknown
            carbs REAL,                          -- grams
            fat REAL,                            -- grams

            -- UTC, RFC 3339 with millisecond precision (fixed width, sortable)
            timestamp TEXT NOT NULL,

            source TEXT NOT NULL CHECK(source IN ('camera', 'manual')) DEFAULT 'manual',
            is_edited INTEGER NOT NULL DEFAULT 0,
            ai_request_id TEXT,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX idx_meals_timestamp ON meals(timestamp);

        -- ============================================
        -- USER PROFILE
        -- Single row (id = 1)
        -- ============================================
        CREATE TABLE user_profile (
            id INTEGER PRIMARY KEY CHECK(id = 1),
            name TEXT NOT NULL DEFAULT '',
            weight_kg REAL NOT NULL DEFAULT 70,
            calorie_goal REAL NOT NULL DEFAULT 2000,
            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- DAILY SUMMARIES
        -- One materialized aggregate per local calendar day
        -- ============================================
        CREATE TABLE daily_summaries (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL UNIQUE,           -- ISO date: "2025-01-09"

            total_calories REAL NOT NULL DEFAULT 0,
            total_protein REAL NOT NULL DEFAULT 0,
            total_carbs REAL NOT NULL DEFAULT 0,
            total_fat REAL NOT NULL DEFAULT 0,

            -- Goal snapshots at computation time
            calorie_goal REAL NOT NULL,
            protein_target REAL NOT NULL,
            hit_calorie_goal INTEGER NOT NULL DEFAULT 0,
            hit_protein_goal INTEGER NOT NULL DEFAULT 0,

            created_at TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- ============================================
        -- STREAKS
        -- One counter pair per streak type
        -- ============================================
        CREATE TABLE streaks (
            streak_type TEXT PRIMARY KEY CHECK(streak_type IN ('logging', 'goal')),
            current_count INTEGER NOT NULL DEFAULT 0 CHECK(current_count >= 0),
            longest_count INTEGER NOT NULL DEFAULT 0 CHECK(longest_count >= 0),
            last_date_counted TEXT,              -- ISO date, NULL until first count
            updated_at TEXT NOT NULL DEFAULT (datetime('now')),

            CHECK(longest_count >= current_count)
        );
        "#,
    )?;

    Ok(())
}

/// Get the current schema version
pub fn get_schema_version(conn: &Connection) -> DbResult<i32> {
    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

/// Check if the database needs migration
pub fn needs_migration(conn: &Connection) -> DbResult<bool> {
    let current = get_schema_version(conn)?;
    Ok(current < SCHEMA_VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrations_are_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        assert_eq!(get_schema_version(&conn).unwrap(), SCHEMA_VERSION);
        assert!(!needs_migration(&conn).unwrap());
    }

    #[test]
    fn test_streak_counts_are_constrained() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let bad = conn.execute(
            "INSERT INTO streaks (streak_type, current_count, longest_count) VALUES ('logging', 3, 2)",
            [],
        );
        assert!(bad.is_err());

        let unknown = conn.execute(
            "INSERT INTO streaks (streak_type) VALUES ('weekly')",
            [],
        );
        assert!(unknown.is_err());
    }

    #[test]
    fn test_one_summary_per_date() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();

        let insert = "INSERT INTO daily_summaries (date, calorie_goal, protein_target) VALUES ('2025-01-09', 2000, 84)";
        conn.execute(insert, []).unwrap();
        assert!(conn.execute(insert, []).is_err());
    }
}
