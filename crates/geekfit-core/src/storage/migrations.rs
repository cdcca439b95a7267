//! Database schema migrations for geekfit.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{params, Connection, Result as SqliteResult};
use tracing::{info, warn};

use super::DEFAULT_EXERCISES;

/// Current schema version.
///
/// Increment this when adding new migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = schema_version(conn);
    if current_version < 1 {
        migrate_v1(conn)?;
    }
    if current_version < 2 {
        migrate_v2(conn)?;
    }
    if current_version < SCHEMA_VERSION {
        info!(from = current_version, to = SCHEMA_VERSION, "database migrated");
    }
    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 for a fresh database.
pub fn schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: exercises, activity log, achievements, settings.
///
/// Seeds the default exercise catalog. Later migrations never reseed, so a
/// user who deletes every exercise keeps an empty catalog.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS exercises (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            name        TEXT NOT NULL UNIQUE COLLATE NOCASE,
            xp_per_rep  INTEGER NOT NULL CHECK (xp_per_rep > 0),
            total_xp    INTEGER NOT NULL DEFAULT 0
        );

        CREATE TABLE IF NOT EXISTS activity_log (
            id          INTEGER PRIMARY KEY AUTOINCREMENT,
            exercise_id INTEGER NOT NULL REFERENCES exercises(id) ON DELETE CASCADE,
            reps        INTEGER NOT NULL CHECK (reps > 0),
            xp_earned   INTEGER NOT NULL,
            logged_at   TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS achievements (
            key         TEXT PRIMARY KEY,
            unlocked_at TEXT
        );

        CREATE TABLE IF NOT EXISTS settings (
            key   TEXT PRIMARY KEY,
            value TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_activity_logged_at ON activity_log(logged_at);
        CREATE INDEX IF NOT EXISTS idx_activity_exercise ON activity_log(exercise_id, logged_at);",
    )?;

    for &(name, xp_per_rep) in DEFAULT_EXERCISES {
        tx.execute(
            "INSERT OR IGNORE INTO exercises (name, xp_per_rep) VALUES (?1, ?2)",
            params![name, xp_per_rep],
        )?;
    }

    set_schema_version(&tx, 1)?;
    tx.commit()
}

/// Migration v2: wellness log.
fn migrate_v2(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS wellness_log (
            id        INTEGER PRIMARY KEY AUTOINCREMENT,
            category  TEXT NOT NULL,
            logged_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_wellness_logged_at ON wellness_log(logged_at);",
    )?;

    set_schema_version(&tx, 2)?;
    tx.commit()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_database_reaches_current_version_with_seed() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn), SCHEMA_VERSION);

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, DEFAULT_EXERCISES.len() as i64);
    }

    #[test]
    fn migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute("DELETE FROM exercises", []).unwrap();
        migrate(&conn).unwrap();

        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM exercises", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }

    #[test]
    fn v1_database_gains_wellness_log() {
        let conn = Connection::open_in_memory().unwrap();
        create_schema_version_table(&conn).unwrap();
        migrate_v1(&conn).unwrap();
        assert_eq!(schema_version(&conn), 1);

        migrate(&conn).unwrap();
        assert_eq!(schema_version(&conn), 2);
        conn.execute(
            "INSERT INTO wellness_log (category, logged_at) VALUES ('hydration', '2024-01-01T09:00:00+00:00')",
            [],
        )
        .unwrap();
    }
}
