//! SQLite-backed [`Store`].
//!
//! Provides persistent storage for:
//! - The exercise catalog with accumulated XP
//! - The append-only activity and wellness logs
//! - Achievement unlock state
//! - Flat key-value settings

use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use rusqlite::{params, Connection, Row};

use super::{data_dir, migrations, CommitBatch, CommitReceipt, Store};
use crate::achievements::AchievementState;
use crate::error::{CoreError, StorageError};
use crate::model::{ActivityEntry, ExerciseId, ExerciseSkill};
use crate::wellness::{ReminderCategory, WellnessEvent};

/// SQLite database holding all geekfit state.
pub struct Database {
    conn: Connection,
    path: Option<PathBuf>,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// File backing this database, `None` for in-memory.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Open the database at `~/.config/geekfit/geekfit.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the data directory is unusable or the database
    /// cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("geekfit.db");
        Ok(Self::open_at(path)?)
    }

    /// Open (or create) the database at an explicit path.
    pub fn open_at(path: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let path = path.into();
        let conn = Connection::open(&path).map_err(|source| StorageError::OpenFailed {
            path: path.clone(),
            source,
        })?;
        Self::init(conn, Some(path))
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, StorageError> {
        let conn = Connection::open_in_memory().map_err(|source| StorageError::OpenFailed {
            path: PathBuf::from(":memory:"),
            source,
        })?;
        Self::init(conn, None)
    }

    fn init(conn: Connection, path: Option<PathBuf>) -> Result<Self, StorageError> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        migrations::migrate(&conn).map_err(|e| StorageError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn, path })
    }
}

fn parse_time(table: &'static str, raw: &str) -> Result<DateTime<Local>, StorageError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|t| t.with_timezone(&Local))
        .map_err(|e| StorageError::Corrupt {
            table,
            message: format!("bad timestamp '{raw}': {e}"),
        })
}

fn entry_from_row(row: &Row<'_>) -> rusqlite::Result<(i64, ExerciseId, u32, u64, String)> {
    Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
}

fn into_entry(raw: (i64, ExerciseId, u32, u64, String)) -> Result<ActivityEntry, StorageError> {
    let (id, exercise_id, reps, xp_earned, logged_at) = raw;
    Ok(ActivityEntry {
        id,
        exercise_id,
        reps,
        xp_earned,
        logged_at: parse_time("activity_log", &logged_at)?,
    })
}

impl Database {
    fn query_entries(
        &self,
        sql: &str,
        params: impl rusqlite::Params,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt.query_map(params, entry_from_row)?;
        rows.map(|raw| -> Result<ActivityEntry, StorageError> { into_entry(raw?) })
            .collect()
    }
}

impl Store for Database {
    fn exercises(&self) -> Result<Vec<ExerciseSkill>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, xp_per_rep, total_xp FROM exercises ORDER BY id")?;
        let rows = stmt.query_map([], |row| {
            Ok(ExerciseSkill::with_total_xp(
                row.get(0)?,
                row.get::<_, String>(1)?,
                row.get(2)?,
                row.get(3)?,
            ))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn entries(&self) -> Result<Vec<ActivityEntry>, StorageError> {
        self.query_entries(
            "SELECT id, exercise_id, reps, xp_earned, logged_at
             FROM activity_log ORDER BY logged_at, id",
            [],
        )
    }

    fn entries_between(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        // Offsets may differ between rows, so compare parsed instants.
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.logged_at >= from && e.logged_at < to)
            .collect())
    }

    fn entries_for_exercise(&self, exercise_id: ExerciseId) -> Result<Vec<ActivityEntry>, StorageError> {
        self.query_entries(
            "SELECT id, exercise_id, reps, xp_earned, logged_at
             FROM activity_log WHERE exercise_id = ?1 ORDER BY logged_at, id",
            params![exercise_id],
        )
    }

    fn achievements(&self) -> Result<Vec<AchievementState>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, unlocked_at FROM achievements ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;
        rows.map(|row| -> Result<AchievementState, StorageError> {
            let (key, unlocked_at) = row?;
            Ok(AchievementState {
                key,
                unlocked_at: unlocked_at
                    .as_deref()
                    .map(|raw| parse_time("achievements", raw))
                    .transpose()?,
            })
        })
        .collect()
    }

    fn wellness_events(&self) -> Result<Vec<WellnessEvent>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, category, logged_at FROM wellness_log ORDER BY logged_at, id")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, i64>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
            ))
        })?;
        rows.map(|row| -> Result<WellnessEvent, StorageError> {
            let (id, category, logged_at) = row?;
            let category: ReminderCategory =
                category.parse().map_err(|e| StorageError::Corrupt {
                    table: "wellness_log",
                    message: format!("{e}"),
                })?;
            Ok(WellnessEvent {
                id,
                category,
                logged_at: parse_time("wellness_log", &logged_at)?,
            })
        })
        .collect()
    }

    fn settings(&self) -> Result<Vec<(String, String)>, StorageError> {
        let mut stmt = self.conn.prepare("SELECT key, value FROM settings ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;
        Ok(rows.collect::<Result<_, _>>()?)
    }

    fn put_settings(&mut self, pairs: &[(String, String)]) -> Result<(), StorageError> {
        let tx = self.conn.transaction()?;
        for (key, value) in pairs {
            tx.execute(
                "INSERT OR REPLACE INTO settings (key, value) VALUES (?1, ?2)",
                params![key, value],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    fn add_exercise(&mut self, name: &str, xp_per_rep: u32) -> Result<ExerciseId, StorageError> {
        self.conn.execute(
            "INSERT INTO exercises (name, xp_per_rep) VALUES (?1, ?2)",
            params![name, xp_per_rep],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    fn delete_exercise(&mut self, id: ExerciseId) -> Result<(), StorageError> {
        // foreign_keys is on, so the log rows go with it.
        self.conn
            .execute("DELETE FROM exercises WHERE id = ?1", params![id])?;
        Ok(())
    }

    fn commit(&mut self, batch: &CommitBatch) -> Result<CommitReceipt, StorageError> {
        let tx = self.conn.transaction()?;
        let mut receipt = CommitReceipt::default();

        if let Some(entry) = &batch.entry {
            tx.execute(
                "INSERT INTO activity_log (exercise_id, reps, xp_earned, logged_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    entry.exercise_id,
                    entry.reps,
                    entry.xp_earned,
                    entry.logged_at.to_rfc3339(),
                ],
            )?;
            receipt.entry_id = Some(tx.last_insert_rowid());
        }

        if let Some((category, logged_at)) = batch.wellness {
            tx.execute(
                "INSERT INTO wellness_log (category, logged_at) VALUES (?1, ?2)",
                params![category.key(), logged_at.to_rfc3339()],
            )?;
            receipt.wellness_id = Some(tx.last_insert_rowid());
        }

        for skill in &batch.skills {
            let changed = tx.execute(
                "UPDATE exercises SET total_xp = ?1 WHERE id = ?2",
                params![skill.total_xp(), skill.id()],
            )?;
            if changed == 0 {
                // Dropping `tx` rolls back.
                return Err(StorageError::QueryFailed(format!(
                    "no exercise row {}",
                    skill.id()
                )));
            }
        }

        for state in &batch.achievements {
            tx.execute(
                "INSERT OR REPLACE INTO achievements (key, unlocked_at) VALUES (?1, ?2)",
                params![state.key, state.unlocked_at.map(|t| t.to_rfc3339())],
            )?;
        }

        tx.commit()?;
        Ok(receipt)
    }
}
