mod config;
pub mod database;
mod memory;
pub mod migrations;
mod seed;
mod settings;

pub use config::{Config, DataConfig, LoggingConfig, SchedulerConfig};
pub use database::Database;
pub use memory::MemoryStore;
pub use seed::DEFAULT_EXERCISES;
pub use settings::{CategorySettings, SettingKey, Settings, WorkHoursSettings};

use std::path::PathBuf;

use chrono::{DateTime, Local};

use crate::achievements::AchievementState;
use crate::error::{ConfigError, StorageError};
use crate::model::{ActivityEntry, EntryId, ExerciseId, ExerciseSkill};
use crate::wellness::{ReminderCategory, WellnessEvent};

/// Everything one mutation writes, applied by [`Store::commit`] as a unit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommitBatch {
    /// New log entry. Its `id` is ignored; the store assigns one.
    pub entry: Option<ActivityEntry>,
    pub wellness: Option<(ReminderCategory, DateTime<Local>)>,
    /// Skills whose totals changed.
    pub skills: Vec<ExerciseSkill>,
    /// Newly unlocked achievement rows.
    pub achievements: Vec<AchievementState>,
}

impl CommitBatch {
    pub fn is_empty(&self) -> bool {
        self.entry.is_none()
            && self.wellness.is_none()
            && self.skills.is_empty()
            && self.achievements.is_empty()
    }
}

/// Ids assigned while applying a [`CommitBatch`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CommitReceipt {
    pub entry_id: Option<EntryId>,
    pub wellness_id: Option<i64>,
}

/// Storage collaborator for the progression engine.
///
/// Reads return whole tables; the engine keeps its own in-memory mirror and
/// only writes through [`Store::commit`] and the catalog operations.
pub trait Store: Send {
    fn exercises(&self) -> Result<Vec<ExerciseSkill>, StorageError>;

    /// Full activity log, oldest first.
    fn entries(&self) -> Result<Vec<ActivityEntry>, StorageError>;

    /// Entries logged in `[from, to)`, oldest first.
    fn entries_between(
        &self,
        from: DateTime<Local>,
        to: DateTime<Local>,
    ) -> Result<Vec<ActivityEntry>, StorageError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.logged_at >= from && e.logged_at < to)
            .collect())
    }

    fn entries_for_exercise(&self, exercise_id: ExerciseId) -> Result<Vec<ActivityEntry>, StorageError> {
        Ok(self
            .entries()?
            .into_iter()
            .filter(|e| e.exercise_id == exercise_id)
            .collect())
    }

    fn achievements(&self) -> Result<Vec<AchievementState>, StorageError>;

    /// Wellness log, oldest first.
    fn wellness_events(&self) -> Result<Vec<WellnessEvent>, StorageError>;

    /// Raw settings pairs as stored.
    fn settings(&self) -> Result<Vec<(String, String)>, StorageError>;

    fn put_settings(&mut self, pairs: &[(String, String)]) -> Result<(), StorageError>;

    fn add_exercise(&mut self, name: &str, xp_per_rep: u32) -> Result<ExerciseId, StorageError>;

    /// Remove an exercise and every log entry that references it.
    fn delete_exercise(&mut self, id: ExerciseId) -> Result<(), StorageError>;

    /// Apply a batch atomically: either every write lands or none does.
    fn commit(&mut self, batch: &CommitBatch) -> Result<CommitReceipt, StorageError>;
}

/// Returns `~/.config/geekfit[-dev]/` based on GEEKFIT_ENV.
///
/// Set GEEKFIT_ENV=dev to use the development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("GEEKFIT_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("geekfit-dev")
    } else {
        base_dir.join("geekfit")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| ConfigError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
