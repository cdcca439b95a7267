//! In-process [`Store`], for tests and embedding.

use std::collections::BTreeMap;

use super::{CommitBatch, CommitReceipt, Store, DEFAULT_EXERCISES};
use crate::achievements::AchievementState;
use crate::error::StorageError;
use crate::model::{ActivityEntry, ExerciseId, ExerciseSkill};
use crate::wellness::WellnessEvent;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    exercises: BTreeMap<ExerciseId, ExerciseSkill>,
    entries: Vec<ActivityEntry>,
    achievements: BTreeMap<String, AchievementState>,
    wellness: Vec<WellnessEvent>,
    settings: BTreeMap<String, String>,
    next_exercise_id: ExerciseId,
    next_entry_id: i64,
    next_wellness_id: i64,
    failing: bool,
}

impl MemoryStore {
    /// Empty store with no exercises.
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with the default exercise catalog.
    pub fn seeded() -> Self {
        let mut store = Self::new();
        for &(name, xp_per_rep) in DEFAULT_EXERCISES {
            store.insert_exercise(name, xp_per_rep);
        }
        store
    }

    /// Make every following write fail with `StorageError::Unavailable`.
    pub fn set_failing(&mut self, failing: bool) {
        self.failing = failing;
    }

    fn check_writable(&self) -> Result<(), StorageError> {
        if self.failing {
            return Err(StorageError::Unavailable("memory store set to fail".into()));
        }
        Ok(())
    }

    fn insert_exercise(&mut self, name: &str, xp_per_rep: u32) -> ExerciseId {
        self.next_exercise_id += 1;
        let id = self.next_exercise_id;
        self.exercises.insert(id, ExerciseSkill::new(id, name, xp_per_rep));
        id
    }
}

impl Store for MemoryStore {
    fn exercises(&self) -> Result<Vec<ExerciseSkill>, StorageError> {
        Ok(self.exercises.values().cloned().collect())
    }

    fn entries(&self) -> Result<Vec<ActivityEntry>, StorageError> {
        Ok(self.entries.clone())
    }

    fn achievements(&self) -> Result<Vec<AchievementState>, StorageError> {
        Ok(self.achievements.values().cloned().collect())
    }

    fn wellness_events(&self) -> Result<Vec<WellnessEvent>, StorageError> {
        Ok(self.wellness.clone())
    }

    fn settings(&self) -> Result<Vec<(String, String)>, StorageError> {
        Ok(self
            .settings
            .iter()
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn put_settings(&mut self, pairs: &[(String, String)]) -> Result<(), StorageError> {
        self.check_writable()?;
        for (key, value) in pairs {
            self.settings.insert(key.clone(), value.clone());
        }
        Ok(())
    }

    fn add_exercise(&mut self, name: &str, xp_per_rep: u32) -> Result<ExerciseId, StorageError> {
        self.check_writable()?;
        if self
            .exercises
            .values()
            .any(|s| s.name().eq_ignore_ascii_case(name))
        {
            return Err(StorageError::QueryFailed(format!(
                "UNIQUE constraint failed: exercises.name ({name})"
            )));
        }
        Ok(self.insert_exercise(name, xp_per_rep))
    }

    fn delete_exercise(&mut self, id: ExerciseId) -> Result<(), StorageError> {
        self.check_writable()?;
        self.exercises.remove(&id);
        self.entries.retain(|e| e.exercise_id != id);
        Ok(())
    }

    fn commit(&mut self, batch: &CommitBatch) -> Result<CommitReceipt, StorageError> {
        self.check_writable()?;
        for skill in &batch.skills {
            if !self.exercises.contains_key(&skill.id()) {
                return Err(StorageError::QueryFailed(format!(
                    "no exercise row {}",
                    skill.id()
                )));
            }
        }

        // Validated above; nothing below can fail.
        let mut receipt = CommitReceipt::default();
        if let Some(entry) = &batch.entry {
            self.next_entry_id += 1;
            self.entries.push(ActivityEntry {
                id: self.next_entry_id,
                ..entry.clone()
            });
            receipt.entry_id = Some(self.next_entry_id);
        }
        if let Some((category, logged_at)) = batch.wellness {
            self.next_wellness_id += 1;
            self.wellness.push(WellnessEvent {
                id: self.next_wellness_id,
                category,
                logged_at,
            });
            receipt.wellness_id = Some(self.next_wellness_id);
        }
        for skill in &batch.skills {
            self.exercises.insert(skill.id(), skill.clone());
        }
        for state in &batch.achievements {
            self.achievements.insert(state.key.clone(), state.clone());
        }
        Ok(receipt)
    }
}
