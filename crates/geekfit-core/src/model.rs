//! Domain records shared by the progression engine and the storage layer.

use chrono::{DateTime, Local, NaiveDate, Timelike};
use serde::{Deserialize, Serialize};

use crate::progression::{level_from_xp, progress_within_level, tier_for_level, LevelProgress, Tier};

pub type ExerciseId = i64;
pub type EntryId = i64;

/// One logged set. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEntry {
    pub id: EntryId,
    pub exercise_id: ExerciseId,
    pub reps: u32,
    pub xp_earned: u64,
    pub logged_at: DateTime<Local>,
}

impl ActivityEntry {
    /// Local calendar day the entry belongs to.
    pub fn day(&self) -> NaiveDate {
        self.logged_at.date_naive()
    }

    /// Local hour of day (0-23).
    pub fn hour(&self) -> u32 {
        self.logged_at.hour()
    }
}

/// Outcome of adding XP to one skill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkillUpdate {
    pub exercise_id: ExerciseId,
    pub previous_level: u8,
    pub new_level: u8,
    pub total_xp: u64,
}

impl SkillUpdate {
    pub fn leveled_up(&self) -> bool {
        self.new_level > self.previous_level
    }
}

/// An exercise and the XP accumulated on it.
///
/// `current_level` is never stored independently: it is recomputed from
/// `total_xp` on construction and on every XP change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExerciseSkill {
    id: ExerciseId,
    name: String,
    xp_per_rep: u32,
    total_xp: u64,
    current_level: u8,
}

impl ExerciseSkill {
    pub fn new(id: ExerciseId, name: impl Into<String>, xp_per_rep: u32) -> Self {
        Self::with_total_xp(id, name, xp_per_rep, 0)
    }

    /// Rebuild a skill from persisted totals.
    pub fn with_total_xp(
        id: ExerciseId,
        name: impl Into<String>,
        xp_per_rep: u32,
        total_xp: u64,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            xp_per_rep,
            total_xp,
            current_level: level_of(total_xp),
        }
    }

    pub fn id(&self) -> ExerciseId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn xp_per_rep(&self) -> u32 {
        self.xp_per_rep
    }

    pub fn total_xp(&self) -> u64 {
        self.total_xp
    }

    pub fn current_level(&self) -> u8 {
        self.current_level
    }

    pub fn tier(&self) -> Tier {
        tier_for_level(self.current_level)
    }

    pub fn progress(&self) -> LevelProgress {
        progress_within_level(i64::try_from(self.total_xp).unwrap_or(i64::MAX))
    }

    /// XP a set of `reps` is worth on this exercise.
    pub fn xp_for_reps(&self, reps: u32) -> u64 {
        u64::from(self.xp_per_rep) * u64::from(reps)
    }

    /// Add XP and recompute the level. Multi-level jumps report the final
    /// level only.
    pub(crate) fn add_xp(&mut self, xp: u64) -> SkillUpdate {
        let previous_level = self.current_level;
        self.total_xp = self.total_xp.saturating_add(xp);
        self.current_level = level_of(self.total_xp);
        SkillUpdate {
            exercise_id: self.id,
            previous_level,
            new_level: self.current_level,
            total_xp: self.total_xp,
        }
    }
}

fn level_of(total_xp: u64) -> u8 {
    level_from_xp(i64::try_from(total_xp).unwrap_or(i64::MAX))
}

/// Global stats, fully derived from skills and the activity log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregateStats {
    pub total_xp: u64,
    /// Sum of every skill's current level.
    pub total_level: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub last_activity_date: Option<NaiveDate>,
    pub exercise_count: usize,
}
