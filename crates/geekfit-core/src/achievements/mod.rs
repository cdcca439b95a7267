//! Achievement catalog and unlock tracking.
//!
//! Definitions are static data; each carries a [`Condition`] evaluated
//! against the full history on every pass. Unlock state is kept per key and
//! flips from locked to unlocked at most once.

mod catalog;
mod evaluator;

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

pub use catalog::{catalog, definition};
pub use evaluator::{AchievementBook, AchievementEvaluator, Condition, EvaluationContext};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AchievementCategory {
    Milestone,
    Consistency,
    Mastery,
    Variety,
    TimeOfDay,
    Wellness,
}

/// Static catalog entry.
#[derive(Debug, Clone, Copy)]
pub struct AchievementDefinition {
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub category: AchievementCategory,
    pub condition: Condition,
}

/// Persisted unlock state for one key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementState {
    pub key: String,
    pub unlocked_at: Option<DateTime<Local>>,
}

impl AchievementState {
    pub fn locked(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            unlocked_at: None,
        }
    }

    pub fn is_unlocked(&self) -> bool {
        self.unlocked_at.is_some()
    }

    /// Set the unlock time if not already set. Returns whether it changed.
    pub fn unlock(&mut self, at: DateTime<Local>) -> bool {
        if self.unlocked_at.is_some() {
            return false;
        }
        self.unlocked_at = Some(at);
        true
    }
}

/// Emitted once per key, on the pass that unlocked it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedAchievement {
    pub key: String,
    pub name: String,
    pub description: String,
    pub unlocked_at: DateTime<Local>,
}

/// Unlock state joined with catalog metadata, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AchievementView {
    pub key: String,
    pub name: String,
    pub description: String,
    pub category: AchievementCategory,
    pub unlocked_at: Option<DateTime<Local>>,
}

impl AchievementView {
    pub fn new(definition: &AchievementDefinition, state: Option<&AchievementState>) -> Self {
        Self {
            key: definition.key.to_string(),
            name: definition.name.to_string(),
            description: definition.description.to_string(),
            category: definition.category,
            unlocked_at: state.and_then(|s| s.unlocked_at),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn unlock_is_set_once() {
        let first = Local.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap();
        let later = Local.with_ymd_and_hms(2024, 2, 1, 8, 0, 0).unwrap();

        let mut state = AchievementState::locked("first_exercise");
        assert!(state.unlock(first));
        assert!(!state.unlock(later));
        assert_eq!(state.unlocked_at, Some(first));
    }
}
