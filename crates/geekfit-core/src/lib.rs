//! # Geekfit Core Library
//!
//! Core logic for Geekfit, a desk-friendly exercise tracker that turns reps
//! into RuneScape-style skill levels. Every operation is available through
//! the `geekfit` CLI; any GUI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Progression**: XP curve, tiers, per-exercise skills
//! - **Engine**: the single writer that applies an entry, checks records and
//!   achievements, and commits everything in one storage transaction
//! - **Stats**: streaks, aggregate totals, daily summaries
//! - **Wellness**: hydration/eye-care/posture reminders with focus deferral
//! - **Storage**: SQLite persistence and TOML configuration
//!
//! ## Key Components
//!
//! - [`ProgressionEngine`]: owns in-memory state and all writes
//! - [`Database`]: SQLite-backed [`Store`]
//! - [`Config`]: process configuration
//! - [`WellnessService`]: async reminder loop

pub mod achievements;
pub mod clock;
pub mod engine;
pub mod error;
pub mod events;
pub mod model;
pub mod progression;
pub mod records;
pub mod stats;
pub mod storage;
pub mod wellness;

pub use achievements::{AchievementView, UnlockedAchievement};
pub use clock::{Clock, ManualClock, SystemClock};
pub use engine::{HistoryItem, Notice, ProgressionEngine, SubmitOutcome, WellnessOutcome};
pub use error::{ConfigError, CoreError, StorageError, ValidationError};
pub use events::{Event, EventBus};
pub use model::{ActivityEntry, AggregateStats, ExerciseId, ExerciseSkill, SkillUpdate};
pub use progression::{level_from_xp, progress_within_level, tier_for_level, xp_for_level, Tier};
pub use records::{PersonalRecord, RecordKind};
pub use stats::DailySummary;
pub use storage::{Config, Database, MemoryStore, SettingKey, Settings, Store};
pub use wellness::{
    FocusDetector, ReminderCategory, ReminderScheduler, ResetTarget, WellnessHandle,
    WellnessService, WellnessStats,
};
