//! The single writer over progression state.
//!
//! Every mutation runs the same sequence on a staged copy of the in-memory
//! state (XP and level, streaks, record check, achievement pass), hands the
//! resulting writes to the store as one [`CommitBatch`], and only swaps the
//! staged copy in once the store has accepted it. `&mut self` on every
//! mutating method is the serialization point; share the engine behind a
//! mutex when more than one task needs to write.

use std::sync::Arc;

use chrono::{DateTime, Duration, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::{info, warn};

use crate::achievements::{
    AchievementBook, AchievementEvaluator, AchievementState, AchievementView, EvaluationContext,
    UnlockedAchievement,
};
use crate::clock::Clock;
use crate::error::{Result, ValidationError};
use crate::events::{Event, EventBus};
use crate::model::{ActivityEntry, AggregateStats, EntryId, ExerciseId, ExerciseSkill, SkillUpdate};
use crate::progression::{tier_for_level, Tier};
use crate::records::{self, PersonalRecord};
use crate::stats::{DailySummary, StatAggregator};
use crate::storage::{CommitBatch, SettingKey, Settings, Store};
use crate::wellness::{
    HydrationGoalGuard, ReminderCategory, ReminderScheduler, WellnessEvent, WellnessStats,
    WorkHoursGuard,
};

/// What the UI should announce for a submitted entry. One per entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    LevelUp {
        exercise_id: ExerciseId,
        new_level: u8,
        tier: Tier,
    },
    PersonalRecord(PersonalRecord),
    XpGained {
        exercise_id: ExerciseId,
        xp: u64,
    },
}

/// Result of [`ProgressionEngine::submit_activity`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmitOutcome {
    pub entry_id: EntryId,
    pub exercise_id: ExerciseId,
    pub xp_earned: u64,
    pub leveled_up: bool,
    pub previous_level: u8,
    pub new_level: u8,
    pub total_xp: u64,
    pub achievements_unlocked: Vec<UnlockedAchievement>,
    pub personal_record: Option<PersonalRecord>,
}

impl SubmitOutcome {
    /// Level-up beats a personal record, which beats the plain XP notice.
    pub fn headline(&self) -> Notice {
        if self.leveled_up {
            Notice::LevelUp {
                exercise_id: self.exercise_id,
                new_level: self.new_level,
                tier: tier_for_level(self.new_level),
            }
        } else if let Some(record) = self.personal_record {
            Notice::PersonalRecord(record)
        } else {
            Notice::XpGained {
                exercise_id: self.exercise_id,
                xp: self.xp_earned,
            }
        }
    }
}

/// Result of [`ProgressionEngine::record_wellness`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessOutcome {
    pub event_id: i64,
    pub category: ReminderCategory,
    pub today_count: u64,
    pub achievements_unlocked: Vec<UnlockedAchievement>,
}

/// A log entry joined with its exercise name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub exercise_name: String,
    #[serde(flatten)]
    pub entry: ActivityEntry,
}

pub struct ProgressionEngine<S: Store> {
    store: S,
    clock: Arc<dyn Clock>,
    bus: EventBus,
    evaluator: AchievementEvaluator,
    aggregator: StatAggregator,
    book: AchievementBook,
    entries: Vec<ActivityEntry>,
    wellness: Vec<WellnessEvent>,
    settings: Settings,
    stats_tx: watch::Sender<AggregateStats>,
    wellness_tx: watch::Sender<WellnessStats>,
}

impl<S: Store> ProgressionEngine<S> {
    /// Load all state from `store` and run one achievement pass over the
    /// full history, so definitions added since the last run unlock
    /// retroactively.
    pub fn open(store: S, clock: Arc<dyn Clock>, bus: EventBus) -> Result<Self> {
        Self::with_evaluator(store, clock, bus, AchievementEvaluator::default())
    }

    pub fn with_evaluator(
        store: S,
        clock: Arc<dyn Clock>,
        bus: EventBus,
        evaluator: AchievementEvaluator,
    ) -> Result<Self> {
        let mut entries = store.entries()?;
        entries.sort_by_key(|e| (e.logged_at, e.id));
        let aggregator = StatAggregator::new(store.exercises()?, &entries);
        let book = AchievementBook::seeded(evaluator.definitions(), store.achievements()?);
        let wellness = store.wellness_events()?;
        let settings = Settings::from_pairs(store.settings()?);

        let today = clock.now().date_naive();
        let (stats_tx, _) = watch::channel(aggregator.snapshot(today));
        let (wellness_tx, _) = watch::channel(WellnessStats::from_events(
            &wellness,
            settings.hydration_daily_goal,
            today,
        ));

        let mut engine = Self {
            store,
            clock,
            bus,
            evaluator,
            aggregator,
            book,
            entries,
            wellness,
            settings,
            stats_tx,
            wellness_tx,
        };
        engine.reevaluate()?;
        Ok(engine)
    }

    /// Log `reps` of an exercise as one atomic unit.
    ///
    /// Validation happens before anything is touched. If the store rejects
    /// the commit, no in-memory state changes and no event is published.
    pub fn submit_activity(&mut self, exercise_id: ExerciseId, reps: i64) -> Result<SubmitOutcome> {
        if reps <= 0 {
            return Err(ValidationError::NonPositiveReps { reps }.into());
        }
        let reps = u32::try_from(reps).map_err(|_| ValidationError::InvalidValue {
            field: "reps".into(),
            message: format!("{reps} is too large"),
        })?;
        let skill = self
            .aggregator
            .skill(exercise_id)
            .ok_or(ValidationError::UnknownExercise(exercise_id))?;

        let now = self.clock.now();
        let today = now.date_naive();
        let entry = ActivityEntry {
            id: 0,
            exercise_id,
            reps,
            xp_earned: skill.xp_for_reps(reps),
            logged_at: now,
        };

        let xp_earned = entry.xp_earned;
        let personal_record = records::detect(&entry, &self.entries);
        let mut aggregator = self.aggregator.clone();
        let update = aggregator.apply_entry(&entry)?;
        let stats = aggregator.snapshot(today);
        let wellness = self.wellness_snapshot(today);

        // Staged; popped again if the commit fails.
        self.entries.push(entry.clone());
        let mut book = self.book.clone();
        let unlocked = self.evaluator.evaluate(
            &mut book,
            &EvaluationContext {
                stats: &stats,
                skills: aggregator.skills().collect(),
                entries: &self.entries,
                wellness: &wellness,
            },
            now,
        );

        let batch = CommitBatch {
            entry: Some(entry),
            wellness: None,
            skills: aggregator.skill(exercise_id).cloned().into_iter().collect(),
            achievements: unlocked_states(&unlocked),
        };
        let receipt = match self.store.commit(&batch) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.entries.pop();
                warn!(exercise_id, error = %err, "activity rolled back");
                return Err(err.into());
            }
        };

        let entry_id = receipt.entry_id.unwrap_or_default();
        if let Some(last) = self.entries.last_mut() {
            last.id = entry_id;
        }
        self.aggregator = aggregator;
        self.book = book;
        self.stats_tx.send_replace(stats);

        info!(exercise_id, reps, xp = update.total_xp, level = update.new_level, "activity logged");
        self.publish_activity(entry_id, reps, xp_earned, now, &update, personal_record, &unlocked);

        Ok(SubmitOutcome {
            entry_id,
            exercise_id,
            xp_earned,
            leveled_up: update.leveled_up(),
            previous_level: update.previous_level,
            new_level: update.new_level,
            total_xp: update.total_xp,
            achievements_unlocked: unlocked,
            personal_record,
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn publish_activity(
        &self,
        entry_id: EntryId,
        reps: u32,
        xp_earned: u64,
        at: DateTime<Local>,
        update: &SkillUpdate,
        record: Option<PersonalRecord>,
        unlocked: &[UnlockedAchievement],
    ) {
        self.bus.publish(Event::ActivityLogged {
            entry_id,
            exercise_id: update.exercise_id,
            reps,
            xp_earned,
            at,
        });
        if update.leveled_up() {
            info!(
                exercise_id = update.exercise_id,
                from = update.previous_level,
                to = update.new_level,
                "level up"
            );
            self.bus.publish(Event::SkillLeveledUp {
                exercise_id: update.exercise_id,
                previous_level: update.previous_level,
                new_level: update.new_level,
                tier: tier_for_level(update.new_level),
                at,
            });
        }
        if let Some(record) = record {
            self.bus.publish(Event::PersonalRecordSet { record, at });
        }
        self.publish_unlocks(unlocked);
    }

    fn publish_unlocks(&self, unlocked: &[UnlockedAchievement]) {
        for achievement in unlocked {
            self.bus.publish(Event::AchievementUnlocked {
                key: achievement.key.clone(),
                name: achievement.name.clone(),
                at: achievement.unlocked_at,
            });
        }
    }

    /// Record a completed wellness action ("done" on a reminder).
    pub fn record_wellness(&mut self, category: ReminderCategory) -> Result<WellnessOutcome> {
        let now = self.clock.now();
        let today = now.date_naive();

        self.wellness.push(WellnessEvent {
            id: 0,
            category,
            logged_at: now,
        });
        let wellness = self.wellness_snapshot(today);
        let stats = self.aggregator.snapshot(today);
        let mut book = self.book.clone();
        let unlocked = self.evaluator.evaluate(
            &mut book,
            &EvaluationContext {
                stats: &stats,
                skills: self.aggregator.skills().collect(),
                entries: &self.entries,
                wellness: &wellness,
            },
            now,
        );

        let batch = CommitBatch {
            wellness: Some((category, now)),
            achievements: unlocked_states(&unlocked),
            ..CommitBatch::default()
        };
        let receipt = match self.store.commit(&batch) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.wellness.pop();
                warn!(%category, error = %err, "wellness event rolled back");
                return Err(err.into());
            }
        };

        let event_id = receipt.wellness_id.unwrap_or_default();
        if let Some(last) = self.wellness.last_mut() {
            last.id = event_id;
        }
        self.book = book;
        let today_count = wellness.today(category);
        self.wellness_tx.send_replace(wellness);

        info!(%category, today_count, "wellness action recorded");
        self.bus.publish(Event::WellnessLogged { category, at: now });
        self.publish_unlocks(&unlocked);

        Ok(WellnessOutcome {
            event_id,
            category,
            today_count,
            achievements_unlocked: unlocked,
        })
    }

    /// Run an achievement pass with no new data and persist any unlocks.
    pub fn reevaluate(&mut self) -> Result<Vec<UnlockedAchievement>> {
        let now = self.clock.now();
        let today = now.date_naive();
        let stats = self.aggregator.snapshot(today);
        let wellness = self.wellness_snapshot(today);
        let mut book = self.book.clone();
        let unlocked = self.evaluator.evaluate(
            &mut book,
            &EvaluationContext {
                stats: &stats,
                skills: self.aggregator.skills().collect(),
                entries: &self.entries,
                wellness: &wellness,
            },
            now,
        );
        if unlocked.is_empty() {
            return Ok(unlocked);
        }

        self.store.commit(&CommitBatch {
            achievements: unlocked_states(&unlocked),
            ..CommitBatch::default()
        })?;
        self.book = book;
        self.publish_unlocks(&unlocked);
        Ok(unlocked)
    }

    /// Add an exercise to the catalog.
    pub fn add_exercise(&mut self, name: &str, xp_per_rep: i64) -> Result<ExerciseSkill> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidValue {
                field: "name".into(),
                message: "must not be empty".into(),
            }
            .into());
        }
        let xp_per_rep = u32::try_from(xp_per_rep)
            .ok()
            .filter(|&xp| xp > 0)
            .ok_or_else(|| ValidationError::InvalidValue {
                field: "xp_per_rep".into(),
                message: format!("must be a positive integer, got {xp_per_rep}"),
            })?;
        if self
            .aggregator
            .skills()
            .any(|s| s.name().eq_ignore_ascii_case(name))
        {
            return Err(ValidationError::DuplicateExercise(name.to_string()).into());
        }

        let id = self.store.add_exercise(name, xp_per_rep)?;
        let skill = ExerciseSkill::new(id, name, xp_per_rep);
        self.aggregator.insert_skill(skill.clone());
        self.refresh_stats();
        info!(id, name, xp_per_rep, "exercise added");
        Ok(skill)
    }

    /// Delete an exercise and its log entries. Unlocked achievements and
    /// the longest streak ever reached are kept.
    pub fn delete_exercise(&mut self, id: ExerciseId) -> Result<()> {
        if self.aggregator.skill(id).is_none() {
            return Err(ValidationError::UnknownExercise(id).into());
        }
        self.store.delete_exercise(id)?;

        self.entries.retain(|e| e.exercise_id != id);
        let skills: Vec<ExerciseSkill> = self
            .aggregator
            .skills()
            .filter(|s| s.id() != id)
            .cloned()
            .collect();
        self.aggregator = self.aggregator.rebuilt(skills, &self.entries);
        self.refresh_stats();
        info!(id, "exercise deleted");
        Ok(())
    }

    /// Exact case-insensitive name match, else the first partial match.
    pub fn find_exercise(&self, query: &str) -> Result<&ExerciseSkill> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Err(ValidationError::NoMatchingExercise(query).into());
        }
        self.aggregator
            .skills()
            .find(|s| s.name().to_lowercase() == query)
            .or_else(|| {
                self.aggregator
                    .skills()
                    .find(|s| s.name().to_lowercase().contains(&query))
            })
            .ok_or_else(|| ValidationError::NoMatchingExercise(query).into())
    }

    /// Exercises whose name contains `query` (case-insensitive), highest
    /// level first, at most `limit` of them. An empty query matches all.
    pub fn search_exercises(&self, query: &str, limit: usize) -> Vec<&ExerciseSkill> {
        let query = query.trim().to_lowercase();
        let mut found: Vec<&ExerciseSkill> = self
            .aggregator
            .skills()
            .filter(|s| s.name().to_lowercase().contains(&query))
            .collect();
        found.sort_by(|a, b| {
            b.current_level()
                .cmp(&a.current_level())
                .then_with(|| a.id().cmp(&b.id()))
        });
        found.truncate(limit);
        found
    }

    pub fn exercise(&self, id: ExerciseId) -> Option<&ExerciseSkill> {
        self.aggregator.skill(id)
    }

    pub fn exercises(&self) -> impl Iterator<Item = &ExerciseSkill> {
        self.aggregator.skills()
    }

    /// Stats as of the clock's current day.
    pub fn aggregate_stats(&self) -> AggregateStats {
        self.aggregator.snapshot(self.clock.now().date_naive())
    }

    /// Catalog joined with unlock state, in catalog order.
    pub fn achievements(&self) -> Vec<AchievementView> {
        self.evaluator.views(&self.book)
    }

    pub fn daily_summary(&self, date: Option<NaiveDate>) -> DailySummary {
        let date = date.unwrap_or_else(|| self.clock.now().date_naive());
        DailySummary::build(date, self.settings.daily_goal_xp, &self.entries, |id| {
            self.aggregator.skill(id)
        })
    }

    /// Entries from the last `days` local days (today included), newest first.
    pub fn history(&self, days: u32) -> Vec<HistoryItem> {
        let today = self.clock.now().date_naive();
        let first_day = today
            .checked_sub_signed(Duration::days(i64::from(days.max(1)) - 1))
            .unwrap_or(NaiveDate::MIN);
        self.entries
            .iter()
            .rev()
            .filter(|e| e.day() >= first_day && e.day() <= today)
            .map(|e| HistoryItem {
                exercise_name: self
                    .aggregator
                    .skill(e.exercise_id)
                    .map(|s| s.name().to_string())
                    .unwrap_or_else(|| format!("#{}", e.exercise_id)),
                entry: e.clone(),
            })
            .collect()
    }

    pub fn entries(&self) -> &[ActivityEntry] {
        &self.entries
    }

    pub fn wellness_stats(&self) -> WellnessStats {
        self.wellness_snapshot(self.clock.now().date_naive())
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Validate, persist and apply one setting. Returns the updated settings.
    pub fn update_setting(&mut self, key: SettingKey, value: &str) -> Result<&Settings> {
        let mut next = self.settings.clone();
        next.set(key, value)?;
        self.store.put_settings(&[(key.name(), next.get(key))])?;
        self.settings = next;
        if key == SettingKey::HydrationDailyGoal {
            self.wellness_tx.send_replace(self.wellness_stats());
        }
        info!(key = %key, value = %self.settings.get(key), "setting updated");
        Ok(&self.settings)
    }

    /// Reminder scheduler for the current settings, with the hydration-goal
    /// guard wired to this engine's wellness snapshots and the work-hours
    /// guard when enabled.
    pub fn reminder_scheduler(&self, started_at: DateTime<Local>) -> ReminderScheduler {
        let mut scheduler = ReminderScheduler::from_settings(&self.settings, started_at).with_guard(
            HydrationGoalGuard::new(self.wellness_tx.subscribe()),
        );
        let hours = &self.settings.work_hours;
        if hours.enabled {
            scheduler.add_guard(Box::new(WorkHoursGuard::new(
                hours.start_hour,
                hours.end_hour,
                hours.days.clone(),
            )));
        }
        scheduler
    }

    /// Eventually-consistent stats for readers outside the writer.
    pub fn subscribe_stats(&self) -> watch::Receiver<AggregateStats> {
        self.stats_tx.subscribe()
    }

    pub fn subscribe_wellness(&self) -> watch::Receiver<WellnessStats> {
        self.wellness_tx.subscribe()
    }

    pub fn bus(&self) -> &EventBus {
        &self.bus
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    fn wellness_snapshot(&self, today: NaiveDate) -> WellnessStats {
        WellnessStats::from_events(&self.wellness, self.settings.hydration_daily_goal, today)
    }

    fn refresh_stats(&self) {
        self.stats_tx.send_replace(self.aggregate_stats());
    }
}

fn unlocked_states(unlocked: &[UnlockedAchievement]) -> Vec<AchievementState> {
    unlocked
        .iter()
        .map(|u| AchievementState {
            key: u.key.clone(),
            unlocked_at: Some(u.unlocked_at),
        })
        .collect()
}
