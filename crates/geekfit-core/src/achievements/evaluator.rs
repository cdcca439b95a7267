use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Datelike, Local, NaiveDate, Weekday};
use tracing::info;

use super::{catalog, AchievementDefinition, AchievementState, AchievementView, UnlockedAchievement};
use crate::model::{ActivityEntry, AggregateStats, ExerciseSkill};
use crate::wellness::{ReminderCategory, WellnessStats};

/// Unlock predicate. Every variant is monotonic over an append-only history:
/// once true it stays true, so unlocks never need revoking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    /// At least this many entries in the log
    EntriesLogged(u64),
    /// Longest day streak ever reached
    StreakDays(u32),
    /// Any single skill at or above this level
    AnySkillLevel(u8),
    /// Sum of all skill levels
    TotalLevel(u32),
    /// Number of distinct exercises with at least one entry
    DistinctExercises(usize),
    /// Reps of the named exercise summed over one local day
    RepsInOneDay { exercise: &'static str, reps: u64 },
    /// Some entry logged before this local hour
    LoggedBeforeHour(u32),
    /// Some entry logged at or after this local hour
    LoggedFromHour(u32),
    /// Some entry logged on a Saturday or Sunday
    LoggedOnWeekend,
    /// Completed wellness actions in a category
    WellnessCount { category: ReminderCategory, count: u64 },
    /// Days the hydration goal was reached
    HydrationGoalDays(u32),
}

/// Everything a condition may look at.
#[derive(Debug, Clone)]
pub struct EvaluationContext<'a> {
    pub stats: &'a AggregateStats,
    pub skills: Vec<&'a ExerciseSkill>,
    pub entries: &'a [ActivityEntry],
    pub wellness: &'a WellnessStats,
}

impl Condition {
    pub fn is_met(&self, ctx: &EvaluationContext<'_>) -> bool {
        match *self {
            Condition::EntriesLogged(n) => ctx.entries.len() as u64 >= n,
            Condition::StreakDays(days) => {
                ctx.stats.longest_streak.max(ctx.stats.current_streak) >= days
            }
            Condition::AnySkillLevel(level) => {
                ctx.skills.iter().any(|s| s.current_level() >= level)
            }
            Condition::TotalLevel(total) => ctx.stats.total_level >= total,
            Condition::DistinctExercises(n) => {
                let distinct: BTreeSet<_> = ctx.entries.iter().map(|e| e.exercise_id).collect();
                distinct.len() >= n
            }
            Condition::RepsInOneDay { exercise, reps } => reps_in_one_day(ctx, exercise, reps),
            Condition::LoggedBeforeHour(hour) => ctx.entries.iter().any(|e| e.hour() < hour),
            Condition::LoggedFromHour(hour) => ctx.entries.iter().any(|e| e.hour() >= hour),
            Condition::LoggedOnWeekend => ctx
                .entries
                .iter()
                .any(|e| matches!(e.logged_at.weekday(), Weekday::Sat | Weekday::Sun)),
            Condition::WellnessCount { category, count } => ctx.wellness.total(category) >= count,
            Condition::HydrationGoalDays(days) => ctx.wellness.hydration_goal_days >= days,
        }
    }
}

fn reps_in_one_day(ctx: &EvaluationContext<'_>, exercise: &str, target: u64) -> bool {
    let ids: BTreeSet<_> = ctx
        .skills
        .iter()
        .filter(|s| s.name().eq_ignore_ascii_case(exercise))
        .map(|s| s.id())
        .collect();
    if ids.is_empty() {
        return false;
    }

    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for entry in ctx.entries.iter().filter(|e| ids.contains(&e.exercise_id)) {
        let total = per_day.entry(entry.day()).or_default();
        *total += u64::from(entry.reps);
        if *total >= target {
            return true;
        }
    }
    false
}

/// Unlock state for every catalog key.
#[derive(Debug, Clone, Default)]
pub struct AchievementBook {
    states: BTreeMap<String, AchievementState>,
}

impl AchievementBook {
    /// Seed a locked row for each definition, then overlay persisted state.
    pub fn seeded(
        definitions: &[AchievementDefinition],
        persisted: impl IntoIterator<Item = AchievementState>,
    ) -> Self {
        let mut states: BTreeMap<String, AchievementState> = definitions
            .iter()
            .map(|d| (d.key.to_string(), AchievementState::locked(d.key)))
            .collect();
        for state in persisted {
            states.insert(state.key.clone(), state);
        }
        Self { states }
    }

    pub fn state(&self, key: &str) -> Option<&AchievementState> {
        self.states.get(key)
    }

    pub fn states(&self) -> impl Iterator<Item = &AchievementState> {
        self.states.values()
    }

    pub fn is_unlocked(&self, key: &str) -> bool {
        self.states.get(key).is_some_and(AchievementState::is_unlocked)
    }

    pub fn unlocked_count(&self) -> usize {
        self.states.values().filter(|s| s.is_unlocked()).count()
    }
}

/// Stateless rule engine over a definition list.
#[derive(Debug, Clone)]
pub struct AchievementEvaluator {
    definitions: Vec<AchievementDefinition>,
}

impl Default for AchievementEvaluator {
    fn default() -> Self {
        Self::new(catalog().to_vec())
    }
}

impl AchievementEvaluator {
    pub fn new(definitions: Vec<AchievementDefinition>) -> Self {
        Self { definitions }
    }

    pub fn definitions(&self) -> &[AchievementDefinition] {
        &self.definitions
    }

    /// Check every still-locked definition and unlock the ones now satisfied.
    ///
    /// Already-unlocked keys are skipped, so a condition reading false later
    /// can never clear an unlock.
    pub fn evaluate(
        &self,
        book: &mut AchievementBook,
        ctx: &EvaluationContext<'_>,
        now: DateTime<Local>,
    ) -> Vec<UnlockedAchievement> {
        let mut unlocked = Vec::new();
        for definition in &self.definitions {
            let state = book
                .states
                .entry(definition.key.to_string())
                .or_insert_with(|| AchievementState::locked(definition.key));
            if state.is_unlocked() || !definition.condition.is_met(ctx) {
                continue;
            }
            if state.unlock(now) {
                info!(key = definition.key, "achievement unlocked");
                unlocked.push(UnlockedAchievement {
                    key: definition.key.to_string(),
                    name: definition.name.to_string(),
                    description: definition.description.to_string(),
                    unlocked_at: now,
                });
            }
        }
        unlocked
    }

    /// Catalog order, joined with unlock state.
    pub fn views(&self, book: &AchievementBook) -> Vec<AchievementView> {
        self.definitions
            .iter()
            .map(|d| AchievementView::new(d, book.state(d.key)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::achievements::AchievementCategory;
    use chrono::{Duration, TimeZone};

    fn at(day: u32, hour: u32) -> DateTime<Local> {
        // 2024-06-03 is a Monday
        Local.with_ymd_and_hms(2024, 6, day, hour, 0, 0).unwrap()
    }

    fn entry(id: i64, exercise_id: i64, reps: u32, logged_at: DateTime<Local>) -> ActivityEntry {
        ActivityEntry {
            id,
            exercise_id,
            reps,
            xp_earned: u64::from(reps) * 10,
            logged_at,
        }
    }

    fn ctx<'a>(
        stats: &'a AggregateStats,
        skills: &'a [ExerciseSkill],
        entries: &'a [ActivityEntry],
        wellness: &'a WellnessStats,
    ) -> EvaluationContext<'a> {
        EvaluationContext {
            stats,
            skills: skills.iter().collect(),
            entries,
            wellness,
        }
    }

    #[test]
    fn first_exercise_unlocks_once() {
        let evaluator = AchievementEvaluator::default();
        let mut book = AchievementBook::seeded(evaluator.definitions(), []);
        let skills = [ExerciseSkill::with_total_xp(1, "Pushups", 10, 100)];
        let entries = [entry(1, 1, 10, at(3, 12))];
        let stats = AggregateStats {
            total_xp: 100,
            total_level: 2,
            current_streak: 1,
            longest_streak: 1,
            ..AggregateStats::default()
        };
        let wellness = WellnessStats::default();

        let unlocked = evaluator.evaluate(&mut book, &ctx(&stats, &skills, &entries, &wellness), at(3, 12));
        let keys: Vec<&str> = unlocked.iter().map(|u| u.key.as_str()).collect();
        assert_eq!(keys, vec!["first_exercise"]);

        let again = evaluator.evaluate(&mut book, &ctx(&stats, &skills, &entries, &wellness), at(3, 13));
        assert!(again.is_empty());
        assert_eq!(book.state("first_exercise").unwrap().unlocked_at, Some(at(3, 12)));
    }

    #[test]
    fn unlock_survives_condition_reading_false() {
        let evaluator = AchievementEvaluator::new(vec![AchievementDefinition {
            key: "busy",
            name: "Busy",
            description: "Log two sets",
            category: AchievementCategory::Milestone,
            condition: Condition::EntriesLogged(2),
        }]);
        let mut book = AchievementBook::seeded(evaluator.definitions(), []);
        let stats = AggregateStats::default();
        let wellness = WellnessStats::default();
        let entries = [entry(1, 1, 5, at(3, 12)), entry(2, 1, 5, at(3, 13))];

        let unlocked = evaluator.evaluate(&mut book, &ctx(&stats, &[], &entries, &wellness), at(3, 13));
        assert_eq!(unlocked.len(), 1);

        // An empty history would read false; the unlock must stay.
        let unlocked = evaluator.evaluate(&mut book, &ctx(&stats, &[], &[], &wellness), at(4, 9));
        assert!(unlocked.is_empty());
        assert!(book.is_unlocked("busy"));
        assert_eq!(book.state("busy").unwrap().unlocked_at, Some(at(3, 13)));
    }

    #[test]
    fn hundred_pushups_needs_one_day() {
        let skills = [
            ExerciseSkill::new(1, "Pushups", 10),
            ExerciseSkill::new(2, "Squats", 8),
        ];
        let stats = AggregateStats::default();
        let wellness = WellnessStats::default();
        let condition = Condition::RepsInOneDay {
            exercise: "pushups",
            reps: 100,
        };

        let split = [entry(1, 1, 60, at(3, 9)), entry(2, 1, 60, at(3, 9) + Duration::days(1))];
        assert!(!condition.is_met(&ctx(&stats, &skills, &split, &wellness)));

        let same_day = [entry(1, 1, 60, at(3, 9)), entry(2, 1, 40, at(3, 18)), entry(3, 2, 500, at(3, 19))];
        assert!(condition.is_met(&ctx(&stats, &skills, &same_day, &wellness)));
    }

    #[test]
    fn time_of_day_and_weekend_conditions() {
        let stats = AggregateStats::default();
        let wellness = WellnessStats::default();
        let morning_monday = [entry(1, 1, 5, at(3, 7))];
        let ctx_a = ctx(&stats, &[], &morning_monday, &wellness);
        assert!(Condition::LoggedBeforeHour(9).is_met(&ctx_a));
        assert!(!Condition::LoggedFromHour(21).is_met(&ctx_a));
        assert!(!Condition::LoggedOnWeekend.is_met(&ctx_a));

        let late_saturday = [entry(1, 1, 5, at(8, 22))];
        let ctx_b = ctx(&stats, &[], &late_saturday, &wellness);
        assert!(Condition::LoggedFromHour(21).is_met(&ctx_b));
        assert!(Condition::LoggedOnWeekend.is_met(&ctx_b));
    }

    #[test]
    fn variety_streak_and_level_conditions() {
        let skills: Vec<ExerciseSkill> = (1..=5)
            .map(|id| ExerciseSkill::with_total_xp(id, format!("Ex {id}"), 5, 1_154))
            .collect();
        let entries: Vec<ActivityEntry> = (1..=5).map(|id| entry(id, id, 5, at(3, 12))).collect();
        let stats = AggregateStats {
            total_level: 50,
            current_streak: 2,
            longest_streak: 7,
            ..AggregateStats::default()
        };
        let wellness = WellnessStats::default();
        let context = ctx(&stats, &skills, &entries, &wellness);

        assert!(Condition::DistinctExercises(5).is_met(&context));
        assert!(Condition::StreakDays(7).is_met(&context));
        assert!(!Condition::StreakDays(30).is_met(&context));
        assert!(Condition::AnySkillLevel(10).is_met(&context));
        assert!(!Condition::AnySkillLevel(25).is_met(&context));
        assert!(!Condition::TotalLevel(100).is_met(&context));
    }

    #[test]
    fn views_follow_catalog_order() {
        let evaluator = AchievementEvaluator::default();
        let book = AchievementBook::seeded(
            evaluator.definitions(),
            [AchievementState {
                key: "variety".into(),
                unlocked_at: Some(at(3, 12)),
            }],
        );
        let views = evaluator.views(&book);
        assert_eq!(views.len(), catalog().len());
        assert_eq!(views[0].key, "first_exercise");
        let variety = views.iter().find(|v| v.key == "variety").unwrap();
        assert_eq!(variety.unlocked_at, Some(at(3, 12)));
        assert_eq!(book.unlocked_count(), 1);
    }
}
