use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;

use super::streak;
use crate::error::ValidationError;
use crate::model::{ActivityEntry, AggregateStats, ExerciseId, ExerciseSkill, SkillUpdate};

/// In-memory mirror of the skill table plus the set of active days.
///
/// Cloning is cheap enough (one entry per exercise and per active day) that
/// the engine mutates a clone and swaps it in only after the store commits.
#[derive(Debug, Clone, Default)]
pub struct StatAggregator {
    skills: BTreeMap<ExerciseId, ExerciseSkill>,
    active_days: BTreeSet<NaiveDate>,
    longest_streak: u32,
}

impl StatAggregator {
    /// Build from the skill catalog and the full activity log.
    pub fn new<'a>(
        skills: impl IntoIterator<Item = ExerciseSkill>,
        entries: impl IntoIterator<Item = &'a ActivityEntry>,
    ) -> Self {
        let skills = skills.into_iter().map(|s| (s.id(), s)).collect();
        let active_days: BTreeSet<NaiveDate> = entries.into_iter().map(ActivityEntry::day).collect();
        let longest_streak = streak::longest_streak(&active_days);
        Self {
            skills,
            active_days,
            longest_streak,
        }
    }

    /// Rebuild from fresh data without letting the longest streak shrink.
    pub fn rebuilt<'a>(
        &self,
        skills: impl IntoIterator<Item = ExerciseSkill>,
        entries: impl IntoIterator<Item = &'a ActivityEntry>,
    ) -> Self {
        let mut next = Self::new(skills, entries);
        next.longest_streak = next.longest_streak.max(self.longest_streak);
        next
    }

    pub fn skill(&self, id: ExerciseId) -> Option<&ExerciseSkill> {
        self.skills.get(&id)
    }

    pub fn skills(&self) -> impl Iterator<Item = &ExerciseSkill> {
        self.skills.values()
    }

    pub fn insert_skill(&mut self, skill: ExerciseSkill) {
        self.skills.insert(skill.id(), skill);
    }

    pub fn active_days(&self) -> &BTreeSet<NaiveDate> {
        &self.active_days
    }

    /// Fold one new entry into its skill and the day set.
    pub fn apply_entry(&mut self, entry: &ActivityEntry) -> Result<SkillUpdate, ValidationError> {
        let skill = self
            .skills
            .get_mut(&entry.exercise_id)
            .ok_or(ValidationError::UnknownExercise(entry.exercise_id))?;
        let update = skill.add_xp(entry.xp_earned);
        self.active_days.insert(entry.day());
        self.longest_streak = self
            .longest_streak
            .max(streak::longest_streak(&self.active_days));
        Ok(update)
    }

    pub fn total_xp(&self) -> u64 {
        self.skills.values().map(ExerciseSkill::total_xp).sum()
    }

    pub fn total_level(&self) -> u32 {
        self.skills
            .values()
            .map(|s| u32::from(s.current_level()))
            .sum()
    }

    /// Derived stats as seen on `today`.
    pub fn snapshot(&self, today: NaiveDate) -> AggregateStats {
        let summary = streak::summarize(&self.active_days, today);
        AggregateStats {
            total_xp: self.total_xp(),
            total_level: self.total_level(),
            current_streak: summary.current,
            longest_streak: self.longest_streak.max(summary.longest),
            last_activity_date: self.active_days.iter().next_back().copied(),
            exercise_count: self.skills.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    fn entry(id: i64, exercise_id: ExerciseId, reps: u32, xp: u64, day_offset: i64) -> ActivityEntry {
        let base = Local.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap();
        ActivityEntry {
            id,
            exercise_id,
            reps,
            xp_earned: xp,
            logged_at: base + Duration::days(day_offset),
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
    }

    #[test]
    fn apply_entry_updates_skill_and_totals() {
        let mut agg = StatAggregator::new(
            vec![
                ExerciseSkill::new(1, "Pushups", 10),
                ExerciseSkill::new(2, "Squats", 8),
            ],
            &[],
        );

        let update = agg.apply_entry(&entry(1, 1, 10, 100, 0)).unwrap();
        assert!(update.leveled_up());
        assert_eq!(update.new_level, 2);

        let stats = agg.snapshot(today());
        assert_eq!(stats.total_xp, 100);
        assert_eq!(stats.total_level, 3);
        assert_eq!(stats.exercise_count, 2);
        assert_eq!(stats.current_streak, 1);
        assert_eq!(stats.last_activity_date, Some(today()));
    }

    #[test]
    fn unknown_exercise_is_rejected_without_change() {
        let mut agg = StatAggregator::new(vec![ExerciseSkill::new(1, "Pushups", 10)], &[]);
        let err = agg.apply_entry(&entry(1, 9, 10, 100, 0)).unwrap_err();
        assert_eq!(err, ValidationError::UnknownExercise(9));
        assert_eq!(agg.total_xp(), 0);
        assert!(agg.active_days().is_empty());
    }

    #[test]
    fn same_day_entries_count_once() {
        let log = vec![entry(1, 1, 5, 50, -1), entry(2, 1, 5, 50, 0), entry(3, 1, 5, 50, 0)];
        let agg = StatAggregator::new(
            vec![ExerciseSkill::with_total_xp(1, "Pushups", 10, 150)],
            &log,
        );
        let stats = agg.snapshot(today());
        assert_eq!(stats.current_streak, 2);
        assert_eq!(stats.longest_streak, 2);
    }

    #[test]
    fn longest_streak_survives_rebuild() {
        let log = vec![entry(1, 1, 5, 50, -3), entry(2, 1, 5, 50, -2), entry(3, 1, 5, 50, -1)];
        let agg = StatAggregator::new(vec![ExerciseSkill::new(1, "Pushups", 10)], &log);
        assert_eq!(agg.snapshot(today()).longest_streak, 3);

        let rebuilt = agg.rebuilt(vec![ExerciseSkill::new(2, "Squats", 8)], &[]);
        let stats = rebuilt.snapshot(today());
        assert_eq!(stats.longest_streak, 3);
        assert_eq!(stats.current_streak, 0);
    }
}
