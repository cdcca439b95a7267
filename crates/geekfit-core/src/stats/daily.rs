use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{ActivityEntry, ExerciseId, ExerciseSkill};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExerciseDayTotal {
    pub exercise_id: ExerciseId,
    pub name: String,
    pub reps: u64,
    pub xp: u64,
}

/// XP and reps logged on one local day, measured against the daily XP goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_xp: u64,
    pub daily_goal_xp: u64,
    /// Sorted by XP earned, highest first.
    pub exercises: Vec<ExerciseDayTotal>,
}

impl DailySummary {
    pub fn build<'a>(
        date: NaiveDate,
        daily_goal_xp: u64,
        entries: impl IntoIterator<Item = &'a ActivityEntry>,
        skills: impl Fn(ExerciseId) -> Option<&'a ExerciseSkill>,
    ) -> Self {
        let mut totals: BTreeMap<ExerciseId, (u64, u64)> = BTreeMap::new();
        for entry in entries.into_iter().filter(|e| e.day() == date) {
            let slot = totals.entry(entry.exercise_id).or_default();
            slot.0 += u64::from(entry.reps);
            slot.1 += entry.xp_earned;
        }

        let mut exercises: Vec<ExerciseDayTotal> = totals
            .into_iter()
            .map(|(exercise_id, (reps, xp))| ExerciseDayTotal {
                exercise_id,
                name: skills(exercise_id)
                    .map(|s| s.name().to_string())
                    .unwrap_or_else(|| format!("#{exercise_id}")),
                reps,
                xp,
            })
            .collect();
        exercises.sort_by(|a, b| b.xp.cmp(&a.xp).then(a.exercise_id.cmp(&b.exercise_id)));

        Self {
            date,
            total_xp: exercises.iter().map(|e| e.xp).sum(),
            daily_goal_xp,
            exercises,
        }
    }

    pub fn goal_met(&self) -> bool {
        self.total_xp >= self.daily_goal_xp
    }

    pub fn xp_to_goal(&self) -> u64 {
        self.daily_goal_xp.saturating_sub(self.total_xp)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    #[test]
    fn groups_todays_entries_by_exercise() {
        let skills = [
            ExerciseSkill::new(1, "Pushups", 10),
            ExerciseSkill::new(2, "Squats", 8),
        ];
        let noon = Local.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap();
        let log = vec![
            ActivityEntry { id: 1, exercise_id: 1, reps: 10, xp_earned: 100, logged_at: noon },
            ActivityEntry { id: 2, exercise_id: 2, reps: 20, xp_earned: 160, logged_at: noon },
            ActivityEntry { id: 3, exercise_id: 1, reps: 5, xp_earned: 50, logged_at: noon },
            ActivityEntry {
                id: 4,
                exercise_id: 1,
                reps: 50,
                xp_earned: 500,
                logged_at: noon - Duration::days(1),
            },
        ];

        let summary = DailySummary::build(noon.date_naive(), 500, &log, |id| {
            skills.iter().find(|s| s.id() == id)
        });

        assert_eq!(summary.total_xp, 310);
        assert!(!summary.goal_met());
        assert_eq!(summary.xp_to_goal(), 190);
        assert_eq!(summary.exercises.len(), 2);
        assert_eq!(summary.exercises[0].name, "Squats");
        assert_eq!(summary.exercises[1].reps, 15);
    }
}
