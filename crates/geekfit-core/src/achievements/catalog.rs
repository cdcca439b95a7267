//! Built-in achievement definitions.

use super::{AchievementCategory, AchievementDefinition, Condition};
use crate::wellness::ReminderCategory;

const CATALOG: &[AchievementDefinition] = &[
    // Milestones
    AchievementDefinition {
        key: "first_exercise",
        name: "First Steps",
        description: "Complete your first exercise",
        category: AchievementCategory::Milestone,
        condition: Condition::EntriesLogged(1),
    },
    AchievementDefinition {
        key: "century_sessions",
        name: "Century Club",
        description: "Log 100 exercise sets",
        category: AchievementCategory::Milestone,
        condition: Condition::EntriesLogged(100),
    },
    AchievementDefinition {
        key: "hundred_pushups",
        name: "Century",
        description: "Complete 100 pushups in a single day",
        category: AchievementCategory::Milestone,
        condition: Condition::RepsInOneDay {
            exercise: "Pushups",
            reps: 100,
        },
    },
    // Streaks
    AchievementDefinition {
        key: "week_streak",
        name: "Dedicated",
        description: "Maintain a 7-day exercise streak",
        category: AchievementCategory::Consistency,
        condition: Condition::StreakDays(7),
    },
    AchievementDefinition {
        key: "month_streak",
        name: "Committed",
        description: "Maintain a 30-day exercise streak",
        category: AchievementCategory::Consistency,
        condition: Condition::StreakDays(30),
    },
    // Skill levels
    AchievementDefinition {
        key: "skill_10",
        name: "Rising Star",
        description: "Get any exercise to level 10",
        category: AchievementCategory::Mastery,
        condition: Condition::AnySkillLevel(10),
    },
    AchievementDefinition {
        key: "skill_25",
        name: "Fitness Warrior",
        description: "Get any exercise to level 25",
        category: AchievementCategory::Mastery,
        condition: Condition::AnySkillLevel(25),
    },
    AchievementDefinition {
        key: "skill_50",
        name: "Legend",
        description: "Get any exercise to level 50",
        category: AchievementCategory::Mastery,
        condition: Condition::AnySkillLevel(50),
    },
    AchievementDefinition {
        key: "skill_99",
        name: "Maxed Out",
        description: "Get any exercise to level 99",
        category: AchievementCategory::Mastery,
        condition: Condition::AnySkillLevel(99),
    },
    AchievementDefinition {
        key: "total_100",
        name: "Total Commitment",
        description: "Reach 100 total level",
        category: AchievementCategory::Mastery,
        condition: Condition::TotalLevel(100),
    },
    // Variety
    AchievementDefinition {
        key: "variety",
        name: "Well-Rounded",
        description: "Log 5 different types of exercises",
        category: AchievementCategory::Variety,
        condition: Condition::DistinctExercises(5),
    },
    // Time of day
    AchievementDefinition {
        key: "early_bird",
        name: "Early Bird",
        description: "Exercise before 9 AM",
        category: AchievementCategory::TimeOfDay,
        condition: Condition::LoggedBeforeHour(9),
    },
    AchievementDefinition {
        key: "night_owl",
        name: "Night Owl",
        description: "Exercise after 9 PM",
        category: AchievementCategory::TimeOfDay,
        condition: Condition::LoggedFromHour(21),
    },
    AchievementDefinition {
        key: "weekend_warrior",
        name: "Weekend Warrior",
        description: "Exercise on a weekend",
        category: AchievementCategory::TimeOfDay,
        condition: Condition::LoggedOnWeekend,
    },
    // Wellness
    AchievementDefinition {
        key: "hydration_first",
        name: "Hydrated",
        description: "Log your first glass of water",
        category: AchievementCategory::Wellness,
        condition: Condition::WellnessCount {
            category: ReminderCategory::Hydration,
            count: 1,
        },
    },
    AchievementDefinition {
        key: "hydration_goal_day",
        name: "Well Watered",
        description: "Reach your daily hydration goal",
        category: AchievementCategory::Wellness,
        condition: Condition::HydrationGoalDays(1),
    },
    AchievementDefinition {
        key: "eye_care_50",
        name: "Eagle Eye",
        description: "Take 50 eye-care breaks",
        category: AchievementCategory::Wellness,
        condition: Condition::WellnessCount {
            category: ReminderCategory::EyeCare,
            count: 50,
        },
    },
    AchievementDefinition {
        key: "posture_50",
        name: "Upright Citizen",
        description: "Complete 50 posture checks",
        category: AchievementCategory::Wellness,
        condition: Condition::WellnessCount {
            category: ReminderCategory::Posture,
            count: 50,
        },
    },
];

/// Every built-in definition.
pub fn catalog() -> &'static [AchievementDefinition] {
    CATALOG
}

/// Look up a definition by key.
pub fn definition(key: &str) -> Option<&'static AchievementDefinition> {
    CATALOG.iter().find(|d| d.key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn keys_are_unique() {
        let keys: HashSet<&str> = catalog().iter().map(|d| d.key).collect();
        assert_eq!(keys.len(), catalog().len());
    }

    #[test]
    fn original_keys_are_present() {
        for key in [
            "first_exercise",
            "hundred_pushups",
            "week_streak",
            "month_streak",
            "skill_10",
            "skill_25",
            "skill_50",
            "total_100",
            "variety",
        ] {
            assert!(definition(key).is_some(), "missing {key}");
        }
    }
}
