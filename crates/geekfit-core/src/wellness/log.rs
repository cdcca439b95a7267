//! Append-only log of completed wellness actions and the stats derived from it.

use std::collections::BTreeMap;

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::ReminderCategory;

/// A reminder the user actually acted on (drank water, rested eyes, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessEvent {
    pub id: i64,
    pub category: ReminderCategory,
    pub logged_at: DateTime<Local>,
}

/// Counters derived from the wellness log.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WellnessStats {
    pub date: Option<NaiveDate>,
    pub totals: BTreeMap<ReminderCategory, u64>,
    pub today: BTreeMap<ReminderCategory, u64>,
    /// Days on which hydration count reached the daily goal.
    pub hydration_goal_days: u32,
    /// Goal in force when the snapshot was taken; 0 means no goal.
    #[serde(default)]
    pub hydration_daily_goal: u32,
}

impl WellnessStats {
    pub fn from_events<'a>(
        events: impl IntoIterator<Item = &'a WellnessEvent>,
        hydration_daily_goal: u32,
        today: NaiveDate,
    ) -> Self {
        let mut totals: BTreeMap<ReminderCategory, u64> = BTreeMap::new();
        let mut today_counts: BTreeMap<ReminderCategory, u64> = BTreeMap::new();
        let mut hydration_per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();

        for event in events {
            let day = event.logged_at.date_naive();
            *totals.entry(event.category).or_default() += 1;
            if day == today {
                *today_counts.entry(event.category).or_default() += 1;
            }
            if event.category == ReminderCategory::Hydration {
                *hydration_per_day.entry(day).or_default() += 1;
            }
        }

        let goal_days = hydration_per_day
            .values()
            .filter(|&&count| hydration_daily_goal > 0 && count >= u64::from(hydration_daily_goal))
            .count();

        Self {
            date: Some(today),
            totals,
            today: today_counts,
            hydration_goal_days: goal_days as u32,
            hydration_daily_goal,
        }
    }

    pub fn total(&self, category: ReminderCategory) -> u64 {
        self.totals.get(&category).copied().unwrap_or(0)
    }

    pub fn today(&self, category: ReminderCategory) -> u64 {
        self.today.get(&category).copied().unwrap_or(0)
    }
}
