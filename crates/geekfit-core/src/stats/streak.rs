//! Day streaks over local calendar dates.
//!
//! A streak is a run of consecutive days that each hold at least one entry.
//! The current streak must end today or yesterday: an empty "today" does not
//! break a streak that reached yesterday, but two empty days in a row do.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

/// Length of the run ending today (or yesterday when today is empty).
pub fn current_streak(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> u32 {
    let yesterday = today - Duration::days(1);
    let anchor = if days.contains(&today) {
        today
    } else if days.contains(&yesterday) {
        yesterday
    } else {
        return 0;
    };

    let mut count = 0;
    let mut cursor = anchor;
    while days.contains(&cursor) {
        count += 1;
        cursor -= Duration::days(1);
    }
    count
}

/// Longest run of consecutive days anywhere in the set.
pub fn longest_streak(days: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;
    for &day in days {
        run = match previous {
            Some(prev) if day - prev == Duration::days(1) => run + 1,
            _ => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

pub fn summarize(days: &BTreeSet<NaiveDate>, today: NaiveDate) -> StreakSummary {
    StreakSummary {
        current: current_streak(days, today),
        longest: longest_streak(days),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(offset: i64) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 20).unwrap() + Duration::days(offset)
    }

    fn days(offsets: &[i64]) -> BTreeSet<NaiveDate> {
        offsets.iter().map(|&o| day(o)).collect()
    }

    #[test]
    fn gap_yesterday_breaks_run() {
        let set = days(&[-3, -2, 0]);
        assert_eq!(current_streak(&set, day(0)), 1);
        assert_eq!(longest_streak(&set), 2);
    }

    #[test]
    fn consecutive_days_through_today() {
        let set = days(&[-2, -1, 0]);
        assert_eq!(current_streak(&set, day(0)), 3);
    }

    #[test]
    fn empty_today_keeps_yesterdays_run() {
        let set = days(&[-2, -1]);
        assert_eq!(current_streak(&set, day(0)), 2);
    }

    #[test]
    fn two_empty_days_reset() {
        let set = days(&[-3, -2]);
        assert_eq!(current_streak(&set, day(0)), 0);
        assert_eq!(longest_streak(&set), 2);
    }

    #[test]
    fn empty_history() {
        let summary = summarize(&BTreeSet::new(), day(0));
        assert_eq!(summary, StreakSummary::default());
    }

    #[test]
    fn longest_picks_the_best_run() {
        let set = days(&[-20, -19, -18, -17, -10, -9, -1, 0]);
        assert_eq!(longest_streak(&set), 4);
        assert_eq!(current_streak(&set, day(0)), 2);
    }
}
