//! Personal-record detection.
//!
//! Checked once per new entry against the log as it stood before the entry.
//! A record needs a non-zero prior best to beat: the first entries for an
//! exercise only establish the baseline.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::model::{ActivityEntry, ExerciseId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    /// Most reps in one entry
    SingleSession,
    /// Most reps summed over one local day
    DailyTotal,
}

/// A newly beaten best. Not stored; surfaced once with the entry that set it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonalRecord {
    pub exercise_id: ExerciseId,
    pub kind: RecordKind,
    pub value: u64,
    pub previous_best: u64,
    pub date: NaiveDate,
}

/// Check `entry` against `prior`, which must not contain `entry` itself.
///
/// At most one record is returned; single-session wins when both qualify.
pub fn detect(entry: &ActivityEntry, prior: &[ActivityEntry]) -> Option<PersonalRecord> {
    single_session(entry, prior).or_else(|| daily_total(entry, prior))
}

fn single_session(entry: &ActivityEntry, prior: &[ActivityEntry]) -> Option<PersonalRecord> {
    let best = prior
        .iter()
        .filter(|e| e.exercise_id == entry.exercise_id)
        .map(|e| u64::from(e.reps))
        .max()
        .filter(|&best| best > 0)?;

    let value = u64::from(entry.reps);
    (value > best).then_some(PersonalRecord {
        exercise_id: entry.exercise_id,
        kind: RecordKind::SingleSession,
        value,
        previous_best: best,
        date: entry.day(),
    })
}

/// Fires on the entry that pushes today's total past the best earlier day.
/// Later entries on the same day add to a total that already holds the
/// record, so they stay quiet.
fn daily_total(entry: &ActivityEntry, prior: &[ActivityEntry]) -> Option<PersonalRecord> {
    let today = entry.day();
    let mut per_day: BTreeMap<NaiveDate, u64> = BTreeMap::new();
    for e in prior.iter().filter(|e| e.exercise_id == entry.exercise_id) {
        *per_day.entry(e.day()).or_default() += u64::from(e.reps);
    }

    let earlier_today = per_day.remove(&today).unwrap_or(0);
    let best = per_day
        .range(..today)
        .map(|(_, &total)| total)
        .max()
        .filter(|&best| best > 0)?;

    let value = earlier_today + u64::from(entry.reps);
    (earlier_today <= best && value > best).then_some(PersonalRecord {
        exercise_id: entry.exercise_id,
        kind: RecordKind::DailyTotal,
        value,
        previous_best: best,
        date: today,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, Local, TimeZone};

    fn at(day: i64, hour: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 4, 1, hour, 0, 0).unwrap() + Duration::days(day)
    }

    fn entry(id: i64, exercise_id: ExerciseId, reps: u32, logged_at: DateTime<Local>) -> ActivityEntry {
        ActivityEntry {
            id,
            exercise_id,
            reps,
            xp_earned: u64::from(reps) * 10,
            logged_at,
        }
    }

    #[test]
    fn first_entry_seeds_baseline_silently() {
        let first = entry(1, 1, 50, at(0, 9));
        assert_eq!(detect(&first, &[]), None);
    }

    #[test]
    fn single_session_record_then_nothing() {
        let mut log = vec![
            entry(1, 1, 10, at(0, 9)),
            entry(2, 1, 15, at(1, 9)),
            entry(3, 1, 12, at(2, 9)),
        ];

        let fourth = entry(4, 1, 20, at(3, 9));
        let record = detect(&fourth, &log).unwrap();
        assert_eq!(record.kind, RecordKind::SingleSession);
        assert_eq!(record.value, 20);
        assert_eq!(record.previous_best, 15);
        log.push(fourth);

        let fifth = entry(5, 1, 5, at(3, 15));
        assert_eq!(detect(&fifth, &log), None);

        let fifth_next_day = entry(5, 1, 5, at(4, 9));
        assert_eq!(detect(&fifth_next_day, &log), None);
    }

    #[test]
    fn daily_total_record_fires_once_per_day() {
        let mut log = vec![entry(1, 1, 30, at(0, 9))];

        let morning = entry(2, 1, 20, at(1, 9));
        assert_eq!(detect(&morning, &log), None);
        log.push(morning);

        let afternoon = entry(3, 1, 15, at(1, 14));
        let record = detect(&afternoon, &log).unwrap();
        assert_eq!(record.kind, RecordKind::DailyTotal);
        assert_eq!(record.value, 35);
        assert_eq!(record.previous_best, 30);
        log.push(afternoon);

        let evening = entry(4, 1, 10, at(1, 20));
        assert_eq!(detect(&evening, &log), None);
    }

    #[test]
    fn equal_values_are_not_records() {
        let log = vec![entry(1, 1, 15, at(0, 9))];
        assert_eq!(detect(&entry(2, 1, 15, at(1, 9)), &log), None);
    }

    #[test]
    fn other_exercises_are_ignored() {
        let log = vec![entry(1, 2, 100, at(0, 9)), entry(2, 1, 10, at(0, 10))];
        let record = detect(&entry(3, 1, 11, at(1, 9)), &log).unwrap();
        assert_eq!(record.previous_best, 10);
        assert_eq!(record.exercise_id, 1);
    }

    #[test]
    fn single_session_takes_priority_over_daily_total() {
        let log = vec![entry(1, 1, 10, at(0, 9))];
        let record = detect(&entry(2, 1, 25, at(1, 9)), &log).unwrap();
        assert_eq!(record.kind, RecordKind::SingleSession);
    }
}
