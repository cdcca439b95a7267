//! Fire-time predicates that can veto a due reminder.

use chrono::{DateTime, Datelike, Local, Timelike, Weekday};
use thiserror::Error;
use tokio::sync::watch;

use super::{ReminderCategory, WellnessStats};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GuardError {
    /// The data the guard reads is not available
    #[error("guard '{guard}' has no data: {message}")]
    Unavailable { guard: String, message: String },

    /// The guard's own settings make no sense
    #[error("guard '{guard}' is misconfigured: {message}")]
    Misconfigured { guard: String, message: String },
}

/// A pluggable check evaluated when a category comes due.
///
/// Must be fast and side-effect free; it runs inside the scheduler tick.
/// `Ok(false)` holds the reminder back for this tick, `Err` skips the
/// category for this tick and is logged.
pub trait ReminderGuard: Send + Sync {
    fn name(&self) -> &str;

    fn allows(&self, category: ReminderCategory, now: DateTime<Local>) -> Result<bool, GuardError>;
}

/// Stops hydration reminders once today's glasses reach the goal.
///
/// Both the count and the goal come from the latest published snapshot, so
/// a goal change reaches a running scheduler without rebuilding it.
pub struct HydrationGoalGuard {
    stats: watch::Receiver<WellnessStats>,
}

impl HydrationGoalGuard {
    pub fn new(stats: watch::Receiver<WellnessStats>) -> Self {
        Self { stats }
    }
}

impl ReminderGuard for HydrationGoalGuard {
    fn name(&self) -> &str {
        "hydration_goal"
    }

    fn allows(&self, category: ReminderCategory, now: DateTime<Local>) -> Result<bool, GuardError> {
        if category != ReminderCategory::Hydration {
            return Ok(true);
        }
        if self.stats.has_changed().is_err() {
            return Err(GuardError::Unavailable {
                guard: self.name().to_string(),
                message: "wellness stats publisher dropped".into(),
            });
        }
        let stats = self.stats.borrow();
        // A snapshot from an earlier day says nothing about today.
        if stats.hydration_daily_goal == 0 || stats.date != Some(now.date_naive()) {
            return Ok(true);
        }
        Ok(stats.today(ReminderCategory::Hydration) < u64::from(stats.hydration_daily_goal))
    }
}

/// Only lets reminders through inside working hours on working days.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkHoursGuard {
    start_hour: u32,
    end_hour: u32,
    days: Vec<Weekday>,
}

impl WorkHoursGuard {
    pub fn new(start_hour: u32, end_hour: u32, days: Vec<Weekday>) -> Self {
        Self {
            start_hour,
            end_hour,
            days,
        }
    }
}

impl ReminderGuard for WorkHoursGuard {
    fn name(&self) -> &str {
        "work_hours"
    }

    fn allows(&self, _category: ReminderCategory, now: DateTime<Local>) -> Result<bool, GuardError> {
        if self.start_hour >= self.end_hour || self.end_hour > 24 {
            return Err(GuardError::Misconfigured {
                guard: self.name().to_string(),
                message: format!("bad hour range {}..{}", self.start_hour, self.end_hour),
            });
        }
        let hour = now.hour();
        Ok(self.days.contains(&now.weekday()) && (self.start_hour..self.end_hour).contains(&hour))
    }
}
