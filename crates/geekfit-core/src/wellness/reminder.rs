//! Per-category interval timers.
//!
//! The scheduler owns no clock and no task: callers pass `now` and the focus
//! flag into [`ReminderScheduler::tick`], which makes it fully deterministic.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::guards::ReminderGuard;
use super::{ReminderCategory, ResetTarget};
use crate::storage::{CategorySettings, Settings};

/// Timer state for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderCategoryConfig {
    pub enabled: bool,
    pub interval_minutes: u32,
    pub suppress_during_focus: bool,
    pub last_fired_at: Option<DateTime<Local>>,
}

impl ReminderCategoryConfig {
    /// `last_fired_at + interval`, or `started_at + interval` if never fired.
    pub fn next_eligible(&self, started_at: DateTime<Local>) -> DateTime<Local> {
        self.last_fired_at.unwrap_or(started_at) + Duration::minutes(i64::from(self.interval_minutes))
    }

    fn apply(&mut self, settings: &CategorySettings) {
        self.enabled = settings.enabled;
        self.interval_minutes = settings.interval_minutes;
        self.suppress_during_focus = settings.suppress_during_focus;
    }
}

impl From<&CategorySettings> for ReminderCategoryConfig {
    fn from(settings: &CategorySettings) -> Self {
        Self {
            enabled: settings.enabled,
            interval_minutes: settings.interval_minutes,
            suppress_during_focus: settings.suppress_during_focus,
            last_fired_at: None,
        }
    }
}

/// A reminder that fired on a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderDue {
    pub category: ReminderCategory,
    pub at: DateTime<Local>,
    /// When the category first became eligible.
    pub due_since: DateTime<Local>,
}

/// Read-only view of one category, for status output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReminderStatus {
    pub category: ReminderCategory,
    pub enabled: bool,
    pub interval_minutes: u32,
    pub last_fired_at: Option<DateTime<Local>>,
    pub next_due_at: Option<DateTime<Local>>,
}

pub struct ReminderScheduler {
    started_at: DateTime<Local>,
    enabled: bool,
    categories: BTreeMap<ReminderCategory, ReminderCategoryConfig>,
    guards: Vec<Box<dyn ReminderGuard>>,
}

impl fmt::Debug for ReminderScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReminderScheduler")
            .field("started_at", &self.started_at)
            .field("enabled", &self.enabled)
            .field("categories", &self.categories)
            .field("guards", &self.guards.iter().map(|g| g.name()).collect::<Vec<_>>())
            .finish()
    }
}

impl ReminderScheduler {
    /// Scheduler with default settings for every category.
    pub fn new(started_at: DateTime<Local>) -> Self {
        Self::from_settings(&Settings::default(), started_at)
    }

    pub fn from_settings(settings: &Settings, started_at: DateTime<Local>) -> Self {
        let categories = ReminderCategory::ALL
            .into_iter()
            .map(|c| (c, ReminderCategoryConfig::from(settings.reminder(c))))
            .collect();
        Self {
            started_at,
            enabled: settings.reminders_enabled,
            categories,
            guards: Vec::new(),
        }
    }

    pub fn with_guard(mut self, guard: impl ReminderGuard + 'static) -> Self {
        self.add_guard(Box::new(guard));
        self
    }

    pub fn add_guard(&mut self, guard: Box<dyn ReminderGuard>) {
        self.guards.push(guard);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Global switch. Per-category flags are left as they are.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Replace a category's settings, keeping its timer.
    pub fn configure(&mut self, category: ReminderCategory, settings: &CategorySettings) {
        self.categories
            .entry(category)
            .and_modify(|c| c.apply(settings))
            .or_insert_with(|| ReminderCategoryConfig::from(settings));
    }

    /// Apply a whole settings record, keeping every timer.
    pub fn apply_settings(&mut self, settings: &Settings) {
        self.enabled = settings.reminders_enabled;
        for category in ReminderCategory::ALL {
            self.configure(category, settings.reminder(category));
        }
    }

    pub fn config(&self, category: ReminderCategory) -> Option<&ReminderCategoryConfig> {
        self.categories.get(&category)
    }

    pub fn next_eligible(&self, category: ReminderCategory) -> Option<DateTime<Local>> {
        self.categories
            .get(&category)
            .map(|c| c.next_eligible(self.started_at))
    }

    /// Fire every enabled category whose time has come.
    ///
    /// A category deferred by focus keeps its due time and is re-checked on
    /// the next tick. A guard error skips only that category.
    pub fn tick(&mut self, now: DateTime<Local>, focus_active: bool) -> Vec<ReminderDue> {
        if !self.enabled {
            return Vec::new();
        }

        let mut fired = Vec::new();
        for (&category, config) in self.categories.iter_mut() {
            if !config.enabled || config.interval_minutes == 0 {
                continue;
            }
            let due_since = config.next_eligible(self.started_at);
            if now < due_since {
                continue;
            }
            if focus_active && config.suppress_during_focus {
                debug!(%category, %due_since, "reminder deferred during focus");
                continue;
            }
            match guards_allow(&self.guards, category, now) {
                Ok(true) => {}
                Ok(false) => {
                    debug!(%category, "reminder held back by guard");
                    continue;
                }
                Err(err) => {
                    warn!(%category, error = %err, "reminder guard failed, skipping category");
                    continue;
                }
            }

            config.last_fired_at = Some(now);
            info!(%category, "reminder due");
            fired.push(ReminderDue {
                category,
                at: now,
                due_since,
            });
        }
        fired
    }

    /// Restart the timers named by `target` from `now`, due or not.
    pub fn acknowledge(&mut self, target: ResetTarget, now: DateTime<Local>) {
        for (&category, config) in self.categories.iter_mut() {
            if target.includes(category) {
                config.last_fired_at = Some(now);
            }
        }
    }

    pub fn status(&self) -> Vec<ReminderStatus> {
        self.categories
            .iter()
            .map(|(&category, config)| {
                let active = self.enabled && config.enabled && config.interval_minutes > 0;
                ReminderStatus {
                    category,
                    enabled: config.enabled,
                    interval_minutes: config.interval_minutes,
                    last_fired_at: config.last_fired_at,
                    next_due_at: active.then(|| config.next_eligible(self.started_at)),
                }
            })
            .collect()
    }
}

fn guards_allow(
    guards: &[Box<dyn ReminderGuard>],
    category: ReminderCategory,
    now: DateTime<Local>,
) -> Result<bool, super::GuardError> {
    for guard in guards {
        if !guard.allows(category, now)? {
            return Ok(false);
        }
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::wellness::GuardError;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    fn only(category: ReminderCategory, interval_minutes: u32) -> ReminderScheduler {
        let mut scheduler = ReminderScheduler::new(t0());
        for c in ReminderCategory::ALL {
            scheduler.configure(
                c,
                &CategorySettings {
                    enabled: c == category,
                    interval_minutes,
                    suppress_during_focus: true,
                },
            );
        }
        scheduler
    }

    struct Failing;

    impl ReminderGuard for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn allows(&self, category: ReminderCategory, _now: DateTime<Local>) -> Result<bool, GuardError> {
            if category == ReminderCategory::Posture {
                Err(GuardError::Unavailable {
                    guard: "failing".into(),
                    message: "boom".into(),
                })
            } else {
                Ok(true)
            }
        }
    }

    #[test]
    fn first_fire_counts_from_start() {
        let mut scheduler = only(ReminderCategory::Hydration, 60);
        assert!(scheduler.tick(t0() + Duration::minutes(59), false).is_empty());

        let fired = scheduler.tick(t0() + Duration::minutes(60), false);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].category, ReminderCategory::Hydration);
        assert_eq!(
            scheduler.next_eligible(ReminderCategory::Hydration),
            Some(t0() + Duration::minutes(120))
        );
    }

    #[test]
    fn focus_defers_without_resetting_due_time() {
        let mut scheduler = only(ReminderCategory::Hydration, 60);
        for minute in 1..=120 {
            let fired = scheduler.tick(t0() + Duration::minutes(minute), true);
            assert!(fired.is_empty(), "fired during focus at minute {minute}");
        }
        assert_eq!(
            scheduler.next_eligible(ReminderCategory::Hydration),
            Some(t0() + Duration::minutes(60))
        );

        let fired = scheduler.tick(t0() + Duration::minutes(121), false);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].due_since, t0() + Duration::minutes(60));
    }

    #[test]
    fn unsuppressed_category_fires_during_focus() {
        let mut scheduler = only(ReminderCategory::EyeCare, 20);
        scheduler.configure(
            ReminderCategory::EyeCare,
            &CategorySettings {
                enabled: true,
                interval_minutes: 20,
                suppress_during_focus: false,
            },
        );
        assert_eq!(scheduler.tick(t0() + Duration::minutes(20), true).len(), 1);
    }

    #[test]
    fn acknowledge_restarts_timers() {
        let mut scheduler = ReminderScheduler::new(t0());
        let later = t0() + Duration::minutes(15);
        scheduler.acknowledge(ResetTarget::Category(ReminderCategory::EyeCare), later);
        assert_eq!(
            scheduler.next_eligible(ReminderCategory::EyeCare),
            Some(later + Duration::minutes(20))
        );
        assert_eq!(
            scheduler.next_eligible(ReminderCategory::Posture),
            Some(t0() + Duration::minutes(30))
        );

        scheduler.acknowledge(ResetTarget::All, later);
        assert_eq!(
            scheduler.next_eligible(ReminderCategory::Posture),
            Some(later + Duration::minutes(30))
        );
    }

    #[test]
    fn global_switch_silences_everything() {
        let mut scheduler = ReminderScheduler::new(t0());
        scheduler.set_enabled(false);
        assert!(scheduler.tick(t0() + Duration::hours(5), false).is_empty());
        assert!(scheduler.status().iter().all(|s| s.next_due_at.is_none()));

        scheduler.set_enabled(true);
        assert_eq!(scheduler.tick(t0() + Duration::hours(5), false).len(), 3);
    }

    #[test]
    fn guard_failure_skips_only_that_category() {
        let mut scheduler = ReminderScheduler::new(t0()).with_guard(Failing);
        let fired = scheduler.tick(t0() + Duration::hours(1), false);
        let categories: Vec<_> = fired.iter().map(|d| d.category).collect();
        assert_eq!(
            categories,
            vec![ReminderCategory::Hydration, ReminderCategory::EyeCare]
        );
        assert_eq!(scheduler.config(ReminderCategory::Posture).unwrap().last_fired_at, None);
    }
}
