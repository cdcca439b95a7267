//! Focus detection over an external activity signal.
//!
//! Two thresholds give hysteresis: a run of activity must last
//! `focus_threshold` with no gap of `idle_gap` or more before focus starts,
//! and focus only ends after a silence of `idle_gap`.

use chrono::{DateTime, Duration, Local};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusConfig {
    pub focus_threshold: Duration,
    pub idle_gap: Duration,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            focus_threshold: Duration::minutes(10),
            idle_gap: Duration::minutes(5),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FocusState {
    pub active: bool,
    pub focus_started_at: Option<DateTime<Local>>,
    pub last_activity_at: Option<DateTime<Local>>,
}

/// Emitted when `active` flips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FocusTransition {
    pub active: bool,
    pub at: DateTime<Local>,
}

#[derive(Debug, Clone)]
pub struct FocusDetector {
    config: FocusConfig,
    state: FocusState,
    /// Start of the current unbroken run of activity.
    run_started_at: Option<DateTime<Local>>,
}

impl FocusDetector {
    pub fn new(config: FocusConfig) -> Self {
        Self {
            config,
            state: FocusState::default(),
            run_started_at: None,
        }
    }

    pub fn state(&self) -> FocusState {
        self.state
    }

    pub fn is_active(&self) -> bool {
        self.state.active
    }

    pub fn config(&self) -> FocusConfig {
        self.config
    }

    /// Feed one activity ping.
    pub fn record_activity(&mut self, at: DateTime<Local>) -> Option<FocusTransition> {
        let mut transition = None;

        if let Some(last) = self.state.last_activity_at {
            if at - last >= self.config.idle_gap {
                // The run broke before this ping arrived.
                self.run_started_at = None;
                if self.state.active {
                    transition = self.leave(at);
                }
            }
        }

        let run_start = *self.run_started_at.get_or_insert(at);
        self.state.last_activity_at = Some(at);

        if !self.state.active && at - run_start >= self.config.focus_threshold {
            self.state.active = true;
            self.state.focus_started_at = Some(at);
            debug!(run_started_at = %run_start, "focus started");
            transition = Some(FocusTransition { active: true, at });
        }
        transition
    }

    /// Check for an idle gap without a new ping. Call on every tick.
    pub fn poll(&mut self, now: DateTime<Local>) -> Option<FocusTransition> {
        let last = self.state.last_activity_at?;
        if now - last < self.config.idle_gap {
            return None;
        }
        self.run_started_at = None;
        if self.state.active {
            self.leave(now)
        } else {
            None
        }
    }

    fn leave(&mut self, at: DateTime<Local>) -> Option<FocusTransition> {
        self.state.active = false;
        self.state.focus_started_at = None;
        debug!("focus ended");
        Some(FocusTransition { active: false, at })
    }
}

impl Default for FocusDetector {
    fn default() -> Self {
        Self::new(FocusConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn t0() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 5, 6, 9, 0, 0).unwrap()
    }

    #[test]
    fn starts_idle() {
        let detector = FocusDetector::default();
        assert!(!detector.is_active());
        assert_eq!(detector.state().last_activity_at, None);
    }

    #[test]
    fn ten_minutes_of_pings_enter_focus_and_six_idle_minutes_leave() {
        let mut detector = FocusDetector::default();
        let mut entered_at = None;

        for step in 0..=20 {
            let at = t0() + Duration::seconds(30 * step);
            if let Some(t) = detector.record_activity(at) {
                assert!(t.active);
                entered_at = Some(t.at);
            }
            if step < 20 {
                assert!(!detector.is_active(), "focused too early at step {step}");
            }
        }
        assert_eq!(entered_at, Some(t0() + Duration::minutes(10)));
        assert!(detector.is_active());

        let last = t0() + Duration::minutes(10);
        assert_eq!(detector.poll(last + Duration::minutes(4)), None);
        assert!(detector.is_active());

        let left = detector.poll(last + Duration::minutes(6)).unwrap();
        assert!(!left.active);
        assert!(!detector.is_active());
        assert_eq!(detector.state().focus_started_at, None);
    }

    #[test]
    fn gap_restarts_the_run() {
        let mut detector = FocusDetector::default();
        detector.record_activity(t0());
        detector.record_activity(t0() + Duration::minutes(4));
        // A five-minute gap breaks the run.
        detector.record_activity(t0() + Duration::minutes(9));
        for minute in [12, 15, 18] {
            assert_eq!(detector.record_activity(t0() + Duration::minutes(minute)), None);
        }
        assert!(!detector.is_active());

        let entered = detector.record_activity(t0() + Duration::minutes(19)).unwrap();
        assert!(entered.active);
    }

    #[test]
    fn ping_after_long_gap_leaves_focus() {
        let mut detector = FocusDetector::new(FocusConfig {
            focus_threshold: Duration::minutes(1),
            idle_gap: Duration::minutes(2),
        });
        detector.record_activity(t0());
        assert!(detector.record_activity(t0() + Duration::minutes(1)).is_some());

        let left = detector.record_activity(t0() + Duration::minutes(10)).unwrap();
        assert!(!left.active);
        assert!(!detector.is_active());
    }
}
