//! Wellness reminders.
//!
//! Three independently timed categories (hydration, eye care, posture), a
//! focus detector that defers reminders during sustained activity, and
//! pluggable guards that can veto a reminder at fire time. The pure state
//! machines live in [`focus`] and [`reminder`]; [`WellnessService`] wires them
//! to a tokio interval and the event bus.

mod category;
pub mod focus;
mod guards;
mod log;
pub mod reminder;
mod service;

pub use category::{ReminderCategory, ResetTarget};
pub use focus::{FocusConfig, FocusDetector, FocusState, FocusTransition};
pub use guards::{GuardError, HydrationGoalGuard, ReminderGuard, WorkHoursGuard};
pub use log::{WellnessEvent, WellnessStats};
pub use reminder::{ReminderCategoryConfig, ReminderDue, ReminderScheduler, ReminderStatus};
pub use service::{WellnessCommand, WellnessHandle, WellnessService};
