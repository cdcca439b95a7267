//! Injectable wall-clock source.
//!
//! Everything time-dependent in the core asks a [`Clock`] instead of calling
//! `Local::now()` directly, so tests can drive time by hand.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Local};

/// Source of local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Local>;
}

/// The real system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// A clock that only moves when told to.
///
/// Cloning shares the underlying instant, so a test can keep one handle and
/// give another to the component under test.
#[derive(Debug, Clone)]
pub struct ManualClock {
    now: Arc<Mutex<DateTime<Local>>>,
}

impl ManualClock {
    pub fn new(start: DateTime<Local>) -> Self {
        Self {
            now: Arc::new(Mutex::new(start)),
        }
    }

    pub fn set(&self, at: DateTime<Local>) {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Local> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
