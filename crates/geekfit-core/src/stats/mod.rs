//! Statistics derived from the activity log.
//!
//! The aggregator keeps per-exercise XP and levels current as entries arrive;
//! streaks and the daily summary are recomputed from the log on demand.

mod aggregator;
mod daily;
pub mod streak;

pub use aggregator::StatAggregator;
pub use daily::{DailySummary, ExerciseDayTotal};
pub use streak::StreakSummary;
