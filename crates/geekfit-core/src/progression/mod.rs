//! Level curve and tiers.
//!
//! Pure functions only. Inputs outside the valid range are clamped, never
//! rejected.

mod curve;
mod tier;

pub use curve::{
    level_from_xp, progress_within_level, xp_for_level, LevelProgress, MAX_LEVEL, MIN_LEVEL,
};
pub use tier::{tier_for_level, Tier};
