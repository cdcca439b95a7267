//! Experience curve.
//!
//! Cumulative XP to reach level `L` is
//!
//! ```text
//! floor( sum_{i=1}^{L-1} floor(i + 300 * 2^(i/7)) / 4 )
//! ```
//!
//! which gives 83 XP for level 2 and 13,034,431 XP for level 99. The table is
//! computed once; every lookup after that is a slice access.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};

/// Lowest reachable level.
pub const MIN_LEVEL: u8 = 1;
/// Highest reachable level. XP beyond the level-99 threshold still accrues.
pub const MAX_LEVEL: u8 = 99;

/// `XP_TABLE[n]` holds the cumulative XP for level `n + 1`.
fn xp_table() -> &'static [u64; MAX_LEVEL as usize] {
    static TABLE: OnceLock<[u64; MAX_LEVEL as usize]> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut table = [0u64; MAX_LEVEL as usize];
        let mut points = 0.0_f64;
        for level in 2..=MAX_LEVEL {
            let i = f64::from(level - 1);
            points += (i + 300.0 * 2.0_f64.powf(i / 7.0)).floor();
            table[usize::from(level - 1)] = (points / 4.0).floor() as u64;
        }
        table
    })
}

/// Cumulative XP required to reach `level`.
///
/// Levels at or below 1 need no XP; levels above 99 are clamped to 99.
pub fn xp_for_level(level: i32) -> u64 {
    if level <= i32::from(MIN_LEVEL) {
        return 0;
    }
    let clamped = level.min(i32::from(MAX_LEVEL)) as usize;
    xp_table()[clamped - 1]
}

/// Largest level whose threshold is at or below `xp`.
///
/// Negative XP is treated as zero; anything past the level-99 threshold stays
/// at 99.
pub fn level_from_xp(xp: i64) -> u8 {
    if xp <= 0 {
        return MIN_LEVEL;
    }
    let xp = xp as u64;
    // Thresholds are strictly increasing, so the partition point is the count
    // of levels already reached.
    let reached = xp_table().partition_point(|&threshold| threshold <= xp);
    (reached as u8).clamp(MIN_LEVEL, MAX_LEVEL)
}

/// Position of an XP total within its level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    pub level: u8,
    /// XP earned since the current level's threshold.
    pub xp_into_level: u64,
    /// Width of the current level in XP; zero at the maximum level.
    pub xp_needed_for_level: u64,
}

impl LevelProgress {
    /// 0.0 .. 1.0 progress through the current level. Always 1.0 at level 99.
    pub fn fraction(&self) -> f64 {
        if self.xp_needed_for_level == 0 {
            return 1.0;
        }
        (self.xp_into_level as f64 / self.xp_needed_for_level as f64).min(1.0)
    }

    /// XP still missing before the next level, zero at the cap.
    pub fn xp_to_next_level(&self) -> u64 {
        self.xp_needed_for_level.saturating_sub(self.xp_into_level)
    }
}

pub fn progress_within_level(xp: i64) -> LevelProgress {
    let level = level_from_xp(xp);
    let floor = xp_for_level(i32::from(level));
    let xp = xp.max(0) as u64;
    let xp_needed_for_level = if level >= MAX_LEVEL {
        0
    } else {
        xp_for_level(i32::from(level) + 1) - floor
    };
    LevelProgress {
        level,
        xp_into_level: xp - floor,
        xp_needed_for_level,
    }
}
