use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Independently scheduled reminder kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReminderCategory {
    Hydration,
    EyeCare,
    Posture,
}

impl ReminderCategory {
    pub const ALL: [ReminderCategory; 3] = [
        ReminderCategory::Hydration,
        ReminderCategory::EyeCare,
        ReminderCategory::Posture,
    ];

    /// Stable key used in settings names and the wellness log.
    pub fn key(self) -> &'static str {
        match self {
            ReminderCategory::Hydration => "hydration",
            ReminderCategory::EyeCare => "eye_care",
            ReminderCategory::Posture => "posture",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ReminderCategory::Hydration => "Hydration",
            ReminderCategory::EyeCare => "Eye care",
            ReminderCategory::Posture => "Posture",
        }
    }

    pub fn default_interval_minutes(self) -> u32 {
        match self {
            ReminderCategory::Hydration => 45,
            ReminderCategory::EyeCare => 20,
            ReminderCategory::Posture => 30,
        }
    }

    pub fn prompt(self) -> &'static str {
        match self {
            ReminderCategory::Hydration => "Time for a glass of water!",
            ReminderCategory::EyeCare => "Look at something 20 feet away for 20 seconds.",
            ReminderCategory::Posture => "Check your posture: shoulders back, feet flat.",
        }
    }
}

impl fmt::Display for ReminderCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for ReminderCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "hydration" | "water" => Ok(ReminderCategory::Hydration),
            "eye_care" | "eyecare" | "eyes" => Ok(ReminderCategory::EyeCare),
            "posture" => Ok(ReminderCategory::Posture),
            _ => Err(ValidationError::UnknownCategory(s.to_string())),
        }
    }
}

/// Which timers an acknowledge/reset applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResetTarget {
    All,
    Category(ReminderCategory),
}

impl ResetTarget {
    pub fn includes(self, category: ReminderCategory) -> bool {
        match self {
            ResetTarget::All => true,
            ResetTarget::Category(c) => c == category,
        }
    }
}

impl From<ReminderCategory> for ResetTarget {
    fn from(category: ReminderCategory) -> Self {
        ResetTarget::Category(category)
    }
}

impl FromStr for ResetTarget {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            Ok(ResetTarget::All)
        } else {
            s.parse().map(ResetTarget::Category)
        }
    }
}
