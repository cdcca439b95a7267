//! Typed user settings.
//!
//! The store keeps settings as flat, category-prefixed string pairs
//! (`wellness_hydration_interval = "45"`). Everything above the storage edge
//! works with [`Settings`] and the enumerated [`SettingKey`].

use std::fmt;
use std::str::FromStr;

use chrono::Weekday;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ValidationError};
use crate::wellness::ReminderCategory;

/// Reminder settings for one category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySettings {
    pub enabled: bool,
    pub interval_minutes: u32,
    /// Hold the reminder back while the user is focused.
    pub suppress_during_focus: bool,
}

impl CategorySettings {
    pub fn defaults_for(category: ReminderCategory) -> Self {
        Self {
            enabled: true,
            interval_minutes: category.default_interval_minutes(),
            suppress_during_focus: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkHoursSettings {
    pub enabled: bool,
    pub start_hour: u32,
    pub end_hour: u32,
    pub days: Vec<Weekday>,
}

impl Default for WorkHoursSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            start_hour: 9,
            end_hour: 17,
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
            ],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    pub daily_goal_xp: u64,
    /// Global switch over every reminder category.
    pub reminders_enabled: bool,
    /// Glasses of water per day; 0 turns the hydration guard off.
    pub hydration_daily_goal: u32,
    pub hydration: CategorySettings,
    pub eye_care: CategorySettings,
    pub posture: CategorySettings,
    pub work_hours: WorkHoursSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            daily_goal_xp: 500,
            reminders_enabled: true,
            hydration_daily_goal: 8,
            hydration: CategorySettings::defaults_for(ReminderCategory::Hydration),
            eye_care: CategorySettings::defaults_for(ReminderCategory::EyeCare),
            posture: CategorySettings::defaults_for(ReminderCategory::Posture),
            work_hours: WorkHoursSettings::default(),
        }
    }
}

/// Every persisted setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    DailyGoalXp,
    RemindersEnabled,
    HydrationDailyGoal,
    ReminderEnabled(ReminderCategory),
    ReminderInterval(ReminderCategory),
    ReminderSuppressDuringFocus(ReminderCategory),
    WorkHoursEnabled,
    WorkHoursStart,
    WorkHoursEnd,
    WorkHoursDays,
}

impl SettingKey {
    pub fn all() -> Vec<SettingKey> {
        let mut keys = vec![
            SettingKey::DailyGoalXp,
            SettingKey::RemindersEnabled,
            SettingKey::HydrationDailyGoal,
        ];
        for category in ReminderCategory::ALL {
            keys.push(SettingKey::ReminderEnabled(category));
            keys.push(SettingKey::ReminderInterval(category));
            keys.push(SettingKey::ReminderSuppressDuringFocus(category));
        }
        keys.extend([
            SettingKey::WorkHoursEnabled,
            SettingKey::WorkHoursStart,
            SettingKey::WorkHoursEnd,
            SettingKey::WorkHoursDays,
        ]);
        keys
    }

    /// Flat storage name.
    pub fn name(self) -> String {
        match self {
            SettingKey::DailyGoalXp => "daily_goal_xp".into(),
            SettingKey::RemindersEnabled => "reminders_enabled".into(),
            SettingKey::HydrationDailyGoal => "wellness_hydration_daily_goal".into(),
            SettingKey::ReminderEnabled(c) => format!("wellness_{}_enabled", c.key()),
            SettingKey::ReminderInterval(c) => format!("wellness_{}_interval", c.key()),
            SettingKey::ReminderSuppressDuringFocus(c) => {
                format!("wellness_{}_suppress_during_focus", c.key())
            }
            SettingKey::WorkHoursEnabled => "work_hours_enabled".into(),
            SettingKey::WorkHoursStart => "work_hours_start".into(),
            SettingKey::WorkHoursEnd => "work_hours_end".into(),
            SettingKey::WorkHoursDays => "work_hours_days".into(),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for SettingKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        SettingKey::all()
            .into_iter()
            .find(|k| k.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}

fn invalid(key: SettingKey, message: impl Into<String>) -> ValidationError {
    ValidationError::InvalidValue {
        field: key.name(),
        message: message.into(),
    }
}

fn parse_bool(key: SettingKey, value: &str) -> Result<bool, ValidationError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "on" | "yes" => Ok(true),
        "false" | "0" | "off" | "no" => Ok(false),
        other => Err(invalid(key, format!("expected true/false, got '{other}'"))),
    }
}

fn parse_in_range<T>(key: SettingKey, value: &str, min: T, max: T) -> Result<T, ValidationError>
where
    T: FromStr + PartialOrd + fmt::Display + Copy,
{
    let parsed: T = value
        .trim()
        .parse()
        .map_err(|_| invalid(key, format!("'{value}' is not a number")))?;
    if parsed < min || parsed > max {
        return Err(invalid(key, format!("must be between {min} and {max}")));
    }
    Ok(parsed)
}

fn parse_days(key: SettingKey, value: &str) -> Result<Vec<Weekday>, ValidationError> {
    let mut days = Vec::new();
    for part in value.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let day: Weekday = part
            .parse()
            .map_err(|_| invalid(key, format!("'{part}' is not a weekday")))?;
        if !days.contains(&day) {
            days.push(day);
        }
    }
    days.sort_by_key(|d| d.num_days_from_monday());
    Ok(days)
}

fn format_days(days: &[Weekday]) -> String {
    days.iter()
        .map(|d| d.to_string().to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join(",")
}

impl Settings {
    pub fn reminder(&self, category: ReminderCategory) -> &CategorySettings {
        match category {
            ReminderCategory::Hydration => &self.hydration,
            ReminderCategory::EyeCare => &self.eye_care,
            ReminderCategory::Posture => &self.posture,
        }
    }

    pub fn reminder_mut(&mut self, category: ReminderCategory) -> &mut CategorySettings {
        match category {
            ReminderCategory::Hydration => &mut self.hydration,
            ReminderCategory::EyeCare => &mut self.eye_care,
            ReminderCategory::Posture => &mut self.posture,
        }
    }

    /// Current value in storage form.
    pub fn get(&self, key: SettingKey) -> String {
        match key {
            SettingKey::DailyGoalXp => self.daily_goal_xp.to_string(),
            SettingKey::RemindersEnabled => self.reminders_enabled.to_string(),
            SettingKey::HydrationDailyGoal => self.hydration_daily_goal.to_string(),
            SettingKey::ReminderEnabled(c) => self.reminder(c).enabled.to_string(),
            SettingKey::ReminderInterval(c) => self.reminder(c).interval_minutes.to_string(),
            SettingKey::ReminderSuppressDuringFocus(c) => {
                self.reminder(c).suppress_during_focus.to_string()
            }
            SettingKey::WorkHoursEnabled => self.work_hours.enabled.to_string(),
            SettingKey::WorkHoursStart => self.work_hours.start_hour.to_string(),
            SettingKey::WorkHoursEnd => self.work_hours.end_hour.to_string(),
            SettingKey::WorkHoursDays => format_days(&self.work_hours.days),
        }
    }

    /// Parse and apply one value. On error nothing changes.
    pub fn set(&mut self, key: SettingKey, value: &str) -> Result<(), ValidationError> {
        match key {
            SettingKey::DailyGoalXp => {
                self.daily_goal_xp = parse_in_range(key, value, 1, 1_000_000)?;
            }
            SettingKey::RemindersEnabled => self.reminders_enabled = parse_bool(key, value)?,
            SettingKey::HydrationDailyGoal => {
                self.hydration_daily_goal = parse_in_range(key, value, 0, 50)?;
            }
            SettingKey::ReminderEnabled(c) => self.reminder_mut(c).enabled = parse_bool(key, value)?,
            SettingKey::ReminderInterval(c) => {
                self.reminder_mut(c).interval_minutes = parse_in_range(key, value, 1, 24 * 60)?;
            }
            SettingKey::ReminderSuppressDuringFocus(c) => {
                self.reminder_mut(c).suppress_during_focus = parse_bool(key, value)?;
            }
            SettingKey::WorkHoursEnabled => self.work_hours.enabled = parse_bool(key, value)?,
            SettingKey::WorkHoursStart => {
                let start = parse_in_range(key, value, 0, 23)?;
                if start >= self.work_hours.end_hour {
                    return Err(invalid(key, "must be before work_hours_end"));
                }
                self.work_hours.start_hour = start;
            }
            SettingKey::WorkHoursEnd => {
                let end = parse_in_range(key, value, 1, 24)?;
                if end <= self.work_hours.start_hour {
                    return Err(invalid(key, "must be after work_hours_start"));
                }
                self.work_hours.end_hour = end;
            }
            SettingKey::WorkHoursDays => self.work_hours.days = parse_days(key, value)?,
        }
        Ok(())
    }

    /// Flatten for storage.
    pub fn to_pairs(&self) -> Vec<(String, String)> {
        SettingKey::all()
            .into_iter()
            .map(|key| (key.name(), self.get(key)))
            .collect()
    }

    /// Rebuild from stored pairs. Missing keys keep their defaults; unknown
    /// keys and bad values are logged and skipped so one bad row cannot lock
    /// the user out.
    pub fn from_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut settings = Settings::default();
        // Start and end are checked against each other, so apply them as a pair.
        let mut hours: (Option<u32>, Option<u32>) = (None, None);
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            let key = match name.parse::<SettingKey>() {
                Ok(key) => key,
                Err(_) => {
                    warn!(key = name, "ignoring unknown stored setting");
                    continue;
                }
            };
            let result = match key {
                SettingKey::WorkHoursStart => {
                    parse_in_range(key, value, 0, 23).map(|h| hours.0 = Some(h))
                }
                SettingKey::WorkHoursEnd => parse_in_range(key, value, 1, 24).map(|h| hours.1 = Some(h)),
                _ => settings.set(key, value),
            };
            if let Err(err) = result {
                warn!(key = name, error = %err, "ignoring invalid stored setting");
            }
        }

        let start = hours.0.unwrap_or(settings.work_hours.start_hour);
        let end = hours.1.unwrap_or(settings.work_hours.end_hour);
        if start < end {
            settings.work_hours.start_hour = start;
            settings.work_hours.end_hour = end;
        } else {
            warn!(start, end, "ignoring inverted stored work hours");
        }
        settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.daily_goal_xp, 500);
        assert_eq!(settings.hydration_daily_goal, 8);
        assert_eq!(settings.reminder(ReminderCategory::Hydration).interval_minutes, 45);
        assert_eq!(settings.reminder(ReminderCategory::EyeCare).interval_minutes, 20);
        assert_eq!(settings.reminder(ReminderCategory::Posture).interval_minutes, 30);
        assert!(!settings.work_hours.enabled);
    }

    #[test]
    fn flat_names_are_category_prefixed() {
        assert_eq!(
            SettingKey::ReminderInterval(ReminderCategory::Hydration).name(),
            "wellness_hydration_interval"
        );
        assert_eq!(
            "wellness_eye_care_enabled".parse::<SettingKey>().unwrap(),
            SettingKey::ReminderEnabled(ReminderCategory::EyeCare)
        );
        assert!(matches!(
            "wellness_stretch_enabled".parse::<SettingKey>(),
            Err(ConfigError::UnknownKey(_))
        ));
    }

    #[test]
    fn pairs_round_trip() {
        let mut settings = Settings::default();
        settings.set(SettingKey::DailyGoalXp, "750").unwrap();
        settings
            .set(SettingKey::ReminderInterval(ReminderCategory::Posture), "50")
            .unwrap();
        settings.set(SettingKey::WorkHoursDays, "sat, Sun,mon").unwrap();

        let restored = Settings::from_pairs(settings.to_pairs());
        assert_eq!(restored, settings);
        assert_eq!(restored.get(SettingKey::WorkHoursDays), "mon,sat,sun");
    }

    #[test]
    fn set_rejects_bad_values_without_change() {
        let mut settings = Settings::default();
        let key = SettingKey::ReminderInterval(ReminderCategory::EyeCare);
        assert!(settings.set(key, "0").is_err());
        assert!(settings.set(key, "soon").is_err());
        assert!(settings.set(SettingKey::WorkHoursEnd, "8").is_err());
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn from_pairs_skips_junk() {
        let settings = Settings::from_pairs([
            ("reminder_interval_minutes", "120"),
            ("daily_goal_xp", "lots"),
            ("wellness_posture_enabled", "false"),
        ]);
        assert_eq!(settings.daily_goal_xp, 500);
        assert!(!settings.posture.enabled);
    }

    #[test]
    fn from_pairs_accepts_early_work_hours() {
        let settings = Settings::from_pairs([("work_hours_end", "8"), ("work_hours_start", "6")]);
        assert_eq!(settings.work_hours.start_hour, 6);
        assert_eq!(settings.work_hours.end_hour, 8);
    }
}
