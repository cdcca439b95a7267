use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::trace;

use crate::model::{EntryId, ExerciseId};
use crate::progression::Tier;
use crate::records::PersonalRecord;
use crate::wellness::ReminderCategory;

/// Everything observable the core does produces an Event.
/// UI and notification code subscribe; the core never calls into them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    ActivityLogged {
        entry_id: EntryId,
        exercise_id: ExerciseId,
        reps: u32,
        xp_earned: u64,
        at: DateTime<Local>,
    },
    /// Reported once per entry with the final level, even across several levels.
    SkillLeveledUp {
        exercise_id: ExerciseId,
        previous_level: u8,
        new_level: u8,
        tier: Tier,
        at: DateTime<Local>,
    },
    PersonalRecordSet {
        record: PersonalRecord,
        at: DateTime<Local>,
    },
    AchievementUnlocked {
        key: String,
        name: String,
        at: DateTime<Local>,
    },
    WellnessLogged {
        category: ReminderCategory,
        at: DateTime<Local>,
    },
    ReminderDue {
        category: ReminderCategory,
        at: DateTime<Local>,
    },
    FocusStateChanged {
        active: bool,
        at: DateTime<Local>,
    },
}

/// Publish/subscribe channel for [`Event`]s.
///
/// Slow subscribers lag and lose the oldest events rather than blocking the
/// publisher.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
}

impl EventBus {
    pub const DEFAULT_CAPACITY: usize = 256;

    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: Event) {
        if self.sender.send(event).is_err() {
            trace!("event dropped, no subscribers");
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn serializes_with_type_tag() {
        let at = Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let json = serde_json::to_value(Event::ReminderDue {
            category: ReminderCategory::EyeCare,
            at,
        })
        .unwrap();
        assert_eq!(json["type"], "ReminderDue");
        assert_eq!(json["category"], "eye_care");
    }

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = EventBus::default();
        let mut rx = bus.subscribe();
        let at = Local.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        bus.publish(Event::FocusStateChanged { active: true, at });
        assert_eq!(
            rx.recv().await.unwrap(),
            Event::FocusStateChanged { active: true, at }
        );
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let bus = EventBus::new(4);
        assert_eq!(bus.subscriber_count(), 0);
        bus.publish(Event::FocusStateChanged {
            active: false,
            at: Local::now(),
        });
    }
}
