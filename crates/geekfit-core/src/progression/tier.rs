use serde::{Deserialize, Serialize};

/// Coarse presentation bucket for a level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    /// Levels 1-9
    Novice,
    /// Levels 10-24
    Apprentice,
    /// Levels 25-49
    Adept,
    /// Levels 50-74
    Expert,
    /// Levels 75-98
    Master,
    /// Level 99
    Legend,
}

impl Tier {
    /// All tiers in ascending order.
    pub const ALL: [Tier; 6] = [
        Tier::Novice,
        Tier::Apprentice,
        Tier::Adept,
        Tier::Expert,
        Tier::Master,
        Tier::Legend,
    ];

    /// Lowest level belonging to this tier.
    pub fn min_level(self) -> u8 {
        match self {
            Tier::Novice => 1,
            Tier::Apprentice => 10,
            Tier::Adept => 25,
            Tier::Expert => 50,
            Tier::Master => 75,
            Tier::Legend => 99,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Tier::Novice => "Novice Geek",
            Tier::Apprentice => "Fitness Apprentice",
            Tier::Adept => "Strength Seeker",
            Tier::Expert => "Endurance Elite",
            Tier::Master => "Fitness Warrior",
            Tier::Legend => "Legendary Geek",
        }
    }

    /// The next tier up, if any.
    pub fn next(self) -> Option<Tier> {
        match self {
            Tier::Novice => Some(Tier::Apprentice),
            Tier::Apprentice => Some(Tier::Adept),
            Tier::Adept => Some(Tier::Expert),
            Tier::Expert => Some(Tier::Master),
            Tier::Master => Some(Tier::Legend),
            Tier::Legend => None,
        }
    }
}

/// Tier for a level; out-of-range levels clamp to the first or last tier.
pub fn tier_for_level(level: u8) -> Tier {
    Tier::ALL
        .iter()
        .rev()
        .copied()
        .find(|tier| level >= tier.min_level())
        .unwrap_or(Tier::Novice)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_map_to_tiers() {
        assert_eq!(tier_for_level(0), Tier::Novice);
        assert_eq!(tier_for_level(1), Tier::Novice);
        assert_eq!(tier_for_level(9), Tier::Novice);
        assert_eq!(tier_for_level(10), Tier::Apprentice);
        assert_eq!(tier_for_level(24), Tier::Apprentice);
        assert_eq!(tier_for_level(25), Tier::Adept);
        assert_eq!(tier_for_level(50), Tier::Expert);
        assert_eq!(tier_for_level(74), Tier::Expert);
        assert_eq!(tier_for_level(75), Tier::Master);
        assert_eq!(tier_for_level(98), Tier::Master);
        assert_eq!(tier_for_level(99), Tier::Legend);
        assert_eq!(tier_for_level(200), Tier::Legend);
    }

    #[test]
    fn tiers_are_ordered() {
        for pair in Tier::ALL.windows(2) {
            assert!(pair[0] < pair[1]);
            assert!(pair[0].min_level() < pair[1].min_level());
            assert_eq!(pair[0].next(), Some(pair[1]));
        }
        assert_eq!(Tier::Legend.next(), None);
    }
}
