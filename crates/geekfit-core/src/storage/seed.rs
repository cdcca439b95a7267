/// Desk-friendly exercises created with a fresh store, as `(name, xp_per_rep)`.
pub const DEFAULT_EXERCISES: &[(&str, u32)] = &[
    // Upper body
    ("Pushups", 10),
    ("Arm Circles", 3),
    // Core
    ("Sit-ups", 8),
    ("Crunches", 6),
    ("Plank (10 sec)", 5),
    ("Leg Raises", 8),
    ("Mountain Climbers", 10),
    // Lower body
    ("Squats", 8),
    ("Lunges", 10),
    ("Calf Raises", 4),
    ("Wall Sit (10 sec)", 4),
    ("Side Leg Raises", 6),
    ("Step-ups", 8),
    // Cardio
    ("Jumping Jacks", 6),
    ("High Knees", 6),
    ("Burpees", 15),
    ("Stair Climbs", 10),
    ("Marching in Place", 4),
    // Stretches and mobility
    ("Neck Stretches", 2),
    ("Shoulder Shrugs", 3),
    ("Wrist Circles", 2),
    ("Toe Touches", 4),
    ("Hip Circles", 3),
    ("Torso Twists", 3),
    ("Ankle Rotations", 2),
    ("Cat-Cow Stretch", 3),
    ("Chest Opener", 3),
    ("Quad Stretch", 3),
];

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn defaults_are_unique_and_positive() {
        assert_eq!(DEFAULT_EXERCISES.len(), 28);
        let names: HashSet<String> = DEFAULT_EXERCISES
            .iter()
            .map(|(name, _)| name.to_lowercase())
            .collect();
        assert_eq!(names.len(), DEFAULT_EXERCISES.len());
        assert!(DEFAULT_EXERCISES.iter().all(|&(_, xp)| xp > 0));
    }
}
