use geekfit_core::{Notice, SubmitOutcome};

use super::{open_engine, CommandResult};

pub fn run(exercise: &str, reps: i64) -> CommandResult {
    let mut engine = open_engine()?;
    let skill = engine.find_exercise(exercise)?;
    let (id, name) = (skill.id(), skill.name().to_string());

    let outcome = engine.submit_activity(id, reps)?;
    for line in describe(&name, &outcome) {
        println!("{line}");
    }
    Ok(())
}

fn describe(name: &str, outcome: &SubmitOutcome) -> Vec<String> {
    let mut lines = vec![format!(
        "{name}: +{} XP (level {}, {} XP total)",
        outcome.xp_earned, outcome.new_level, outcome.total_xp
    )];
    match outcome.headline() {
        Notice::LevelUp { new_level, tier, .. } => {
            lines.push(format!("Level up! {name} is now level {new_level} ({})", tier.title()));
        }
        Notice::PersonalRecord(record) => {
            lines.push(format!(
                "New personal record: {} reps (previous best {})",
                record.value, record.previous_best
            ));
        }
        Notice::XpGained { .. } => {}
    }
    for achievement in &outcome.achievements_unlocked {
        lines.push(format!(
            "Achievement unlocked: {} ({})",
            achievement.name, achievement.description
        ));
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_up_line_follows_xp_line() {
        let outcome = SubmitOutcome {
            entry_id: 1,
            exercise_id: 1,
            xp_earned: 100,
            leveled_up: true,
            previous_level: 1,
            new_level: 2,
            total_xp: 100,
            achievements_unlocked: Vec::new(),
            personal_record: None,
        };
        let lines = describe("Pushups", &outcome);
        assert_eq!(lines[0], "Pushups: +100 XP (level 2, 100 XP total)");
        assert_eq!(lines[1], "Level up! Pushups is now level 2 (Novice Geek)");
        assert_eq!(lines.len(), 2);
    }
}
