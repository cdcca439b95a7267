use clap::Subcommand;

use super::{open_engine, CommandResult};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// Add a custom exercise
    Add {
        name: String,
        /// XP earned per rep
        #[arg(long, default_value = "5")]
        xp: i64,
    },
    /// Remove an exercise and its log entries
    Remove {
        /// Exercise name, exact or partial
        name: String,
    },
}

pub fn run(action: ExerciseAction) -> CommandResult {
    let mut engine = open_engine()?;
    match action {
        ExerciseAction::Add { name, xp } => {
            let skill = engine.add_exercise(&name, xp)?;
            println!("added {} (id {}, {} XP/rep)", skill.name(), skill.id(), skill.xp_per_rep());
        }
        ExerciseAction::Remove { name } => {
            let skill = engine.find_exercise(&name)?;
            let (id, name) = (skill.id(), skill.name().to_string());
            engine.delete_exercise(id)?;
            println!("removed {name}");
        }
    }
    Ok(())
}

pub fn list() -> CommandResult {
    let engine = open_engine()?;
    for skill in engine.exercises() {
        println!(
            "{:>3}  {:<22} {:>3} XP/rep  lvl {:>2}  {:>9} XP",
            skill.id(),
            skill.name(),
            skill.xp_per_rep(),
            skill.current_level(),
            skill.total_xp()
        );
    }
    Ok(())
}

/// How many matches `quick` prints.
const QUICK_LIMIT: usize = 10;

pub fn quick(search: &str) -> CommandResult {
    let engine = open_engine()?;
    let found = engine.search_exercises(search, QUICK_LIMIT);
    let Some(best) = found.first() else {
        println!("no exercises matching '{search}'");
        return Ok(());
    };
    println!("{} exercises matching '{search}':", found.len());
    for (i, skill) in found.iter().enumerate() {
        println!(
            "  {}. {} (lvl {}, {} XP/rep)",
            i + 1,
            skill.name(),
            skill.current_level(),
            skill.xp_per_rep()
        );
    }
    println!("log with: geekfit log \"{}\" <reps>", best.name());
    Ok(())
}
