use geekfit_core::{AggregateStats, ExerciseSkill, Tier};
use serde::Serialize;

use super::{open_engine, CommandResult};

#[derive(Serialize)]
struct SkillRow {
    id: i64,
    name: String,
    level: u8,
    tier: Tier,
    total_xp: u64,
    xp_to_next_level: u64,
}

impl From<&ExerciseSkill> for SkillRow {
    fn from(skill: &ExerciseSkill) -> Self {
        Self {
            id: skill.id(),
            name: skill.name().to_string(),
            level: skill.current_level(),
            tier: skill.tier(),
            total_xp: skill.total_xp(),
            xp_to_next_level: skill.progress().xp_to_next_level(),
        }
    }
}

#[derive(Serialize)]
struct StatsReport {
    #[serde(flatten)]
    stats: AggregateStats,
    skills: Vec<SkillRow>,
}

pub fn stats() -> CommandResult {
    let engine = open_engine()?;
    let mut skills: Vec<SkillRow> = engine.exercises().map(SkillRow::from).collect();
    skills.sort_by(|a, b| b.total_xp.cmp(&a.total_xp).then(a.id.cmp(&b.id)));
    let report = StatsReport {
        stats: engine.aggregate_stats(),
        skills,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

pub fn today() -> CommandResult {
    let engine = open_engine()?;
    println!("{}", serde_json::to_string_pretty(&engine.daily_summary(None))?);
    Ok(())
}

pub fn history(days: u32) -> CommandResult {
    let engine = open_engine()?;
    println!("{}", serde_json::to_string_pretty(&engine.history(days))?);
    Ok(())
}
