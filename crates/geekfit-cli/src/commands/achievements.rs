use super::{open_engine, CommandResult};

pub fn run() -> CommandResult {
    let engine = open_engine()?;
    let views = engine.achievements();
    let unlocked = views.iter().filter(|v| v.unlocked_at.is_some()).count();

    println!("{unlocked}/{} unlocked", views.len());
    for view in &views {
        let mark = if view.unlocked_at.is_some() { "x" } else { " " };
        println!("[{mark}] {}: {}", view.name, view.description);
    }
    Ok(())
}
