pub mod achievements;
pub mod config;
pub mod exercise;
pub mod log;
pub mod settings;
pub mod stats;
pub mod wellness;

use std::sync::Arc;

use geekfit_core::{Config, Database, EventBus, ProgressionEngine, SystemClock};

pub type CommandResult = Result<(), Box<dyn std::error::Error>>;

/// Open the engine over the configured database with the system clock.
pub fn open_engine() -> Result<ProgressionEngine<Database>, Box<dyn std::error::Error>> {
    open_engine_with(EventBus::default())
}

pub fn open_engine_with(bus: EventBus) -> Result<ProgressionEngine<Database>, Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = Database::open_at(config.database_path()?)?;
    Ok(ProgressionEngine::open(db, Arc::new(SystemClock), bus)?)
}
