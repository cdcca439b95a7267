use clap::Subcommand;
use geekfit_core::{Config, ConfigError};

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a config value
    Get {
        /// Config key (e.g. "logging.level", "scheduler.tick_seconds")
        key: String,
    },
    /// Set a config value
    Set {
        /// Config key
        key: String,
        /// New value
        value: String,
    },
    /// Print the whole config as JSON
    Show,
    /// Reset config to defaults
    Reset,
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            let value = config.get(&key).ok_or(ConfigError::UnknownKey(key))?;
            println!("{value}");
        }
        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            config.set(&key, &value)?;
            config.save()?;
            println!("ok");
        }
        ConfigAction::Show => {
            let config = Config::load()?;
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
        ConfigAction::Reset => {
            Config::default().save()?;
            println!("config reset to defaults");
        }
    }
    Ok(())
}
