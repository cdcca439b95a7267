use clap::Subcommand;
use geekfit_core::SettingKey;

use super::{open_engine, CommandResult};

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print every setting
    Show,
    /// Change a setting (e.g. "wellness_hydration_interval 30")
    Set { key: String, value: String },
}

pub fn run(action: SettingsAction) -> CommandResult {
    let mut engine = open_engine()?;
    match action {
        SettingsAction::Show => {
            let settings = engine.settings();
            for key in SettingKey::all() {
                println!("{key} = {}", settings.get(key));
            }
        }
        SettingsAction::Set { key, value } => {
            let key: SettingKey = key.parse()?;
            let settings = engine.update_setting(key, &value)?;
            println!("{key} = {}", settings.get(key));
        }
    }
    Ok(())
}
