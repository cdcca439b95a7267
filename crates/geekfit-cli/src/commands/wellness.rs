use std::sync::Arc;

use clap::Subcommand;
use geekfit_core::storage::CategorySettings;
use geekfit_core::{
    Clock, Config, Database, Event, EventBus, FocusDetector, ProgressionEngine, ReminderCategory,
    ResetTarget, SettingKey, SystemClock, WellnessHandle, WellnessOutcome, WellnessService,
    WellnessStats,
};
use serde::Serialize;
use tokio::sync::{broadcast, mpsc};
use tracing::warn;

use super::{open_engine, open_engine_with, CommandResult};

#[derive(Subcommand)]
pub enum WellnessAction {
    /// Today's wellness counts and reminder settings
    Status,
    /// Record a completed wellness action (hydration, eye_care, posture)
    Done { category: ReminderCategory },
    /// Run reminders in the foreground until ctrl-c
    Run,
}

#[derive(Serialize)]
struct CategoryRow {
    category: ReminderCategory,
    #[serde(flatten)]
    settings: CategorySettings,
}

#[derive(Serialize)]
struct StatusReport {
    reminders_enabled: bool,
    hydration_daily_goal: u32,
    categories: Vec<CategoryRow>,
    stats: WellnessStats,
}

pub fn run(action: WellnessAction) -> CommandResult {
    match action {
        WellnessAction::Status => {
            let engine = open_engine()?;
            let settings = engine.settings();
            let report = StatusReport {
                reminders_enabled: settings.reminders_enabled,
                hydration_daily_goal: settings.hydration_daily_goal,
                categories: ReminderCategory::ALL
                    .into_iter()
                    .map(|category| CategoryRow {
                        category,
                        settings: *settings.reminder(category),
                    })
                    .collect(),
                stats: engine.wellness_stats(),
            };
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        WellnessAction::Done { category } => {
            let mut engine = open_engine()?;
            let outcome = engine.record_wellness(category)?;
            print_done(&outcome);
        }
        WellnessAction::Run => {
            let config = Config::load()?;
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(serve(config))?;
        }
    }
    Ok(())
}

fn print_done(outcome: &WellnessOutcome) {
    println!(
        "{}: {} today",
        outcome.category.display_name(),
        outcome.today_count
    );
    for achievement in &outcome.achievements_unlocked {
        println!("Achievement unlocked: {}", achievement.name);
    }
}

#[derive(Debug, PartialEq, Eq)]
enum Input {
    Activity,
    Ack(ResetTarget),
    Done(ReminderCategory),
    Set(SettingKey, String),
    Pause,
    Resume,
    Quit,
}

fn parse_input(line: &str) -> Result<Input, String> {
    let mut words = line.split_whitespace();
    let command = words.next().map(str::to_ascii_lowercase);
    let arg = words.next();
    let value = words.next();
    match (command.as_deref(), arg) {
        (None, _) => Ok(Input::Activity),
        (Some("ack"), Some(target)) => target.parse().map(Input::Ack).map_err(|e| e.to_string()),
        (Some("ack"), None) => Ok(Input::Ack(ResetTarget::All)),
        (Some("done"), Some(category)) => {
            category.parse().map(Input::Done).map_err(|e| e.to_string())
        }
        (Some("done"), None) => Err("done needs a category".into()),
        (Some("set"), Some(key)) => {
            let key = key.parse::<SettingKey>().map_err(|e| e.to_string())?;
            let value = value.ok_or_else(|| format!("set {key} needs a value"))?;
            Ok(Input::Set(key, value.to_string()))
        }
        (Some("set"), None) => Err("set needs a key and a value".into()),
        (Some("pause"), _) => Ok(Input::Pause),
        (Some("resume"), _) => Ok(Input::Resume),
        (Some("quit" | "exit" | "q"), _) => Ok(Input::Quit),
        (Some(other), _) => Err(format!("unknown command '{other}'")),
    }
}

/// Forward stdin lines; the channel closes at end of input.
fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        for line in std::io::stdin().lines() {
            let Ok(line) = line else { break };
            if tx.blocking_send(line).is_err() {
                break;
            }
        }
    });
    rx
}

async fn serve(config: Config) -> CommandResult {
    let bus = EventBus::default();
    let mut events = bus.subscribe();
    let mut engine = open_engine_with(bus.clone())?;
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (service, handle) = WellnessService::new(
        clock.clone(),
        bus,
        FocusDetector::new(config.scheduler.focus()),
        engine.reminder_scheduler(clock.now()),
        config.scheduler.tick(),
    );
    let task = tokio::spawn(service.run());
    let mut input = spawn_stdin_reader();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    println!(
        "reminders running; commands: ack [category|all], done <category>, set <key> <value>, pause, resume, quit"
    );
    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            event = events.recv() => match event {
                Ok(Event::ReminderDue { category, .. }) => {
                    println!("{}: {}", category.display_name(), category.prompt());
                }
                Ok(Event::FocusStateChanged { active, .. }) => {
                    println!("focus mode {}", if active { "on" } else { "off" });
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "event stream lagged");
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },
            line = input.recv() => {
                let Some(line) = line else { break };
                handle.activity().await;
                if !apply_input(&line, &mut engine, &handle).await {
                    break;
                }
            }
        }
    }

    handle.shutdown();
    task.await?;
    Ok(())
}

/// Returns false when the user asked to quit.
async fn apply_input(
    line: &str,
    engine: &mut ProgressionEngine<Database>,
    handle: &WellnessHandle,
) -> bool {
    match parse_input(line) {
        Ok(Input::Activity) => {}
        Ok(Input::Ack(target)) => handle.acknowledge(target).await,
        Ok(Input::Done(category)) => match engine.record_wellness(category) {
            Ok(outcome) => {
                handle.acknowledge(category.into()).await;
                print_done(&outcome);
            }
            Err(e) => eprintln!("error: {e}"),
        },
        Ok(Input::Set(key, value)) => match engine.update_setting(key, &value) {
            Ok(settings) => {
                println!("{key} = {}", settings.get(key));
                handle.apply_settings(settings.clone()).await;
            }
            Err(e) => eprintln!("error: {e}"),
        },
        Ok(Input::Pause) => handle.set_enabled(false).await,
        Ok(Input::Resume) => handle.set_enabled(true).await,
        Ok(Input::Quit) => return false,
        Err(message) => eprintln!("{message}"),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_interactive_commands() {
        assert_eq!(parse_input("   "), Ok(Input::Activity));
        assert_eq!(parse_input("ack"), Ok(Input::Ack(ResetTarget::All)));
        assert_eq!(
            parse_input("ack eye_care"),
            Ok(Input::Ack(ResetTarget::Category(ReminderCategory::EyeCare)))
        );
        assert_eq!(
            parse_input("DONE water"),
            Ok(Input::Done(ReminderCategory::Hydration))
        );
        assert_eq!(
            parse_input("set wellness_eye_care_interval 25"),
            Ok(Input::Set(
                SettingKey::ReminderInterval(ReminderCategory::EyeCare),
                "25".into()
            ))
        );
        assert_eq!(parse_input("pause"), Ok(Input::Pause));
        assert_eq!(parse_input("q"), Ok(Input::Quit));
    }

    #[test]
    fn rejects_unknown_input() {
        assert!(parse_input("done stretching").is_err());
        assert!(parse_input("done").is_err());
        assert!(parse_input("dance").is_err());
        assert!(parse_input("set").is_err());
        assert!(parse_input("set reminders_enabled").is_err());
        assert!(parse_input("set volume 3").is_err());
    }
}
