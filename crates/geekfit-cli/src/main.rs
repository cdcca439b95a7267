use clap::{Parser, Subcommand};
use geekfit_core::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod commands;

#[derive(Parser)]
#[command(name = "geekfit", version, about = "Desk exercise tracker with RuneScape-style levels")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log reps of an exercise
    Log {
        /// Exercise name, exact or partial
        exercise: String,
        /// Number of reps
        #[arg(allow_hyphen_values = true)]
        reps: i64,
    },
    /// Overall stats and per-exercise levels
    Stats,
    /// List exercises
    List,
    /// Recent log entries
    History {
        /// How many days back, today included
        #[arg(long, default_value = "7")]
        days: u32,
    },
    /// Find exercises by partial name, highest level first
    Quick {
        /// Part of the exercise name
        search: String,
    },
    /// Today's XP against the daily goal
    Today,
    /// Achievement progress
    Achievements,
    /// Exercise catalog management
    Exercise {
        #[command(subcommand)]
        action: commands::exercise::ExerciseAction,
    },
    /// Wellness reminders
    Wellness {
        #[command(subcommand)]
        action: commands::wellness::WellnessAction,
    },
    /// User settings stored in the database
    Settings {
        #[command(subcommand)]
        action: commands::settings::SettingsAction,
    },
    /// Configuration file management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_logging() {
    let filter = EnvFilter::try_from_env("GEEKFIT_LOG").unwrap_or_else(|_| {
        let level = Config::load()
            .map(|c| c.logging.level)
            .unwrap_or_else(|_| "info".into());
        EnvFilter::try_new(level).unwrap_or_else(|_| EnvFilter::new("info"))
    });
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Commands::Log { exercise, reps } => commands::log::run(&exercise, reps),
        Commands::Stats => commands::stats::stats(),
        Commands::List => commands::exercise::list(),
        Commands::History { days } => commands::stats::history(days),
        Commands::Quick { search } => commands::exercise::quick(&search),
        Commands::Today => commands::stats::today(),
        Commands::Achievements => commands::achievements::run(),
        Commands::Exercise { action } => commands::exercise::run(action),
        Commands::Wellness { action } => commands::wellness::run(action),
        Commands::Settings { action } => commands::settings::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_log_with_negative_reps() {
        let cli = Cli::try_parse_from(["geekfit", "log", "push", "-3"]).unwrap();
        assert!(matches!(cli.command, Commands::Log { reps: -3, .. }));
    }

    #[test]
    fn history_defaults_to_a_week() {
        let cli = Cli::try_parse_from(["geekfit", "history"]).unwrap();
        assert!(matches!(cli.command, Commands::History { days: 7 }));
    }

    #[test]
    fn parses_quick_search() {
        let cli = Cli::try_parse_from(["geekfit", "quick", "squ"]).unwrap();
        assert!(matches!(cli.command, Commands::Quick { search } if search == "squ"));
        assert!(Cli::try_parse_from(["geekfit", "quick"]).is_err());
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["geekfit", "dance"]).is_err());
    }
}
