use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vesper_assistant::db::{self, ReminderRepo};
use vesper_assistant::reminders::ReminderStore;
use vesper_assistant::time_parse::{self, ClockTime};
use vesper_assistant::{Config, Daemon, intent};

/// Vesper - voice command interpreter for an AI assistant
#[derive(Parser)]
#[command(name = "vesper", version, about)]
struct Cli {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(short, long, env = "VESPER_CONFIG")]
    config: Option<PathBuf>,

    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Extract a clock time from a command, showing the residual text
    ParseTime {
        /// Command text, e.g. "remind me to take medicine at 3 pm"
        text: String,
    },
    /// Show how a command would be classified
    Classify {
        /// Command text
        text: String,
    },
    /// Manage stored reminders
    Reminders {
        #[command(subcommand)]
        action: ReminderAction,
    },
}

#[derive(Subcommand)]
enum ReminderAction {
    /// List all reminders
    List,
    /// Add a reminder
    Add {
        /// Reminder title
        title: String,
        /// Time of day, "HH:MM"
        time: String,
    },
    /// Mark a reminder completed
    Done {
        /// Reminder id
        id: String,
    },
    /// Delete a reminder
    Delete {
        /// Reminder id
        id: String,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let filter = match cli.verbose {
        0 => "warn,vesper_assistant=info",
        1 => "info,vesper_assistant=debug",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("fatal: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Handle subcommands
    if let Some(cmd) = cli.command {
        return match cmd {
            Command::ParseTime { text } => cmd_parse_time(&text),
            Command::Classify { text } => cmd_classify(&text),
            Command::Reminders { action } => {
                let config = load_config(cli.config.as_deref())?;
                cmd_reminders(&config, action)
            }
        };
    }

    let config = load_config(cli.config.as_deref())?;
    tracing::info!(assistant = %config.assistant_name, "starting vesper");

    let daemon = Daemon::new(config)?;
    daemon.run().await?;

    Ok(())
}

/// Load configuration from the given path or the default location
fn load_config(path: Option<&std::path::Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    Ok(config)
}

/// Show the parser's view of a command
fn cmd_parse_time(text: &str) -> anyhow::Result<()> {
    let parsed = time_parse::parse_time(text);

    match parsed.time {
        Some(time) => println!("time:     {time} ({})", time.format_12h()),
        None => println!("time:     (none)"),
    }
    println!("residual: {}", parsed.residual);

    Ok(())
}

/// Show the classifier's view of a command
fn cmd_classify(text: &str) -> anyhow::Result<()> {
    let normalized = text.to_lowercase().trim().to_string();

    match intent::classify(&normalized) {
        Some(intent) => println!("{intent:#?}"),
        None => println!("(no intent; command too short)"),
    }

    Ok(())
}

/// Manage reminders directly against the store
fn cmd_reminders(config: &Config, action: ReminderAction) -> anyhow::Result<()> {
    let pool = db::init(config.db_path())?;
    let repo = ReminderRepo::new(pool);

    match action {
        ReminderAction::List => {
            let all = repo.list()?;
            if all.is_empty() {
                println!("No reminders.");
            }
            for reminder in all {
                let mark = if reminder.completed { "x" } else { " " };
                println!(
                    "[{mark}] {}  {} at {}",
                    reminder.id,
                    reminder.title,
                    reminder.time.format_12h()
                );
            }
        }
        ReminderAction::Add { title, time } => {
            let time: ClockTime = time.parse()?;
            let created = repo.create(&title, time)?;
            println!(
                "Added reminder {} ({} at {})",
                created.id,
                created.title,
                created.time.format_12h()
            );
        }
        ReminderAction::Done { id } => {
            repo.set_completed(&id, true)?;
            println!("Marked {id} done");
        }
        ReminderAction::Delete { id } => {
            repo.delete(&id)?;
            println!("Deleted {id}");
        }
    }

    Ok(())
}
