mod calc;
mod cmd;
mod data;
mod ui;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "semainier", about = "weekly planner companion")]
struct Cli {
    /// Path to the data directory containing config and the backend's week export (default: ./config)
    #[arg(long, default_value = "./config")]
    data_dir: PathBuf,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the config file with defaults
    Init,
    /// Print the current week's bounds, title and day states
    Week {
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the due date closing the current week
    DueDate {
        /// Use the end of next week instead
        #[arg(long)]
        next: bool,
        /// Reference date (YYYY-MM-DD, default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Print the exported record for a day
    Day {
        /// Date to look up (YYYY-MM-DD)
        date: String,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    // Resolve data_dir to an absolute path so file I/O works regardless of
    // future directory changes within the process.
    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did
    // not explicitly invoke the `init` subcommand.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    if !is_init_command && dir_needs_init(&data_dir) {
        eprintln!(
            "Data directory '{}' is missing or empty — running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    match cli.command {
        None => cmd::root::run(),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::Week { date }) => cmd::week::run(parse_date_arg(date.as_deref())?),
        Some(Commands::DueDate { next, date }) => {
            cmd::due_date::run(next, parse_date_arg(date.as_deref())?)
        }
        Some(Commands::Day { date }) => cmd::day::run(&date),
    }
}

fn parse_date_arg(arg: Option<&str>) -> Result<Option<NaiveDate>> {
    match arg {
        Some(raw) => {
            let date = NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .with_context(|| format!("invalid date '{raw}', expected YYYY-MM-DD"))?;
            Ok(Some(date))
        }
        None => Ok(None),
    }
}

/// Returns true when `dir` does not exist or exists but contains no files.
fn dir_needs_init(dir: &std::path::Path) -> bool {
    if !dir.exists() {
        return true;
    }
    dir.read_dir()
        .map(|mut entries| entries.next().is_none())
        .unwrap_or(false)
}
