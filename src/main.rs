mod calc;
mod cmd;
mod data;
mod ui;

use chrono::Local;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "attendance", about = "staff attendance: clock in, clock out, monthly totals")]
struct Cli {
    /// Path to the data directory containing config and record files (default: ./data)
    #[arg(long, default_value = "./data")]
    data_dir: PathBuf,

    /// Staff id to act as (default: `default_employee` from config.yaml)
    #[arg(short, long, global = true)]
    employee: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize data files with defaults and sample records
    Init,
    /// Record a check-in for today
    CheckIn {
        /// Time as HH:MM instead of now; overwrites an existing check-in
        #[arg(long)]
        at: Option<String>,
    },
    /// Record a check-out, closing yesterday's shift if it is still open
    CheckOut {
        /// Time as HH:MM instead of now; overwrites an existing check-out
        #[arg(long)]
        at: Option<String>,
    },
    /// Set the break minutes for a day
    Break {
        minutes: i64,
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Mark a day as a day off
    Off {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Remove the record for a day
    Clear {
        /// Day as YYYY-MM-DD (default: today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show today's status
    Status,
    /// Show one month's records and totals
    Month {
        /// Month as YYYY-MM (default: current month)
        yyyy_mm: Option<String>,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Day-by-day report with overtime and early leave
    Report {
        /// Month as YYYY-MM (default: current month)
        yyyy_mm: Option<String>,
    },
    /// Status of every staff member on one day
    Team {
        /// Day as YYYY-MM-DD (default: today)
        date: Option<String>,
    },
    /// Month totals for every staff member
    Roster {
        /// Month as YYYY-MM (default: current month)
        yyyy_mm: Option<String>,
    },
    /// Write all records as a JSON array
    Export {
        /// Output file (default: stdout)
        #[arg(short, long)]
        out: Option<PathBuf>,
    },
    /// Replace all records with a JSON array from a file
    Import { file: PathBuf },
}

/// Log level comes from `ATTENDANCE_LOG` (e.g. `debug`); logs go to stderr.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("ATTENDANCE_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let data_dir = if cli.data_dir.is_absolute() {
        cli.data_dir.clone()
    } else {
        std::env::current_dir()?.join(&cli.data_dir)
    };
    data::persistence::set_data_dir(data_dir.clone());

    // Auto-init when the data directory is missing or empty and the user did not
    // explicitly invoke the `init` subcommand.
    let is_init_command = matches!(cli.command, Some(Commands::Init));
    if !is_init_command && dir_needs_init(&data_dir) {
        eprintln!(
            "Data directory '{}' is missing or empty, running init...",
            data_dir.display()
        );
        cmd::init::run()?;
    }

    let settings = data::AppSettings::load()?;
    let employee = cli
        .employee
        .clone()
        .unwrap_or_else(|| settings.default_employee.clone());
    let today = Local::now().date_naive();

    match cli.command {
        None => cmd::root::run(&employee, settings),
        Some(Commands::Init) => cmd::init::run(),
        Some(Commands::CheckIn { at }) => cmd::punch::check_in(&employee, at.as_deref()),
        Some(Commands::CheckOut { at }) => cmd::punch::check_out(&employee, at.as_deref()),
        Some(Commands::Break { minutes, date }) => {
            let date = cmd::resolve_date(date.as_deref(), today)?;
            cmd::punch::set_break(&employee, date, minutes)
        }
        Some(Commands::Off { date }) => {
            cmd::punch::day_off(&employee, cmd::resolve_date(date.as_deref(), today)?)
        }
        Some(Commands::Clear { date }) => {
            cmd::punch::clear(&employee, cmd::resolve_date(date.as_deref(), today)?)
        }
        Some(Commands::Status) => cmd::status::run(&employee),
        Some(Commands::Month { yyyy_mm, json }) => {
            let month = cmd::resolve_month(yyyy_mm.as_deref(), today)?;
            cmd::month::run(&employee, &month, json, &settings)
        }
        Some(Commands::Report { yyyy_mm }) => {
            let month = cmd::resolve_month(yyyy_mm.as_deref(), today)?;
            cmd::report::run(&employee, &month, &settings)
        }
        Some(Commands::Team { date }) => {
            cmd::team::run_day(cmd::resolve_date(date.as_deref(), today)?)
        }
        Some(Commands::Roster { yyyy_mm }) => {
            cmd::team::run_roster(&cmd::resolve_month(yyyy_mm.as_deref(), today)?)
        }
        Some(Commands::Export { out }) => cmd::records::export(out.as_deref()),
        Some(Commands::Import { file }) => cmd::records::import(&file),
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

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_dir_needs_init_nonexistent() {
        let tmp = TempDir::new().unwrap();
        let missing = tmp.path().join("does_not_exist");
        assert!(dir_needs_init(&missing));
    }

    #[test]
    fn test_dir_needs_init_empty_dir() {
        let tmp = TempDir::new().unwrap();
        assert!(dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_dir_needs_init_nonempty_dir() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("file.txt"), "data").unwrap();
        assert!(!dir_needs_init(tmp.path()));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_parses_check_in_with_time_and_employee() {
        let cli = Cli::parse_from(["attendance", "check-in", "--at", "08:55", "-e", "s-1"]);
        assert_eq!(cli.employee.as_deref(), Some("s-1"));
        assert!(matches!(cli.command, Some(Commands::CheckIn { at: Some(ref t) }) if t == "08:55"));
    }

    #[test]
    fn test_cli_parses_month_json() {
        let cli = Cli::parse_from(["attendance", "month", "2025-01", "--json"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Month { yyyy_mm: Some(ref m), json: true }) if m == "2025-01"
        ));
    }
}
