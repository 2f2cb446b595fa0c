//! Command-line probe for the dining menu cache.
//!
//! # Responsibility
//! - Exercise `dining_core` against a real database file from a shell.
//! - Print results as JSON so they can be diffed or piped.

use clap::{Parser, Subcommand};
use dining_core::db::open_db;
use dining_core::{
    init_logging, CacheConfig, DiningHallType, ItemType, MenuEntry, MenuRepository, MenuService,
    SqliteMenuRepository,
};
use log::error;
use serde::Serialize;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "dining_cli", version, about = "Inspect and refresh the dining menu cache")]
struct Cli {
    /// Database file; overrides DINING_CACHE_DB_PATH.
    #[arg(long)]
    db: Option<PathBuf>,
    /// trace|debug|info|warn|error; overrides DINING_CACHE_LOG_LEVEL.
    #[arg(long)]
    log_level: Option<String>,
    /// Absolute directory for rolling log files; overrides
    /// DINING_CACHE_LOG_DIR. Logging is off when neither is set.
    #[arg(long)]
    log_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert the known dining halls that are missing.
    Seed,
    /// List stored dining halls.
    Halls,
    /// Show per-hall availability for the day containing DATE_MS.
    Status { date_ms: i64 },
    /// Show one meal of one hall.
    Meal {
        #[arg(value_parser = parse_hall)]
        hall: DiningHallType,
        #[arg(value_parser = parse_item_type)]
        item_type: ItemType,
        date_ms: i64,
    },
    /// Replace a day's menu with the JSON entries in FILE.
    Refresh { date_ms: i64, file: PathBuf },
    /// Drop one day's menu, or every menu when DATE_MS is omitted.
    Drop { date_ms: Option<i64> },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = CacheConfig::from_env().with_overrides(
        cli.db.clone(),
        cli.log_level.clone(),
        cli.log_dir.clone(),
    );

    if let Some(log_dir) = config.log_dir.as_ref() {
        let log_dir = log_dir.to_string_lossy();
        if let Err(err) = init_logging(&config.log_level, &log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&config, cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            error!("event=cli_command module=cli status=error error={message}");
            eprintln!("{message}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &CacheConfig, command: Command) -> Result<(), String> {
    let mut conn = open_db(&config.db_path)
        .map_err(|err| format!("failed to open `{}`: {err}", config.db_path.display()))?;
    let repo = SqliteMenuRepository::try_new(&mut conn).map_err(|err| err.to_string())?;
    let mut service = MenuService::new(repo);

    match command {
        Command::Seed => print_json(&service.seed_known_halls().map_err(|err| err.to_string())?),
        Command::Halls => {
            let halls = service
                .repository()
                .list_dining_halls()
                .map_err(|err| err.to_string())?;
            print_json(&halls)
        }
        Command::Status { date_ms } => {
            print_json(&service.day_availability(date_ms).map_err(|err| err.to_string())?)
        }
        Command::Meal {
            hall,
            item_type,
            date_ms,
        } => print_json(
            &service
                .meal(hall, item_type, date_ms)
                .map_err(|err| err.to_string())?,
        ),
        Command::Refresh { date_ms, file } => {
            let raw = std::fs::read_to_string(&file)
                .map_err(|err| format!("failed to read `{}`: {err}", file.display()))?;
            let entries: Vec<MenuEntry> = serde_json::from_str(&raw)
                .map_err(|err| format!("invalid menu entries in `{}`: {err}", file.display()))?;
            print_json(
                &service
                    .refresh_day(date_ms, entries)
                    .map_err(|err| err.to_string())?,
            )
        }
        Command::Drop { date_ms } => {
            let removed = match date_ms {
                Some(date_ms) => service.drop_day(date_ms),
                None => service.clear(),
            }
            .map_err(|err| err.to_string())?;
            print_json(&removed)
        }
    }
}

fn print_json(value: &impl Serialize) -> Result<(), String> {
    let text = serde_json::to_string_pretty(value).map_err(|err| err.to_string())?;
    println!("{text}");
    Ok(())
}

fn parse_hall(value: &str) -> Result<DiningHallType, String> {
    DiningHallType::from_slug(value)
        .ok_or_else(|| format!("unknown hall `{value}`; expected evk|parkside|village"))
}

fn parse_item_type(value: &str) -> Result<ItemType, String> {
    ItemType::from_code(&value.trim().to_ascii_lowercase())
        .ok_or_else(|| format!("unknown meal `{value}`; expected breakfast|lunch|dinner|brunch"))
}
