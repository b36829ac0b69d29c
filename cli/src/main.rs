//! `sshalert` — record and inspect SSH login attempts.

use std::io::Write;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ssh_alert_core::{FieldMap, FieldValue, RequiredFields};
use ssh_alert_store::{Store, StoreError};

use crate::config::AppConfig;
use crate::logbook::Logbook;
use crate::runtime::{DEFAULT_PROBE_TIMEOUT, RuntimeStatus, probe_container_runtime};

mod config;
mod logbook;
mod runtime;

#[derive(Debug, Parser)]
#[command(name = "sshalert")]
#[command(about = "Record and inspect SSH login attempts")]
struct Cli {
    /// Path to the TOML configuration file (created when absent).
    #[arg(long, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Record one login attempt.
    Record(RecordArgs),
    /// List recorded attempts, optionally filtered.
    List(FilterArgs),
    /// Delete attempts matching the given filters.
    Delete(FilterArgs),
    /// Drop and recreate the database table, destroying all data.
    Reset(ResetArgs),
    /// Show database path, schema state, and row count.
    Status,
    /// Check whether the container runtime is reachable.
    Doctor,
}

#[derive(Debug, Args)]
struct RecordArgs {
    /// Source address of the attempt.
    #[arg(long)]
    ip: String,
    /// Attempted username.
    #[arg(long)]
    username: Option<String>,
    /// Attempted password.
    #[arg(long)]
    password: String,
    /// Client/protocol version string.
    #[arg(long)]
    version: String,
    /// Opaque session token.
    #[arg(long)]
    session_id: String,
    /// Geolocation label.
    #[arg(long)]
    location: String,
    /// Attempt count.
    #[arg(long, default_value_t = 1)]
    count: i64,
    /// Date of the attempt, YYYY-MM-DD (defaults to today).
    #[arg(long)]
    date: Option<String>,
    /// Time of the attempt, HH:MM:SS (defaults to now).
    #[arg(long)]
    time: Option<String>,
}

/// Equality filters shared by `list` and `delete`.
#[derive(Debug, Args)]
struct FilterArgs {
    /// Filter by source address.
    #[arg(long)]
    ip: Option<String>,
    /// Filter by attempted username.
    #[arg(long)]
    username: Option<String>,
    /// Filter by attempted password.
    #[arg(long)]
    password: Option<String>,
    /// Filter by client version string.
    #[arg(long)]
    version: Option<String>,
    /// Filter by session token.
    #[arg(long)]
    session_id: Option<String>,
    /// Filter by geolocation label.
    #[arg(long)]
    location: Option<String>,
    /// Filter by date (YYYY-MM-DD).
    #[arg(long)]
    date: Option<String>,
    /// Filter by time (HH:MM:SS).
    #[arg(long)]
    time: Option<String>,
    /// Filter by attempt count.
    #[arg(long)]
    count: Option<i64>,
    /// Filter by store-assigned record number.
    #[arg(long)]
    number: Option<i64>,
}

impl FilterArgs {
    fn into_conditions(self) -> FieldMap {
        let mut conditions = FieldMap::new();
        let text_filters = [
            ("ip", self.ip),
            ("username", self.username),
            ("password", self.password),
            ("version", self.version),
            ("session_id", self.session_id),
            ("location", self.location),
            ("date", self.date),
            ("time", self.time),
        ];
        for (name, value) in text_filters {
            if let Some(value) = value {
                conditions.insert(name.to_string(), FieldValue::Text(value));
            }
        }
        if let Some(count) = self.count {
            conditions.insert("count".to_string(), FieldValue::Integer(count));
        }
        if let Some(number) = self.number {
            conditions.insert("number".to_string(), FieldValue::Integer(number));
        }
        conditions
    }
}

#[derive(Debug, Args)]
struct ResetArgs {
    /// Skip the confirmation prompt.
    #[arg(long)]
    yes: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    let logbook =
        Logbook::with_file("Log.txt").debug_enabled(std::env::var_os("SSHALERT_DEBUG").is_some());

    let config = match AppConfig::load_or_init(&cli.config) {
        Ok(config) => config,
        Err(err) => {
            logbook.error(&format!("failed to load configuration: {err}"));
            std::process::exit(1);
        }
    };
    logbook.debug(&format!("configuration loaded from {}", cli.config.display()));
    logbook.debug(&format!(
        "auto update {} ({} update server(s) configured)",
        if config.setting.auto_update { "on" } else { "off" },
        config.setting.update_address.len()
    ));

    let result = match cli.command {
        Command::Record(args) => run_record(&config, &logbook, args),
        Command::List(args) => run_list(&config, args),
        Command::Delete(args) => run_delete(&config, &logbook, args),
        Command::Reset(args) => run_reset(&config, &logbook, args),
        Command::Status => run_status(&config, &logbook),
        Command::Doctor => run_doctor(&logbook),
    };

    if let Err(err) = result {
        logbook.error(&err);
        std::process::exit(1);
    }
}

/// Maps a store failure to an operator-facing message, pointing schema
/// mismatches at the reset flow instead of halting silently.
fn describe(err: StoreError) -> String {
    match err {
        StoreError::SchemaMismatch { .. } => {
            format!("{err}\nRun `sshalert reset` to recreate the table.")
        }
        other => other.to_string(),
    }
}

fn run_record(config: &AppConfig, logbook: &Logbook, args: RecordArgs) -> Result<(), String> {
    let store = Store::with_validator(
        &config.database.path,
        Box::new(RequiredFields::standard()),
    );

    let now = chrono::Local::now();
    let date = args.date.unwrap_or_else(|| now.format("%Y-%m-%d").to_string());
    let time = args.time.unwrap_or_else(|| now.format("%H:%M:%S").to_string());

    let mut fields = FieldMap::new();
    fields.insert("ip".to_string(), FieldValue::Text(args.ip));
    fields.insert("password".to_string(), FieldValue::Text(args.password));
    fields.insert("version".to_string(), FieldValue::Text(args.version));
    fields.insert("session_id".to_string(), FieldValue::Text(args.session_id));
    fields.insert("location".to_string(), FieldValue::Text(args.location));
    fields.insert("date".to_string(), FieldValue::Text(date));
    fields.insert("time".to_string(), FieldValue::Text(time));
    fields.insert("count".to_string(), FieldValue::Integer(args.count));
    if let Some(username) = args.username {
        fields.insert("username".to_string(), FieldValue::Text(username));
    }

    let number = store.insert(&fields).map_err(describe)?;
    logbook.info(&format!("recorded attempt #{number}"));
    Ok(())
}

fn run_list(config: &AppConfig, args: FilterArgs) -> Result<(), String> {
    let store = Store::open(&config.database.path);
    let records = store.get(&args.into_conditions()).map_err(describe)?;
    let json = serde_json::to_string_pretty(&records)
        .map_err(|err| format!("failed to serialize records: {err}"))?;
    println!("{json}");
    Ok(())
}

fn run_delete(config: &AppConfig, logbook: &Logbook, args: FilterArgs) -> Result<(), String> {
    let conditions = args.into_conditions();
    if conditions.is_empty() {
        return Err(
            "refusing to delete everything: supply at least one filter, or use `sshalert reset`"
                .to_string(),
        );
    }

    let store = Store::open(&config.database.path);
    let removed = store.delete(&conditions).map_err(describe)?;
    logbook.info(&format!("deleted {removed} record(s)"));
    Ok(())
}

fn run_reset(config: &AppConfig, logbook: &Logbook, args: ResetArgs) -> Result<(), String> {
    if !args.yes {
        logbook.warning("Resetting the database destroys every recorded attempt.");
        logbook.info("Type Y to reset the database, anything else to abort.");
        print!("[Y/N]> ");
        std::io::stdout()
            .flush()
            .map_err(|err| format!("failed to flush prompt: {err}"))?;

        let mut input = String::new();
        std::io::stdin()
            .read_line(&mut input)
            .map_err(|err| format!("failed to read confirmation: {err}"))?;
        if !input.trim().eq_ignore_ascii_case("y") {
            return Err("reset aborted".to_string());
        }
    }

    logbook.info("Resetting database...");
    let store = Store::open(&config.database.path);
    store.reconcile(true).map_err(describe)?;
    logbook.info("Database reset complete.");
    Ok(())
}

fn run_status(config: &AppConfig, logbook: &Logbook) -> Result<(), String> {
    println!(
        "server:   {} (port {})",
        config.server.server_name, config.server.port
    );
    let timezone = config
        .get("Time", "TimeZone")
        .and_then(|value| value.as_str())
        .unwrap_or("unknown");
    println!("timezone: {timezone}");

    let path = &config.database.path;
    println!("database: {path}");

    let store = Store::open(path);
    match store.reconcile(false) {
        Ok(()) => {
            let count = store.count().map_err(describe)?;
            println!("schema:   ok");
            println!("records:  {count}");
        }
        Err(StoreError::SchemaMismatch { table }) => {
            logbook.warning(&format!(
                "table '{table}' does not match the expected schema"
            ));
            println!("schema:   MISMATCH (run `sshalert reset` to recreate)");
        }
        Err(err) => return Err(describe(err)),
    }
    Ok(())
}

fn run_doctor(logbook: &Logbook) -> Result<(), String> {
    match probe_container_runtime(DEFAULT_PROBE_TIMEOUT) {
        RuntimeStatus::Running { version } => {
            logbook.info(&format!("container runtime is running (server {version})"));
            Ok(())
        }
        RuntimeStatus::Unavailable { reason } => {
            Err(format!("container runtime is unavailable: {reason}"))
        }
    }
}
