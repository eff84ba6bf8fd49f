//! CLI routing and command dispatch.

use crate::constants;
use crate::core::config as config_loader;
use crate::core::paths::CertmonPaths;
use crate::core::store::FileStore;
use crate::core::validate;
use crate::models::config::Config;
use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod doctor;
pub mod init;
pub mod record;
pub mod remind;
pub mod smtp;

/// Shared context passed to all command handlers.
pub struct CliContext {
    pub paths: CertmonPaths,
    pub config: Config,
    /// Set when the config file exists but could not be loaded.
    pub config_load_warning: Option<String>,
}

impl CliContext {
    pub fn store(&self) -> FileStore {
        FileStore::open(&self.paths.store)
    }
}

#[derive(Parser, Debug)]
#[command(name = "certmon", version, about = "Track expiring certificates and licenses and email owners before expiry")]
pub struct Cli {
    /// Config file
    #[arg(short = 'c', long, global = true, value_name = "PATH", env = constants::CONFIG_ENV)]
    pub config: Option<PathBuf>,

    /// Change to this directory before doing anything else
    #[arg(short = 'C', long, global = true, value_name = "DIR")]
    pub chdir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    pub fn run(self) -> Result<()> {
        if let Some(dir) = &self.chdir {
            std::env::set_current_dir(dir)
                .with_context(|| format!("change directory to {}", dir.display()))?;
        }

        let config_path = self
            .config
            .clone()
            .unwrap_or_else(|| PathBuf::from(constants::DEFAULT_CONFIG_PATH));

        // Doctor reports a broken config instead of failing on it.
        let mut config_load_warning: Option<String> = None;
        let config = match config_loader::load_or_default(&config_path) {
            Ok(config) => config,
            Err(e) if matches!(self.command, Commands::Doctor(_)) => {
                config_load_warning = Some(e.to_string());
                Config::default()
            }
            Err(e) => return Err(e).context("load configuration"),
        };

        let paths = CertmonPaths::resolve(Some(config_path), &config.app.store_path);
        tracing::debug!(%paths, command = self.command.name(), "resolved paths");

        let ctx = CliContext {
            paths,
            config,
            config_load_warning,
        };

        match self.command {
            Commands::Init(args) => init::run(&ctx, args),
            Commands::Add(args) => record::run_add(&ctx, args),
            Commands::List(args) => record::run_list(&ctx, args),
            Commands::Remove(args) => record::run_remove(&ctx, args),
            Commands::Due(args) => remind::run_due(&ctx, args),
            Commands::SendReminders(args) => remind::run_send_reminders(&ctx, args),
            Commands::SendTest(args) => remind::run_send_test(&ctx, args),
            Commands::Smtp { command } => smtp::run(&ctx, command),
            Commands::Doctor(args) => doctor::run(&ctx, args),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the record store
    Init(init::InitArgs),
    /// Add a credential record
    Add(record::AddArgs),
    /// List credential records
    List(record::ListArgs),
    /// Remove a credential record by id
    Remove(record::RemoveArgs),
    /// Preview which records are due for a reminder (sends nothing)
    Due(remind::DueArgs),
    /// Email reminders for records expiring soon
    SendReminders(remind::SendRemindersArgs),
    /// Send a test email to check SMTP settings
    SendTest(remind::SendTestArgs),
    /// Manage SMTP settings kept in the store
    Smtp {
        #[command(subcommand)]
        command: smtp::SmtpCommand,
    },
    /// Diagnose configuration and store (safe, read-only)
    Doctor(doctor::DoctorArgs),
}

impl Commands {
    /// Command name for logs and error messages.
    pub fn name(&self) -> &str {
        match self {
            Commands::Init(_) => "init",
            Commands::Add(_) => "add",
            Commands::List(_) => "list",
            Commands::Remove(_) => "remove",
            Commands::Due(_) => "due",
            Commands::SendReminders(_) => "send-reminders",
            Commands::SendTest(_) => "send-test",
            Commands::Smtp { .. } => "smtp",
            Commands::Doctor(_) => "doctor",
        }
    }
}

/// clap value parser for `YYYY-MM-DD` dates.
pub(crate) fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    validate::parse_date(s).map_err(|e| e.to_string())
}

/// clap value parser for `table|json`.
pub(crate) fn parse_format(s: &str) -> Result<OutputFormat, String> {
    match s {
        "table" => Ok(OutputFormat::Table),
        "json" => Ok(OutputFormat::Json),
        other => Err(format!("invalid format: {} (use table|json)", other)),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Json,
}

/// The explicit `--today` override, or the local calendar date.
pub(crate) fn today_or(explicit: Option<NaiveDate>) -> NaiveDate {
    explicit.unwrap_or_else(|| Local::now().date_naive())
}

/// Render an optional value, falling back to the placeholder.
pub(crate) fn or_placeholder(value: Option<String>) -> String {
    value.unwrap_or_else(|| constants::EMPTY_PLACEHOLDER.to_string())
}
