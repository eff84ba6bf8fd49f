//! Reminder runs, their dry-run preview, and SMTP test mails.

use crate::cli::{parse_date_arg, parse_format, today_or, CliContext, OutputFormat};
use crate::constants;
use crate::core::config::resolve_smtp;
use crate::core::file_lock::FileLock;
use crate::core::mailer::{self, SmtpMailer};
use crate::core::reminder::{self, DueStatus};
use crate::core::store::RecordStore;
use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};
use serde::Serialize;

#[derive(Args, Debug)]
pub struct DueArgs {
    /// Evaluate as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,

    /// Output format: table|json
    #[arg(long, default_value = "table", value_parser = parse_format)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct SendRemindersArgs {
    /// Run as of this date instead of today (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", value_parser = parse_date_arg)]
    pub today: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct SendTestArgs {
    /// Recipient address
    #[arg(long)]
    pub to: String,

    /// Subject line
    #[arg(long, default_value = "certmon test message")]
    pub subject: String,

    /// Message body
    #[arg(long, default_value = "This is a test message from certmon.")]
    pub body: String,
}

#[derive(Serialize)]
struct DueItem {
    id: i64,
    name: String,
    email: String,
    expires_on: String,
    days_left: i64,
    action: &'static str,
}

pub fn run_due(ctx: &CliContext, args: DueArgs) -> Result<()> {
    let today = today_or(args.today);
    let store = ctx.store();
    let preview = reminder::preview(&ctx.config, &store, today).context("query due records")?;

    let items: Vec<DueItem> = preview
        .into_iter()
        .map(|(record, status)| DueItem {
            id: record.id,
            days_left: crate::core::calendar::days_until(record.expires_on, today),
            expires_on: record.expires_on.format(constants::DATE_FORMAT).to_string(),
            name: record.name,
            email: record.notify_email,
            action: match status {
                DueStatus::Pending { .. } => "send",
                DueStatus::SentToday => "skip (sent today)",
                DueStatus::Expired => "skip (expired)",
                DueStatus::Permanent => "skip (permanent)",
            },
        })
        .collect();

    if args.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&items).context("serialize due list")?;
        println!("{}", json);
        return Ok(());
    }

    let window = ctx.config.app.reminder_window_days;
    if items.is_empty() {
        println!(
            "Nothing due between {} and {} ({} day window).",
            today.format(constants::DATE_FORMAT),
            crate::core::calendar::window_end(today, window).format(constants::DATE_FORMAT),
            window
        );
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Email").add_attribute(Attribute::Bold),
        Cell::new("Expires").add_attribute(Attribute::Bold),
        Cell::new("Days left").add_attribute(Attribute::Bold),
        Cell::new("Action").add_attribute(Attribute::Bold),
    ]);
    for item in &items {
        table.add_row(vec![
            item.id.to_string(),
            item.name.clone(),
            item.email.clone(),
            item.expires_on.clone(),
            item.days_left.to_string(),
            item.action.to_string(),
        ]);
    }
    println!("{}", table);
    let pending = items.iter().filter(|i| i.action == "send").count();
    println!("\n{} due, {} would be sent.", items.len(), pending);
    Ok(())
}

pub fn run_send_reminders(ctx: &CliContext, args: SendRemindersArgs) -> Result<()> {
    let today = today_or(args.today);
    let store = ctx.store();
    if !store.exists() {
        bail!(
            "store not found at {} (run `certmon init` first)",
            store.path().display()
        );
    }

    // Overlapping runs could both pass the sent-today check and double-send.
    let Some(_run_lock) = FileLock::try_exclusive(&ctx.paths.run_lock)? else {
        bail!(
            "another reminder run holds {}; refusing to start a second one",
            ctx.paths.run_lock.display()
        );
    };

    tracing::info!(%today, window_days = ctx.config.app.reminder_window_days, "starting reminder run");
    let count = reminder::send_due_reminders(&ctx.config, &store, &SmtpMailer, today)
        .context("send reminders")?;
    tracing::info!(count, "reminder run finished");

    println!("Sent {} reminder(s).", count);
    Ok(())
}

pub fn run_send_test(ctx: &CliContext, args: SendTestArgs) -> Result<()> {
    let stored = ctx.store().smtp_settings().context("read store SMTP settings")?;
    let (settings, source) = resolve_smtp(ctx.config.smtp.as_ref(), stored.as_ref())?;
    println!(
        "Using SMTP {}:{} from {}",
        settings.host, settings.port, source
    );

    match mailer::send_one(&SmtpMailer, &settings, &args.to, &args.subject, &args.body) {
        Ok(()) => {
            println!("Test message sent to {}", args.to);
            Ok(())
        }
        Err(e) => {
            eprintln!("Test message failed: {}", e);
            std::process::exit(2);
        }
    }
}
