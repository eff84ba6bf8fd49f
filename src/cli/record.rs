use crate::cli::{or_placeholder, parse_format, CliContext, OutputFormat};
use crate::constants;
use crate::core::store::RecordStore;
use crate::core::validate::{self, RecordInput};
use crate::models::record::CredentialRecord;
use anyhow::{Context, Result};
use clap::Args;
use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Table};

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name of the credential
    #[arg(long)]
    pub name: String,

    /// Address that receives reminders
    #[arg(long)]
    pub email: String,

    /// Date the credential was obtained (YYYY-MM-DD)
    #[arg(long, value_name = "DATE", conflicts_with = "expires")]
    pub acquired: Option<String>,

    /// Validity in months, or "permanent" for a credential that never expires
    #[arg(long, value_name = "N|permanent", conflicts_with = "expires")]
    pub months: Option<String>,

    /// Legacy mode: give the expiry date directly (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub expires: Option<String>,

    /// Free-text notes included in reminders
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Output format: table|json
    #[arg(long, default_value = "table", value_parser = parse_format)]
    pub format: OutputFormat,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Record id
    pub id: i64,
}

pub fn run_add(ctx: &CliContext, args: AddArgs) -> Result<()> {
    let input = RecordInput {
        name: args.name,
        email: args.email,
        acquired: args.acquired,
        months: args.months,
        expires: args.expires,
        notes: args.notes,
    };
    let record = validate::new_record(&input)?;

    let store = ctx.store();
    let id = store.add_record(&record).context("add record")?;

    if record.is_permanent() {
        println!("Added id={} (never expires)", id);
    } else {
        println!(
            "Added id={}, expires on {}",
            id,
            record.expires_on.format(constants::DATE_FORMAT)
        );
    }
    Ok(())
}

pub fn run_list(ctx: &CliContext, args: ListArgs) -> Result<()> {
    let records = ctx.store().list_records().context("list records")?;

    if args.format == OutputFormat::Json {
        let json = serde_json::to_string_pretty(&records).context("serialize list")?;
        println!("{}", json);
        return Ok(());
    }

    if records.is_empty() {
        println!("No records found");
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        Cell::new("ID").add_attribute(Attribute::Bold),
        Cell::new("Name").add_attribute(Attribute::Bold),
        Cell::new("Email").add_attribute(Attribute::Bold),
        Cell::new("Acquired").add_attribute(Attribute::Bold),
        Cell::new("Months").add_attribute(Attribute::Bold),
        Cell::new("Expires").add_attribute(Attribute::Bold),
        Cell::new("Last reminded").add_attribute(Attribute::Bold),
    ]);

    for record in &records {
        table.add_row(vec![
            record.id.to_string(),
            record.name.clone(),
            record.notify_email.clone(),
            record.acquired_on.format(constants::DATE_FORMAT).to_string(),
            months_label(record),
            expiry_label(record),
            or_placeholder(
                record
                    .last_reminded_on
                    .map(|d| d.format(constants::DATE_FORMAT).to_string()),
            ),
        ]);
    }

    println!("{}", table);
    println!("\n{} records.", records.len());
    Ok(())
}

pub fn run_remove(ctx: &CliContext, args: RemoveArgs) -> Result<()> {
    let removed = ctx.store().remove_record(args.id).context("remove record")?;
    if !removed {
        println!("No record with id {}", args.id);
        std::process::exit(1);
    }
    println!("Removed id={}", args.id);
    Ok(())
}

pub(crate) fn months_label(record: &CredentialRecord) -> String {
    match record.valid_months {
        m if m < 0 => constants::PERMANENT_KEYWORD.to_string(),
        constants::FIXED_EXPIRY_MONTHS => constants::EMPTY_PLACEHOLDER.to_string(),
        m => m.to_string(),
    }
}

pub(crate) fn expiry_label(record: &CredentialRecord) -> String {
    if record.is_permanent() {
        return "never".to_string();
    }
    record.expires_on.format(constants::DATE_FORMAT).to_string()
}
