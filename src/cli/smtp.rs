//! Store-held SMTP settings: show, update, clear.

use crate::cli::{or_placeholder, CliContext};
use crate::core::config::resolve_smtp;
use crate::core::store::RecordStore;
use crate::models::smtp::StoredSmtpSettings;
use anyhow::{bail, Context, Result};
use clap::{Args, Subcommand};
use dialoguer::Password;
use std::io::Read;
use zeroize::Zeroizing;

#[derive(Subcommand, Debug)]
pub enum SmtpCommand {
    /// Show store-held settings and which settings a run would use
    Show,
    /// Update store-held settings; unspecified fields keep their value
    Set(SmtpSetArgs),
    /// Remove store-held settings (the config file section applies again)
    Clear,
}

#[derive(Args, Debug)]
pub struct SmtpSetArgs {
    #[arg(long)]
    pub host: Option<String>,

    #[arg(long)]
    pub port: Option<u16>,

    #[arg(long)]
    pub username: Option<String>,

    /// Sender address for outgoing mail
    #[arg(long)]
    pub from_email: Option<String>,

    /// STARTTLS on submission ports, implicit TLS on 465
    #[arg(long, value_name = "BOOL")]
    pub use_tls: Option<bool>,

    /// Read the password from stdin
    #[arg(long, conflicts_with = "ask_password")]
    pub password_stdin: bool,

    /// Prompt for the password
    #[arg(long)]
    pub ask_password: bool,
}

impl SmtpSetArgs {
    fn is_empty(&self) -> bool {
        self.host.is_none()
            && self.port.is_none()
            && self.username.is_none()
            && self.from_email.is_none()
            && self.use_tls.is_none()
            && !self.password_stdin
            && !self.ask_password
    }
}

pub fn run(ctx: &CliContext, command: SmtpCommand) -> Result<()> {
    match command {
        SmtpCommand::Show => run_show(ctx),
        SmtpCommand::Set(args) => run_set(ctx, args),
        SmtpCommand::Clear => run_clear(ctx),
    }
}

fn run_show(ctx: &CliContext) -> Result<()> {
    let stored = ctx.store().smtp_settings().context("read store SMTP settings")?;

    println!("Store settings ({}):", ctx.paths.store.display());
    match &stored {
        None => println!("  (none)"),
        Some(s) => {
            println!("  host:       {}", or_placeholder(s.host.clone()));
            println!("  port:       {}", or_placeholder(s.port.map(|p| p.to_string())));
            println!("  username:   {}", or_placeholder(s.username.clone()));
            println!("  password:   {}", mask(s.password.as_deref()));
            println!("  use_tls:    {}", or_placeholder(s.use_tls.map(|t| t.to_string())));
            println!("  from_email: {}", or_placeholder(s.from_email.clone()));
            if s.complete().is_none() {
                println!("  (incomplete, ignored)");
            }
        }
    }

    match resolve_smtp(ctx.config.smtp.as_ref(), stored.as_ref()) {
        Ok((settings, source)) => println!(
            "Effective: {}:{} as {} from {} (tls={})",
            settings.host, settings.port, settings.username, source, settings.use_tls
        ),
        Err(e) => println!("Effective: none ({})", e),
    }
    Ok(())
}

fn run_set(ctx: &CliContext, args: SmtpSetArgs) -> Result<()> {
    if args.is_empty() {
        bail!("nothing to set (pass at least one field, see --help)");
    }

    let password = if args.password_stdin || args.ask_password {
        Some(read_password(args.password_stdin)?)
    } else {
        None
    };

    let store = ctx.store();
    let mut settings: StoredSmtpSettings = store
        .smtp_settings()
        .context("read store SMTP settings")?
        .unwrap_or_default();

    if let Some(host) = args.host {
        settings.host = Some(host.trim().to_string());
    }
    if let Some(port) = args.port {
        if port == 0 {
            bail!("port must be between 1 and 65535");
        }
        settings.port = Some(port);
    }
    if let Some(username) = args.username {
        settings.username = Some(username.trim().to_string());
    }
    if let Some(from_email) = args.from_email {
        settings.from_email = Some(from_email.trim().to_string());
    }
    if let Some(use_tls) = args.use_tls {
        settings.use_tls = Some(use_tls);
    }
    if let Some(password) = password {
        settings.password = Some(password.to_string());
    }

    let complete = settings.complete().is_some();
    store
        .save_smtp_settings(settings)
        .context("save store SMTP settings")?;

    if complete {
        println!("SMTP settings saved; they take precedence over the config file.");
    } else {
        println!("SMTP settings saved but incomplete; the config file section still applies.");
    }
    Ok(())
}

fn run_clear(ctx: &CliContext) -> Result<()> {
    let cleared = ctx
        .store()
        .clear_smtp_settings()
        .context("clear store SMTP settings")?;
    if cleared {
        println!("Store SMTP settings removed.");
    } else {
        println!("No store SMTP settings to remove.");
    }
    Ok(())
}

fn read_password(from_stdin: bool) -> Result<Zeroizing<String>> {
    let password = if from_stdin {
        let mut buf = Zeroizing::new(String::new());
        std::io::stdin()
            .read_to_string(&mut buf)
            .context("read password from stdin")?;
        Zeroizing::new(buf.trim_end_matches(['\r', '\n']).to_string())
    } else {
        Zeroizing::new(
            Password::new()
                .with_prompt("SMTP password")
                .allow_empty_password(false)
                .interact()
                .context("read password from prompt")?,
        )
    };
    if password.is_empty() {
        bail!("password must not be empty");
    }
    Ok(password)
}

fn mask(password: Option<&str>) -> &'static str {
    match password {
        Some(p) if !p.is_empty() => "********",
        _ => "-",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    #[test]
    fn test_mask_hides_password() {
        assert_eq!(mask(Some("hunter2")), "********");
        assert_eq!(mask(Some("")), "-");
        assert_eq!(mask(None), "-");
    }

    #[test]
    fn test_parse_set_fields() {
        let cli = Cli::try_parse_from([
            "certmon", "smtp", "set", "--host", "smtp.example.com", "--port", "465",
            "--use-tls", "false", "--password-stdin",
        ])
        .unwrap();
        match cli.command {
            Commands::Smtp {
                command: SmtpCommand::Set(args),
            } => {
                assert_eq!(args.host.as_deref(), Some("smtp.example.com"));
                assert_eq!(args.port, Some(465));
                assert_eq!(args.use_tls, Some(false));
                assert!(args.password_stdin);
                assert!(!args.is_empty());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_password_sources_conflict() {
        let result = Cli::try_parse_from([
            "certmon", "smtp", "set", "--password-stdin", "--ask-password",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_set_without_fields_is_empty() {
        let cli = Cli::try_parse_from(["certmon", "smtp", "set"]).unwrap();
        match cli.command {
            Commands::Smtp {
                command: SmtpCommand::Set(args),
            } => assert!(args.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
    }
}
