use crate::cli::CliContext;
use anyhow::{Context, Result};
use clap::Args;

#[derive(Args, Debug)]
pub struct InitArgs {}

pub fn run(ctx: &CliContext, _args: InitArgs) -> Result<()> {
    let store = ctx.store();
    let created = store.initialize().context("initialize record store")?;
    if created {
        println!("store initialized at {}", store.path().display());
    } else {
        println!("store already exists at {}", store.path().display());
    }
    if !ctx.paths.config.exists() {
        println!(
            "no config file at {} (defaults in use; SMTP must be set with `certmon smtp set`)",
            ctx.paths.config.display()
        );
    }
    Ok(())
}
