//! Diagnostics for configuration, store, and mail readiness.

use crate::cli::CliContext;
use crate::constants;
use crate::core::config::resolve_smtp;
use crate::core::file_lock::FileLock;
use crate::core::store::RecordStore;
use crate::util::fs::mode_of;
use anyhow::Result;
use clap::Args;

#[derive(Args, Debug)]
pub struct DoctorArgs {}

#[derive(Default)]
struct Tally {
    ok: u32,
    warn: u32,
    fail: u32,
}

impl Tally {
    fn pass(&mut self, msg: impl AsRef<str>) {
        println!("  [PASS] {}", msg.as_ref());
        self.ok += 1;
    }

    fn warn(&mut self, msg: impl AsRef<str>) {
        println!("  [WARN] {}", msg.as_ref());
        self.warn += 1;
    }

    fn fail(&mut self, msg: impl AsRef<str>) {
        println!("  [FAIL] {}", msg.as_ref());
        self.fail += 1;
    }
}

pub fn run(ctx: &CliContext, _args: DoctorArgs) -> Result<()> {
    let paths = &ctx.paths;
    let mut t = Tally::default();

    println!("Doctor: {}", paths);

    // Config file
    if let Some(w) = &ctx.config_load_warning {
        t.fail(format!("config unusable: {}", w));
    } else if paths.config.is_file() {
        t.pass(format!("config loaded: {}", paths.config.display()));
    } else {
        t.warn(format!(
            "config missing: {} (defaults in use)",
            paths.config.display()
        ));
    }

    if ctx.config.app.reminder_window_days == 0 {
        t.warn("reminder_window_days is 0 (only records expiring today are due)");
    } else {
        t.pass(format!(
            "reminder window: {} days",
            ctx.config.app.reminder_window_days
        ));
    }

    // Store document
    let store = ctx.store();
    let mut stored_smtp = None;
    if store.exists() {
        t.pass(format!("store exists: {}", paths.store.display()));
        match store.list_records() {
            Ok(records) => t.pass(format!("store readable ({} records)", records.len())),
            Err(e) => t.fail(format!("store unreadable: {}", e)),
        }
        match store.smtp_settings() {
            Ok(s) => stored_smtp = s,
            Err(e) => t.fail(format!("store SMTP settings unreadable: {}", e)),
        }
        if let Some(mode) = mode_of(&paths.store) {
            if mode == constants::STORE_FILE_MODE {
                t.pass(format!("store mode ok: {:04o}", mode));
            } else {
                t.warn(format!(
                    "store mode: {:04o} (expected {:04o}; it may hold an SMTP password)",
                    mode,
                    constants::STORE_FILE_MODE
                ));
            }
        }
    } else {
        t.fail(format!(
            "store missing: {} (run: certmon init)",
            paths.store.display()
        ));
    }

    // Mail settings
    match resolve_smtp(ctx.config.smtp.as_ref(), stored_smtp.as_ref()) {
        Ok((settings, source)) => t.pass(format!(
            "SMTP {}:{} from {}",
            settings.host, settings.port, source
        )),
        Err(e) => t.fail(format!("SMTP: {}", e)),
    }
    if stored_smtp.as_ref().is_some_and(|s| s.complete().is_none()) {
        t.warn("store SMTP settings incomplete and ignored (see: certmon smtp show)");
    }

    // Only probe an existing lock file so doctor never creates one.
    if paths.run_lock.exists() {
        match FileLock::try_exclusive(&paths.run_lock) {
            Ok(Some(_)) => t.pass("no reminder run in progress"),
            Ok(None) => t.warn(format!(
                "reminder run in progress (lock held: {})",
                paths.run_lock.display()
            )),
            Err(e) => t.warn(format!("run lock not checkable: {}", e)),
        }
    }

    println!();
    println!(
        "Doctor summary: {} pass, {} warn, {} fail",
        t.ok, t.warn, t.fail
    );
    if t.fail > 0 {
        std::process::exit(1);
    }
    Ok(())
}
