//! Config file model (`certmon.toml`).

use crate::constants;
use crate::models::smtp::SmtpSettings;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub app: AppSection,
    /// Static SMTP settings; store-held settings take precedence when complete.
    #[serde(default)]
    pub smtp: Option<SmtpSettings>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default = "default_store_path")]
    pub store_path: String,
    #[serde(default = "default_reminder_window_days")]
    pub reminder_window_days: u32,
}

impl Default for AppSection {
    fn default() -> Self {
        Self {
            store_path: default_store_path(),
            reminder_window_days: default_reminder_window_days(),
        }
    }
}

fn default_store_path() -> String {
    constants::DEFAULT_STORE_PATH.to_string()
}

fn default_reminder_window_days() -> u32 {
    constants::DEFAULT_REMINDER_WINDOW_DAYS
}
