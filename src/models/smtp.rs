//! SMTP settings as configured statically, as held in the store, and as resolved.

use crate::constants;
use serde::{Deserialize, Serialize};

/// Fully specified SMTP settings, ready to hand to a mail sender.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmtpSettings {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub username: String,
    pub password: String,
    #[serde(default = "default_use_tls")]
    pub use_tls: bool,
    pub from_email: String,
}

/// SMTP settings edited at runtime and kept in the store. Any field may be unset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredSmtpSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub use_tls: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_email: Option<String>,
}

impl StoredSmtpSettings {
    /// Complete settings, or `None` when host, port, username, password, or
    /// from-address is missing or blank. TLS defaults to on.
    pub fn complete(&self) -> Option<SmtpSettings> {
        fn filled(value: &Option<String>) -> Option<String> {
            value
                .as_deref()
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
        }

        Some(SmtpSettings {
            host: filled(&self.host)?,
            port: self.port.filter(|p| *p != 0)?,
            username: filled(&self.username)?,
            password: self.password.clone().filter(|p| !p.is_empty())?,
            use_tls: self.use_tls.unwrap_or_else(default_use_tls),
            from_email: filled(&self.from_email)?,
        })
    }
}

/// Where the effective SMTP settings came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpSource {
    Store,
    Config,
}

impl std::fmt::Display for SmtpSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SmtpSource::Store => write!(f, "store settings"),
            SmtpSource::Config => write!(f, "config file"),
        }
    }
}

fn default_port() -> u16 {
    constants::DEFAULT_SMTP_PORT
}

fn default_use_tls() -> bool {
    true
}
