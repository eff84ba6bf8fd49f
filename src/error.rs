//! Typed errors surfaced by the reminder engine and its collaborators.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("invalid config value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("no usable SMTP settings: configure [smtp] in the config file or run `certmon smtp set`")]
    MissingSmtp,
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("store I/O on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse store {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("serialize store: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("lock store {path}: {source}")]
    Lock {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("persist store {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store {path} has unsupported version {version}")]
    Version { path: PathBuf, version: u32 },
}

#[derive(Debug, thiserror::Error)]
pub enum MailTransportError {
    #[error("invalid address '{address}': {source}")]
    Address {
        address: String,
        #[source]
        source: lettre::address::AddressError,
    },

    #[error("build message: {0}")]
    Message(#[from] lettre::error::Error),

    #[error("SMTP transport to {host}:{port}: {source}")]
    Transport {
        host: String,
        port: u16,
        #[source]
        source: lettre::transport::smtp::Error,
    },

    #[error("SMTP server {host}:{port} refused the connection")]
    Unreachable { host: String, port: u16 },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} cannot be empty")]
    Empty(&'static str),

    #[error("invalid date '{0}', expected YYYY-MM-DD")]
    Date(String),

    #[error("valid months must be a positive integer or 'permanent', got '{0}'")]
    Months(String),

    #[error("--acquired and --months must be given together")]
    IncompleteValidity,

    #[error("--expires cannot be combined with --acquired or --months")]
    ConflictingValidity,
}

/// Failure of a reminder run. Any variant aborts the whole batch.
#[derive(Debug, thiserror::Error)]
pub enum ReminderError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("open mail session: {0}")]
    Session(#[source] MailTransportError),

    #[error("reminder for record {record_id} to {to}: {source}")]
    Mail {
        record_id: i64,
        to: String,
        #[source]
        source: MailTransportError,
    },
}
