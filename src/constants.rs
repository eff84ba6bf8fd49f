//! Centralized constants for paths, defaults, and sentinels.

/// Default config file, relative to the working directory.
pub const DEFAULT_CONFIG_PATH: &str = "certmon.toml";

/// Environment variable overriding the config file path.
pub const CONFIG_ENV: &str = "CERTMON_CONFIG";

/// Environment variable holding the log filter (falls back to `RUST_LOG`).
pub const LOG_ENV: &str = "CERTMON_LOG";

/// Default store document, relative to the config file's directory.
pub const DEFAULT_STORE_PATH: &str = "data/certmon.toml";

/// Default number of days before expiry in which reminders go out.
pub const DEFAULT_REMINDER_WINDOW_DAYS: u32 = 7;

/// Default SMTP submission port.
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Implicit-TLS SMTP port.
pub const SMTPS_PORT: u16 = 465;

/// Timeout applied to every SMTP connection, in seconds.
pub const SMTP_TIMEOUT_SECS: u64 = 30;

/// `valid_months` value marking a record that never expires.
pub const PERMANENT_MONTHS: i32 = -1;

/// `valid_months` value stored for records added with an explicit expiry date.
pub const FIXED_EXPIRY_MONTHS: i32 = 0;

/// Keyword accepted in place of a month count for permanent records.
pub const PERMANENT_KEYWORD: &str = "permanent";

/// Date format used for input, storage, and reminder bodies.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Permission mode for the store document.
pub const STORE_FILE_MODE: u32 = 0o600;

/// Permission mode for the store directory.
pub const STORE_DIR_MODE: u32 = 0o700;

/// Placeholder rendered for absent optional values.
pub const EMPTY_PLACEHOLDER: &str = "-";
