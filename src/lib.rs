//! Credential expiry reminders.
//!
//! Tracks certificates, licenses and other credentials with an expiry date
//! and emails the responsible owner shortly before each one lapses.
//!
//! ## Modules
//! - `cli`: Command-line handlers
//! - `core`: Calendar arithmetic, record store, mailer, reminder dispatch
//! - `error`: Typed errors for each layer
//! - `models`: Data structures
//! - `util`: Filesystem and path helpers

pub mod cli;
pub mod constants;
pub mod core;
pub mod error;
pub mod models;
pub mod util;
