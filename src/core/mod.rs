//! Core logic: calendar arithmetic, record store, reminder dispatch.

pub mod calendar;
pub mod config;
pub mod file_lock;
pub mod mailer;
pub mod paths;
pub mod reminder;
pub mod store;
pub mod validate;
