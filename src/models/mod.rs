//! Data structures shared by the store, config, and CLI layers.

pub mod config;
pub mod record;
pub mod smtp;
pub mod store_file;
