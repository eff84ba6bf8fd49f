//! On-disk layout of the record store document.

use crate::models::record::CredentialRecord;
use crate::models::smtp::StoredSmtpSettings;
use serde::{Deserialize, Serialize};

pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreFile {
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub smtp: Option<StoredSmtpSettings>,
    #[serde(default)]
    pub records: Vec<CredentialRecord>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    #[serde(default = "default_version")]
    pub version: u32,
    /// Next id to assign. Ids are never reused, even after removal.
    #[serde(default = "default_next_id")]
    pub next_id: i64,
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            version: default_version(),
            next_id: default_next_id(),
        }
    }
}

fn default_version() -> u32 {
    STORE_VERSION
}

fn default_next_id() -> i64 {
    1
}
