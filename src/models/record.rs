use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Expiry date pinned on permanent records; far outside any reminder window.
pub fn permanent_expiry() -> NaiveDate {
    NaiveDate::from_ymd_opt(9999, 12, 31).unwrap_or(NaiveDate::MAX)
}

/// One tracked credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub id: i64,
    pub name: String,
    pub notify_email: String,
    pub acquired_on: NaiveDate,
    pub valid_months: i32,
    pub expires_on: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_reminded_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialRecord {
    pub fn is_permanent(&self) -> bool {
        self.valid_months < 0
    }

    pub fn reminded_on(&self, day: NaiveDate) -> bool {
        self.last_reminded_on == Some(day)
    }
}

/// How long a new credential stays valid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Validity {
    /// Expires this many months after acquisition (always > 0).
    Months(i32),
    /// Never expires and is never reminded.
    Permanent,
    /// Legacy input: the expiry date is given directly.
    FixedExpiry(NaiveDate),
}

/// A validated record awaiting insertion. Expiry is already derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRecord {
    pub name: String,
    pub notify_email: String,
    pub acquired_on: NaiveDate,
    pub valid_months: i32,
    pub expires_on: NaiveDate,
    pub notes: Option<String>,
}

impl NewRecord {
    /// Same rule as [`CredentialRecord::is_permanent`].
    pub fn is_permanent(&self) -> bool {
        self.valid_months < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants;

    fn new_record(valid_months: i32) -> NewRecord {
        NewRecord {
            name: "web-tls".into(),
            notify_email: "ops@example.com".into(),
            acquired_on: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            valid_months,
            expires_on: permanent_expiry(),
            notes: None,
        }
    }

    #[test]
    fn test_permanent_rule_matches_stored_record() {
        for months in [constants::PERMANENT_MONTHS, -7, constants::FIXED_EXPIRY_MONTHS, 12] {
            let new = new_record(months);
            let stored = CredentialRecord {
                id: 1,
                name: new.name.clone(),
                notify_email: new.notify_email.clone(),
                acquired_on: new.acquired_on,
                valid_months: months,
                expires_on: new.expires_on,
                notes: None,
                last_reminded_on: None,
                created_at: Utc::now(),
                updated_at: Utc::now(),
            };
            assert_eq!(new.is_permanent(), stored.is_permanent(), "{months}");
            assert_eq!(new.is_permanent(), months < 0, "{months}");
        }
    }
}
