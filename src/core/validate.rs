//! Turns raw record input into a validated [`NewRecord`].

use crate::constants;
use crate::core::calendar;
use crate::error::ValidationError;
use crate::models::record::{permanent_expiry, NewRecord, Validity};
use chrono::NaiveDate;

/// Raw, unvalidated input for a new record, as it arrives from the CLI.
#[derive(Debug, Clone, Default)]
pub struct RecordInput {
    pub name: String,
    pub email: String,
    pub acquired: Option<String>,
    pub months: Option<String>,
    pub expires: Option<String>,
    pub notes: Option<String>,
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), constants::DATE_FORMAT)
        .map_err(|_| ValidationError::Date(raw.to_string()))
}

/// Parse a validity period: a positive month count or `permanent`.
pub fn parse_months(raw: &str) -> Result<Validity, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.eq_ignore_ascii_case(constants::PERMANENT_KEYWORD) {
        return Ok(Validity::Permanent);
    }
    match trimmed.parse::<i32>() {
        Ok(n) if n > 0 => Ok(Validity::Months(n)),
        _ => Err(ValidationError::Months(raw.to_string())),
    }
}

/// Validate `input` and derive the record's expiry date.
pub fn new_record(input: &RecordInput) -> Result<NewRecord, ValidationError> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::Empty("name"));
    }
    let email = input.email.trim();
    if email.is_empty() {
        return Err(ValidationError::Empty("email"));
    }
    let notes = input
        .notes
        .as_deref()
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .map(str::to_string);

    let (acquired_on, validity) = match (&input.expires, &input.acquired, &input.months) {
        (Some(expires), None, None) => {
            let expires_on = parse_date(expires)?;
            (expires_on, Validity::FixedExpiry(expires_on))
        }
        (Some(_), _, _) => return Err(ValidationError::ConflictingValidity),
        (None, Some(acquired), Some(months)) => (parse_date(acquired)?, parse_months(months)?),
        (None, _, _) => return Err(ValidationError::IncompleteValidity),
    };

    let (valid_months, expires_on) = match validity {
        Validity::Months(n) => (n, calendar::add_months(acquired_on, n)),
        Validity::Permanent => (constants::PERMANENT_MONTHS, permanent_expiry()),
        Validity::FixedExpiry(date) => (constants::FIXED_EXPIRY_MONTHS, date),
    };

    Ok(NewRecord {
        name: name.to_string(),
        notify_email: email.to_string(),
        acquired_on,
        valid_months,
        expires_on,
        notes,
    })
}
