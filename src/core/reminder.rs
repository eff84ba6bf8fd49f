//! Reminder dispatch: find due records, email their owners, mark them sent.

use crate::constants;
use crate::core::calendar;
use crate::core::config::resolve_smtp;
use crate::core::mailer::MailSender;
use crate::core::store::RecordStore;
use crate::error::{MailTransportError, ReminderError, StorageError};
use crate::models::config::Config;
use crate::models::record::CredentialRecord;
use chrono::NaiveDate;

/// Rendered reminder for one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub subject: String,
    pub body: String,
}

impl Reminder {
    pub fn render(record: &CredentialRecord, days_left: i64) -> Self {
        let notes = record
            .notes
            .as_deref()
            .filter(|n| !n.is_empty())
            .unwrap_or(constants::EMPTY_PLACEHOLDER);
        Self {
            subject: format!("Expiry reminder: {}", record.name),
            body: format!(
                "Credential: {}\n\
                 Expires on: {}\n\
                 Days left: {}\n\
                 Notes: {}\n\
                 \n\
                 This message was sent automatically by certmon.",
                record.name,
                record.expires_on.format(constants::DATE_FORMAT),
                days_left,
                notes
            ),
        }
    }
}

/// What a reminder run would do with one due record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DueStatus {
    /// A reminder would be sent.
    Pending { days_left: i64 },
    /// Already reminded today.
    SentToday,
    /// Expiry is before today.
    Expired,
    /// Never expires; never reminded whatever the window.
    Permanent,
}

/// Classify a record for `today`.
pub fn due_status(record: &CredentialRecord, today: NaiveDate) -> DueStatus {
    if record.is_permanent() {
        return DueStatus::Permanent;
    }
    if record.reminded_on(today) {
        return DueStatus::SentToday;
    }
    let days_left = calendar::days_until(record.expires_on, today);
    if days_left < 0 {
        return DueStatus::Expired;
    }
    DueStatus::Pending { days_left }
}

/// Due records for `today` with the action a reminder run would take, without sending.
pub fn preview(
    config: &Config,
    store: &dyn RecordStore,
    today: NaiveDate,
) -> Result<Vec<(CredentialRecord, DueStatus)>, StorageError> {
    let due = store.query_due_for_reminders(today, config.app.reminder_window_days)?;
    Ok(due
        .into_iter()
        .map(|record| {
            let status = due_status(&record, today);
            (record, status)
        })
        .collect())
}

/// Email every due record not yet reminded today and return how many were sent.
///
/// Records are processed in store order over a single mail session, opened
/// before the loop and closed when the run ends on every path. The first send
/// failure aborts the run: records already sent stay marked, later ones are
/// not attempted.
pub fn send_due_reminders(
    config: &Config,
    store: &dyn RecordStore,
    mailer: &dyn MailSender,
    today: NaiveDate,
) -> Result<usize, ReminderError> {
    let window_days = config.app.reminder_window_days;
    let due = store.query_due_for_reminders(today, window_days)?;
    let stored_smtp = store.smtp_settings()?;
    let (smtp, _source) = resolve_smtp(config.smtp.as_ref(), stored_smtp.as_ref())?;

    let mut session = mailer.connect(&smtp).map_err(ReminderError::Session)?;
    let mut sent = 0;
    for record in &due {
        let DueStatus::Pending { days_left } = due_status(record, today) else {
            continue;
        };
        let reminder = Reminder::render(record, days_left);
        let mail_error = |source: MailTransportError| ReminderError::Mail {
            record_id: record.id,
            to: record.notify_email.clone(),
            source,
        };

        session
            .send(&record.notify_email, &reminder.subject, &reminder.body)
            .map_err(mail_error)?;

        store.mark_reminded(record.id, today)?;
        sent += 1;
    }
    Ok(sent)
}
