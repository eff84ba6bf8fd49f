//! Outbound mail: the sender contract and its SMTP implementation.

use crate::constants;
use crate::error::MailTransportError;
use crate::models::smtp::SmtpSettings;
use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;

/// Opens mail sessions for a given set of SMTP settings.
pub trait MailSender {
    fn connect(&self, settings: &SmtpSettings) -> Result<Box<dyn MailSession>, MailTransportError>;
}

/// An open mail session. Dropping it closes the underlying connection.
pub trait MailSession {
    fn send(&mut self, to: &str, subject: &str, body: &str) -> Result<(), MailTransportError>;
}

/// Connect, send a single message, and close.
pub fn send_one(
    sender: &dyn MailSender,
    settings: &SmtpSettings,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<(), MailTransportError> {
    let mut session = sender.connect(settings)?;
    session.send(to, subject, body)
}

/// SMTP delivery through `lettre`.
///
/// `use_tls` selects STARTTLS; otherwise port 465 gets implicit TLS and any
/// other port a plaintext connection. Credentials are always sent.
#[derive(Debug, Default, Clone, Copy)]
pub struct SmtpMailer;

impl MailSender for SmtpMailer {
    fn connect(&self, settings: &SmtpSettings) -> Result<Box<dyn MailSession>, MailTransportError> {
        let from = parse_mailbox(&settings.from_email)?;
        let transport_error = |source: lettre::transport::smtp::Error| MailTransportError::Transport {
            host: settings.host.clone(),
            port: settings.port,
            source,
        };

        let builder = if settings.use_tls {
            SmtpTransport::starttls_relay(&settings.host).map_err(transport_error)?
        } else if settings.port == constants::SMTPS_PORT {
            SmtpTransport::relay(&settings.host).map_err(transport_error)?
        } else {
            SmtpTransport::builder_dangerous(&settings.host)
        };
        let transport = builder
            .port(settings.port)
            .credentials(Credentials::new(
                settings.username.clone(),
                settings.password.clone(),
            ))
            .timeout(Some(Duration::from_secs(constants::SMTP_TIMEOUT_SECS)))
            .build();

        // Connect and authenticate up front so a bad session fails before any send.
        if !transport.test_connection().map_err(transport_error)? {
            return Err(MailTransportError::Unreachable {
                host: settings.host.clone(),
                port: settings.port,
            });
        }
        tracing::debug!(host = %settings.host, port = settings.port, tls = settings.use_tls, "SMTP session opened");

        Ok(Box::new(SmtpSession {
            transport,
            from,
            host: settings.host.clone(),
            port: settings.port,
        }))
    }
}

struct SmtpSession {
    transport: SmtpTransport,
    from: Mailbox,
    host: String,
    port: u16,
}

impl MailSession for SmtpSession {
    fn send(&mut self, to: &str, subject: &str, body: &str) -> Result<(), MailTransportError> {
        let message = build_message(&self.from, to, subject, body)?;
        self.transport
            .send(&message)
            .map_err(|source| MailTransportError::Transport {
                host: self.host.clone(),
                port: self.port,
                source,
            })?;
        tracing::info!(to, subject, "mail sent");
        Ok(())
    }
}

impl Drop for SmtpSession {
    fn drop(&mut self) {
        tracing::debug!(host = %self.host, port = self.port, "SMTP session closed");
    }
}

fn parse_mailbox(address: &str) -> Result<Mailbox, MailTransportError> {
    address
        .trim()
        .parse()
        .map_err(|source| MailTransportError::Address {
            address: address.to_string(),
            source,
        })
}

fn build_message(
    from: &Mailbox,
    to: &str,
    subject: &str,
    body: &str,
) -> Result<Message, MailTransportError> {
    let message = Message::builder()
        .from(from.clone())
        .to(parse_mailbox(to)?)
        .subject(subject)
        .header(ContentType::TEXT_PLAIN)
        .body(body.to_string())?;
    Ok(message)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_mailbox() {
        assert!(parse_mailbox("owner@example.com").is_ok());
        assert!(parse_mailbox(" CertMon <certmon@example.com> ").is_ok());
        assert!(matches!(
            parse_mailbox("not-an-address"),
            Err(MailTransportError::Address { .. })
        ));
    }

    #[test]
    fn test_build_message_headers() {
        let from = parse_mailbox("certmon@example.com").unwrap();
        let message = build_message(&from, "owner@example.com", "Expiry reminder: web-tls", "body").unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("From: certmon@example.com"));
        assert!(raw.contains("To: owner@example.com"));
        assert!(raw.contains("Subject: Expiry reminder: web-tls"));
        assert!(raw.contains("text/plain"));
    }

    #[test]
    fn test_build_message_rejects_bad_recipient() {
        let from = parse_mailbox("certmon@example.com").unwrap();
        assert!(matches!(
            build_message(&from, "nobody", "s", "b"),
            Err(MailTransportError::Address { .. })
        ));
    }

    #[test]
    fn test_connect_rejects_bad_from_before_network() {
        let settings = SmtpSettings {
            host: "localhost".into(),
            port: 2525,
            username: "u".into(),
            password: "p".into(),
            use_tls: false,
            from_email: "bogus".into(),
        };
        assert!(matches!(
            SmtpMailer.connect(&settings),
            Err(MailTransportError::Address { .. })
        ));
    }
}
