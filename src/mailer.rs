//! Outbound mail: the [`Mailer`] seam, its SMTP implementation and the admin
//! notifications built on top of it.
//!
//! Sends are awaited by the caller and bounded by a timeout. Failures are
//! returned, never swallowed, and never retried.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use thiserror::Error;

use crate::storage::ContactMessageRow;

#[derive(Debug, Error)]
pub enum MailError {
    #[error("invalid mail address '{0}'")]
    Address(String),

    #[error("failed to build message: {0}")]
    Build(String),

    #[error("smtp transport error: {0}")]
    Transport(String),

    #[error("smtp send timed out after {0}s")]
    Timeout(u64),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingMail {
    pub to: String,
    pub reply_to: Option<String>,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError>;
}

/// SMTP connection settings.
#[derive(Debug, Clone)]
pub struct SmtpSettings {
    pub host: String,
    pub port: u16,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    timeout: Duration,
}

fn mailbox(address: &str) -> Result<Mailbox, MailError> {
    address
        .parse()
        .map_err(|_| MailError::Address(address.to_string()))
}

impl SmtpMailer {
    pub fn new(settings: &SmtpSettings) -> Result<Self, MailError> {
        let mut builder = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&settings.host)
            .map_err(|e| MailError::Transport(e.to_string()))?
            .port(settings.port)
            .timeout(Some(settings.timeout));
        if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
            builder = builder.credentials(Credentials::new(user.clone(), pass.clone()));
        }
        Ok(Self {
            transport: builder.build(),
            from: mailbox(&settings.from)?,
            timeout: settings.timeout,
        })
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
        let mut builder = Message::builder()
            .from(self.from.clone())
            .to(mailbox(&mail.to)?)
            .subject(mail.subject)
            .header(ContentType::TEXT_PLAIN);
        if let Some(reply_to) = &mail.reply_to {
            builder = builder.reply_to(mailbox(reply_to)?);
        }
        let message = builder
            .body(mail.body)
            .map_err(|e| MailError::Build(e.to_string()))?;

        match tokio::time::timeout(self.timeout, self.transport.send(message)).await {
            Ok(Ok(_)) => Ok(()),
            Ok(Err(e)) => Err(MailError::Transport(e.to_string())),
            Err(_) => Err(MailError::Timeout(self.timeout.as_secs())),
        }
    }
}

/// Sends notifications to the site owner's address.
#[derive(Clone)]
pub struct AdminNotifier {
    mailer: Arc<dyn Mailer>,
    admin_email: String,
}

impl AdminNotifier {
    pub fn new(mailer: Arc<dyn Mailer>, admin_email: impl Into<String>) -> Self {
        Self {
            mailer,
            admin_email: admin_email.into(),
        }
    }

    pub fn admin_email(&self) -> &str {
        &self.admin_email
    }

    pub async fn contact_received(&self, message: &ContactMessageRow) -> Result<(), MailError> {
        self.mailer
            .send(contact_notification(message, &self.admin_email))
            .await
    }

    pub async fn credentials_changed(
        &self,
        username: &str,
        at: DateTime<Utc>,
    ) -> Result<(), MailError> {
        self.mailer
            .send(credentials_notification(username, at, &self.admin_email))
            .await
    }
}

pub fn contact_notification(message: &ContactMessageRow, admin_email: &str) -> OutgoingMail {
    let subject = match &message.subject {
        Some(s) => format!("New contact message: {s}"),
        None => format!("New contact message from {}", message.name),
    };
    OutgoingMail {
        to: admin_email.to_string(),
        reply_to: Some(message.email.clone()),
        subject,
        body: format!(
            "From: {} <{}>\nReceived: {}\n\n{}\n",
            message.name,
            message.email,
            message.created_at.to_rfc3339(),
            message.message
        ),
    }
}

pub fn credentials_notification(username: &str, at: DateTime<Utc>, admin_email: &str) -> OutgoingMail {
    OutgoingMail {
        to: admin_email.to_string(),
        reply_to: None,
        subject: "Admin credentials changed".to_string(),
        body: format!(
            "The admin credentials were changed at {}.\nCurrent username: {}\n\nIf this was not you, restore access immediately.\n",
            at.to_rfc3339(),
            username
        ),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Outbox {
        sent: Mutex<Vec<OutgoingMail>>,
    }

    #[async_trait]
    impl Mailer for Outbox {
        async fn send(&self, mail: OutgoingMail) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(mail);
            Ok(())
        }
    }

    fn message(subject: Option<&str>) -> ContactMessageRow {
        ContactMessageRow {
            id: "m-1".to_string(),
            name: "Grace".to_string(),
            email: "grace@example.com".to_string(),
            subject: subject.map(String::from),
            message: "Let's talk".to_string(),
            is_read: false,
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        }
    }

    #[test]
    fn test_contact_notification_replies_to_sender() {
        let mail = contact_notification(&message(Some("Hiring")), "me@example.com");
        assert_eq!(mail.to, "me@example.com");
        assert_eq!(mail.reply_to.as_deref(), Some("grace@example.com"));
        assert_eq!(mail.subject, "New contact message: Hiring");
        assert!(mail.body.contains("Let's talk"));

        let mail = contact_notification(&message(None), "me@example.com");
        assert_eq!(mail.subject, "New contact message from Grace");
    }

    #[tokio::test]
    async fn test_notifier_routes_to_admin() {
        let outbox = Arc::new(Outbox::default());
        let notifier = AdminNotifier::new(outbox.clone(), "owner@example.com");

        notifier.contact_received(&message(None)).await.unwrap();
        notifier
            .credentials_changed("owner", DateTime::from_timestamp(0, 0).unwrap())
            .await
            .unwrap();

        let sent = outbox.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        assert!(sent.iter().all(|m| m.to == "owner@example.com"));
        assert!(sent[1].body.contains("Current username: owner"));
    }

    #[test]
    fn test_smtp_mailer_rejects_bad_from_address() {
        let settings = SmtpSettings {
            host: "localhost".to_string(),
            port: 2525,
            username: None,
            password: None,
            from: "not an address".to_string(),
            timeout: Duration::from_secs(1),
        };
        assert!(matches!(
            SmtpMailer::new(&settings),
            Err(MailError::Address(_))
        ));
    }
}
