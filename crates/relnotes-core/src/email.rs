//! Release notes email delivery.
//!
//! Builds a `multipart/alternative` message with a single HTML part and
//! submits it through any [`lettre::Transport`]. Production runs use an
//! implicit-TLS SMTP relay authenticated with the sender's app password.

use lettre::message::{Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials as SmtpCredentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::{debug, info};

use crate::config::Credentials;
use crate::error::{ReleaseNotesError, Result};

/// Mail submission host.
pub const SMTP_HOST: &str = "smtp.gmail.com";

/// Mail submission port (implicit TLS).
pub const SMTP_PORT: u16 = 465;

/// Subject used unless overridden.
pub const DEFAULT_SUBJECT: &str = "Release Notes";

/// Sends the release document to the distribution list.
///
/// [`compose_message`](Self::compose_message) must be called exactly once
/// before [`send`](Self::send). Sending consumes the composed message.
pub struct ReportEmail<T = SmtpTransport> {
    sender: String,
    recipients: Vec<String>,
    subject: String,
    transport: T,
    message: Option<Message>,
}

impl ReportEmail<SmtpTransport> {
    /// Create a dispatcher that submits through [`SMTP_HOST`]:[`SMTP_PORT`]
    /// with the sender address and app password from `credentials`.
    pub fn smtp(credentials: &Credentials, subject: impl Into<String>) -> Result<Self> {
        let transport = SmtpTransport::relay(SMTP_HOST)
            .map_err(|e| ReleaseNotesError::Mail(format!("cannot reach {}: {}", SMTP_HOST, e)))?
            .port(SMTP_PORT)
            .credentials(SmtpCredentials::new(
                credentials.sender_email.clone(),
                credentials.app_password.clone(),
            ))
            .build();

        Ok(Self::with_transport(
            credentials.sender_email.clone(),
            credentials.recipients.clone(),
            subject,
            transport,
        ))
    }
}

impl<T> ReportEmail<T>
where
    T: Transport,
    T::Error: std::fmt::Display,
{
    /// Create a dispatcher over an arbitrary transport.
    pub fn with_transport(
        sender: impl Into<String>,
        recipients: Vec<String>,
        subject: impl Into<String>,
        transport: T,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipients,
            subject: subject.into(),
            transport,
            message: None,
        }
    }

    /// Subject line.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Transport messages are submitted through.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The composed message, if any.
    pub fn message(&self) -> Option<&Message> {
        self.message.as_ref()
    }

    /// Build the message around `html`.
    ///
    /// # Errors
    /// Fails if a message was already composed or an address does not parse.
    pub fn compose_message(&mut self, html: &str) -> Result<()> {
        if self.message.is_some() {
            return Err(ReleaseNotesError::Mail("message already composed".into()));
        }

        let from: Mailbox = self.sender.parse().map_err(|e| {
            ReleaseNotesError::Mail(format!("invalid sender address {}: {}", self.sender, e))
        })?;

        let mut builder = Message::builder().from(from).subject(self.subject.as_str());
        for recipient in &self.recipients {
            let to: Mailbox = recipient.parse().map_err(|e| {
                ReleaseNotesError::Mail(format!("invalid recipient address {}: {}", recipient, e))
            })?;
            builder = builder.to(to);
        }

        let message = builder
            .multipart(MultiPart::alternative().singlepart(SinglePart::html(html.to_string())))
            .map_err(|e| ReleaseNotesError::Mail(format!("failed to build message: {}", e)))?;

        debug!(recipients = self.recipients.len(), "Composed release notes email");
        self.message = Some(message);
        Ok(())
    }

    /// Submit the composed message to all recipients in one transaction.
    ///
    /// # Errors
    /// Fails with [`ReleaseNotesError::MessageNotComposed`] when there is no
    /// message, or [`ReleaseNotesError::Mail`] when the transport refuses it.
    pub fn send(&mut self) -> Result<()> {
        let message = self
            .message
            .take()
            .ok_or(ReleaseNotesError::MessageNotComposed)?;

        self.transport
            .send(&message)
            .map_err(|e| ReleaseNotesError::Mail(e.to_string()))?;

        info!(recipients = self.recipients.len(), "Release notes email sent");
        Ok(())
    }
}
