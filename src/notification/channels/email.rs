//! Email channel - multipart message over an authenticated STARTTLS session

use crate::config::EmailConfig;
use crate::notification::channel::{
    BodyStrategy, DeliveryError, NotificationChannel, RenderedNotification,
};
use lettre::message::header::ContentType;
use lettre::message::{Attachment as MessageAttachment, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use std::time::Duration;
use tracing::debug;

/// Email channel submitting via SMTP with STARTTLS.
///
/// The rendered body is a short summary; the full log travels as a
/// `logs.txt` attachment (no truncation).
pub struct EmailChannel {
    config: EmailConfig,
}

impl EmailChannel {
    pub fn new(config: EmailConfig) -> Self {
        Self { config }
    }

    fn mailbox(addr: &str, role: &str) -> Result<Mailbox, DeliveryError> {
        addr.parse()
            .map_err(|e| DeliveryError::Config(format!("invalid {} address '{}': {}", role, addr, e)))
    }
}

impl NotificationChannel for EmailChannel {
    fn name(&self) -> &str {
        "email"
    }

    fn body_strategy(&self) -> BodyStrategy {
        BodyStrategy::Attachment
    }

    fn send(&self, rendered: &RenderedNotification) -> Result<(), DeliveryError> {
        self.config.validate()?;

        // validate() guarantees these are present
        let missing = || DeliveryError::Config("email channel is missing settings".to_string());
        let user = self.config.user.clone().ok_or_else(missing)?;
        let password = self.config.password.clone().ok_or_else(missing)?;
        let sender = self.config.sender().ok_or_else(missing)?;
        let recipient = self.config.to.as_deref().ok_or_else(missing)?;

        let from = Self::mailbox(sender, "sender")?;
        let to = Self::mailbox(recipient, "recipient")?;

        let mut parts = MultiPart::mixed().singlepart(SinglePart::plain(rendered.body.clone()));
        if let Some(attachment) = &rendered.attachment {
            parts = parts.singlepart(
                MessageAttachment::new(attachment.filename.clone())
                    .body(attachment.content.clone(), ContentType::TEXT_PLAIN),
            );
        }

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(format!("notirun: {}", rendered.title))
            .multipart(parts)
            .map_err(|e| DeliveryError::Config(format!("could not assemble message: {}", e)))?;

        let mailer = SmtpTransport::starttls_relay(&self.config.smtp_host)?
            .port(self.config.smtp_port)
            .credentials(Credentials::new(user, password))
            .timeout(Some(Duration::from_secs(self.config.timeout_secs)))
            .build();

        mailer.send(&message)?;
        debug!(host = %self.config.smtp_host, to = %recipient, "email submitted");
        Ok(())
    }
}
