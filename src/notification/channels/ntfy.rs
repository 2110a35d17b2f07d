//! ntfy.sh push channel - JSON POST to the service root over TLS

use crate::config::NtfyConfig;
use crate::notification::channel::{
    BodyStrategy, DeliveryError, NotificationChannel, RenderedNotification,
};
use crate::notification::render::INLINE_BODY_MAX;
use reqwest::blocking::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::debug;

/// Message payload as the ntfy publish API expects it.
#[derive(Debug, Serialize)]
struct NtfyPayload<'a> {
    topic: &'a str,
    title: &'a str,
    message: &'a str,
    tags: &'a [String],
}

/// Push channel talking to a ntfy server.
pub struct NtfyChannel {
    client: Client,
    config: NtfyConfig,
}

impl NtfyChannel {
    pub fn new(config: NtfyConfig) -> Result<Self, DeliveryError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { client, config })
    }

    pub fn topic(&self) -> &str {
        &self.config.topic
    }
}

impl NotificationChannel for NtfyChannel {
    fn name(&self) -> &str {
        "ntfy"
    }

    fn body_strategy(&self) -> BodyStrategy {
        BodyStrategy::InlineBounded { max_len: INLINE_BODY_MAX }
    }

    fn send(&self, rendered: &RenderedNotification) -> Result<(), DeliveryError> {
        let payload = NtfyPayload {
            topic: &self.config.topic,
            title: &rendered.title,
            message: &rendered.body,
            tags: &rendered.tags,
        };

        let response = self.client.post(&self.config.server).json(&payload).send()?;

        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            let body = response.text().unwrap_or_default();
            return Err(DeliveryError::Rejected { status: status.as_u16(), body });
        }

        debug!(topic = %self.config.topic, status = status.as_u16(), "ntfy accepted the notification");
        Ok(())
    }
}
