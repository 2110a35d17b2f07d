//! Notification channel trait and the rendered message it carries

use thiserror::Error;

/// A notification ready for delivery, shaped for one channel.
#[derive(Debug, Clone)]
pub struct RenderedNotification {
    /// Short, bounded-length title
    pub title: String,
    /// Channel-shaped body (inline-bounded or a short summary)
    pub body: String,
    /// Success/failure marker tags for channels that support them
    pub tags: Vec<String>,
    /// Full log payload for channels that support attachments
    pub attachment: Option<Attachment>,
}

/// Untruncated log payload attached to a notification.
#[derive(Debug, Clone)]
pub struct Attachment {
    pub filename: String,
    pub content: String,
}

/// How a channel wants the notification body shaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyStrategy {
    /// Header block plus log sections, log shortened to keep the whole body
    /// within `max_len`
    InlineBounded { max_len: usize },
    /// Short plain-text summary as the body, full log as an attachment
    Attachment,
}

/// Per-channel outcome of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendResult {
    Sent,
    Failed(String),
}

/// Why a notification could not be delivered.
///
/// Configuration problems are detectable before any network I/O and are kept
/// distinct from transport failures and service rejections.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Required destination or credential information is missing
    #[error("channel not configured: {0}")]
    Config(String),
    /// The service answered with a non-success status
    #[error("server returned HTTP {status}: {body}")]
    Rejected { status: u16, body: String },
    /// The service could not be reached
    #[error("could not reach the notification service: {source}")]
    Transport {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<reqwest::Error> for DeliveryError {
    fn from(err: reqwest::Error) -> Self {
        DeliveryError::Transport { source: Box::new(err) }
    }
}

impl From<lettre::transport::smtp::Error> for DeliveryError {
    fn from(err: lettre::transport::smtp::Error) -> Self {
        DeliveryError::Transport { source: Box::new(err) }
    }
}

/// A notification backend with a uniform send contract.
///
/// Implementations are blocking, single-attempt and bounded by a timeout;
/// retry policy is deliberately absent.
pub trait NotificationChannel: Send + Sync {
    /// Channel name, used for logging and reporting
    fn name(&self) -> &str;

    /// Body shape this channel wants from the renderer
    fn body_strategy(&self) -> BodyStrategy;

    /// Deliver a rendered notification to the configured destination
    fn send(&self, rendered: &RenderedNotification) -> Result<(), DeliveryError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn delivery_error_variants_render_distinct_messages() {
        let config = DeliveryError::Config("no recipient".to_string());
        assert_eq!(config.to_string(), "channel not configured: no recipient");

        let rejected = DeliveryError::Rejected {
            status: 429,
            body: "too many requests".to_string(),
        };
        assert!(rejected.to_string().contains("HTTP 429"));
        assert!(rejected.to_string().contains("too many requests"));
    }

    #[test]
    fn body_strategy_is_comparable() {
        assert_eq!(
            BodyStrategy::InlineBounded { max_len: 4000 },
            BodyStrategy::InlineBounded { max_len: 4000 }
        );
        assert_ne!(
            BodyStrategy::Attachment,
            BodyStrategy::InlineBounded { max_len: 4000 }
        );
    }
}
