//! Notification dispatcher - renders a run result per channel and delivers it

use super::channel::{NotificationChannel, SendResult};
use super::render::render;
use crate::runner::RunResult;
use std::sync::Arc;
use tracing::{info, warn};

/// Best-effort fan-out over the registered channels.
///
/// Delivery is single-attempt; failures are logged as warnings and reported
/// back per channel, never propagated. The caller's exit code stays the
/// child command's exit code no matter what happens here.
pub struct NotificationDispatcher {
    channels: Vec<Arc<dyn NotificationChannel>>,
}

impl NotificationDispatcher {
    pub fn new() -> Self {
        Self { channels: Vec::new() }
    }

    pub fn register_channel(&mut self, channel: Arc<dyn NotificationChannel>) {
        info!(channel = channel.name(), "Registering notification channel");
        self.channels.push(channel);
    }

    /// Render once per channel (channel-specific body strategy) and send.
    pub fn dispatch(&self, result: &RunResult, host: &str) -> Vec<(String, SendResult)> {
        let mut outcomes = Vec::new();

        for channel in &self.channels {
            let name = channel.name().to_string();
            let rendered = render(result, host, channel.body_strategy());

            let outcome = match channel.send(&rendered) {
                Ok(()) => {
                    info!(channel = %name, "Notification sent");
                    SendResult::Sent
                }
                Err(e) => {
                    warn!(channel = %name, error = %e, "Notification delivery failed");
                    SendResult::Failed(e.to_string())
                }
            };

            outcomes.push((name, outcome));
        }

        outcomes
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

impl Default for NotificationDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notification::channel::{BodyStrategy, DeliveryError, RenderedNotification};
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    fn sample_result() -> RunResult {
        let now = Utc::now();
        RunResult {
            command: "echo hi".to_string(),
            exit_code: 0,
            stdout: "hi\n".to_string(),
            stderr: String::new(),
            started_at: now,
            finished_at: now,
        }
    }

    struct MockChannel {
        name: String,
        strategy: BodyStrategy,
        send_count: AtomicUsize,
        last_rendered: Mutex<Option<RenderedNotification>>,
        fail_with: Option<String>,
    }

    impl MockChannel {
        fn new(name: &str, strategy: BodyStrategy) -> Self {
            Self {
                name: name.to_string(),
                strategy,
                send_count: AtomicUsize::new(0),
                last_rendered: Mutex::new(None),
                fail_with: None,
            }
        }

        fn failing(name: &str, reason: &str) -> Self {
            let mut channel = Self::new(name, BodyStrategy::Attachment);
            channel.fail_with = Some(reason.to_string());
            channel
        }

        fn sends(&self) -> usize {
            self.send_count.load(Ordering::SeqCst)
        }
    }

    impl NotificationChannel for MockChannel {
        fn name(&self) -> &str {
            &self.name
        }

        fn body_strategy(&self) -> BodyStrategy {
            self.strategy
        }

        fn send(&self, rendered: &RenderedNotification) -> Result<(), DeliveryError> {
            self.send_count.fetch_add(1, Ordering::SeqCst);
            *self.last_rendered.lock().unwrap() = Some(rendered.clone());
            match &self.fail_with {
                Some(reason) => Err(DeliveryError::Config(reason.clone())),
                None => Ok(()),
            }
        }
    }

    #[test]
    fn register_and_count_channels() {
        let mut dispatcher = NotificationDispatcher::new();
        assert_eq!(dispatcher.channel_count(), 0);

        dispatcher.register_channel(Arc::new(MockChannel::new(
            "mock",
            BodyStrategy::Attachment,
        )));
        assert_eq!(dispatcher.channel_count(), 1);
        assert_eq!(dispatcher.channel_names(), vec!["mock"]);
    }

    #[test]
    fn dispatch_renders_with_the_channel_strategy() {
        let mut dispatcher = NotificationDispatcher::new();
        let inline = Arc::new(MockChannel::new(
            "inline",
            BodyStrategy::InlineBounded { max_len: 4000 },
        ));
        let attach = Arc::new(MockChannel::new("attach", BodyStrategy::Attachment));
        dispatcher.register_channel(inline.clone());
        dispatcher.register_channel(attach.clone());

        let outcomes = dispatcher.dispatch(&sample_result(), "box");
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes.iter().all(|(_, o)| *o == SendResult::Sent));

        let inline_msg = inline.last_rendered.lock().unwrap().clone().unwrap();
        assert!(inline_msg.attachment.is_none());
        let attach_msg = attach.last_rendered.lock().unwrap().clone().unwrap();
        assert!(attach_msg.attachment.is_some());
    }

    #[test]
    fn delivery_failure_is_isolated_and_reported() {
        let mut dispatcher = NotificationDispatcher::new();
        let broken = Arc::new(MockChannel::failing("broken", "no recipient"));
        let healthy = Arc::new(MockChannel::new("healthy", BodyStrategy::Attachment));
        dispatcher.register_channel(broken.clone());
        dispatcher.register_channel(healthy.clone());

        let outcomes = dispatcher.dispatch(&sample_result(), "box");

        assert!(matches!(outcomes[0].1, SendResult::Failed(_)));
        assert_eq!(outcomes[1].1, SendResult::Sent);
        // The failing channel did not stop the next one.
        assert_eq!(broken.sends(), 1);
        assert_eq!(healthy.sends(), 1);
    }
}
