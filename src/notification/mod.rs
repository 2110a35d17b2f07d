//! Notification rendering and delivery

pub mod channel;
pub mod channels;
pub mod dispatcher;
pub mod render;

pub use channel::{
    Attachment, BodyStrategy, DeliveryError, NotificationChannel, RenderedNotification, SendResult,
};
pub use channels::{EmailChannel, NtfyChannel};
pub use dispatcher::NotificationDispatcher;
pub use render::{render, INLINE_BODY_MAX, TRUNCATION_MARKER};
