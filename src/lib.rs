//! notirun - run a shell command and get notified when it finishes
//!
//! The runner tees the child's stdout/stderr to the terminal while capturing
//! both streams in full; the notification layer renders the result for a
//! channel (ntfy push or email) and delivers it best-effort.

pub mod config;
pub mod notification;
pub mod runner;

pub use config::{EmailConfig, NtfyConfig};
pub use notification::{
    render, Attachment, BodyStrategy, DeliveryError, EmailChannel, NotificationChannel,
    NotificationDispatcher, NtfyChannel, RenderedNotification, SendResult, INLINE_BODY_MAX,
};
pub use runner::{run_command, RunResult};
