//! Concrete delivery channels

pub mod email;
pub mod ntfy;

pub use email::EmailChannel;
pub use ntfy::NtfyChannel;
