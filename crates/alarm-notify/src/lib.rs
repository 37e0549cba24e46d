//! alarm-notify
//!
//! Notification sink: deliver formatted text to a fixed set of recipients.
//!
//! This crate owns the [`Notifier`] contract, the Telegram implementation,
//! the message templates and the bounded per-recipient fan-out. It knows
//! nothing about sensor state; callers decide *what* to send.

pub mod fanout;
pub mod telegram;
pub mod templates;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;

pub use fanout::{notify_all, Delivery, DeliveryError};
pub use telegram::TelegramClient;

use anyhow::Result;

/// A channel able to deliver one text message to one recipient.
///
/// Object-safe so the daemon can hold an `Arc<dyn Notifier>`.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    /// Short channel name for logs (e.g. `"telegram"`).
    fn channel_name(&self) -> &'static str;

    /// Deliver `text` to `recipient`. No retries.
    async fn send(&self, recipient: &str, text: &str) -> Result<()>;

    /// Deliver `text` as a reply to message `reply_to` in `recipient`'s chat.
    /// Channels without threading fall back to [`send`](Self::send).
    async fn reply(&self, recipient: &str, text: &str, reply_to: i64) -> Result<()> {
        let _ = reply_to;
        self.send(recipient, text).await
    }
}
