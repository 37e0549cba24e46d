//! In-memory [`Notifier`] for tests.
//!
//! Compiled only under `cfg(test)` or the `testkit` feature. MUST NOT be
//! enabled in production builds.

use std::collections::BTreeSet;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::{bail, Result};

use crate::Notifier;

/// Records every delivered `(recipient, text)` pair.
///
/// Recipients registered with [`failing_for`](Self::failing_for) get an
/// error; recipients registered with [`stalling_for`](Self::stalling_for)
/// never complete (until the caller's timeout fires).
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    sent: Mutex<Vec<(String, String)>>,
    replied_to: Mutex<Vec<i64>>,
    failing: BTreeSet<String>,
    stalling: BTreeSet<String>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_for(mut self, recipient: &str) -> Self {
        self.failing.insert(recipient.to_string());
        self
    }

    pub fn stalling_for(mut self, recipient: &str) -> Self {
        self.stalling.insert(recipient.to_string());
        self
    }

    /// All delivered messages, in delivery order.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Recipients that received exactly `text`, in delivery order.
    pub fn recipients_of(&self, text: &str) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter(|(_, t)| t == text)
            .map(|(r, _)| r)
            .collect()
    }

    /// Delivered messages whose text contains `needle`.
    pub fn containing(&self, needle: &str) -> Vec<(String, String)> {
        self.sent()
            .into_iter()
            .filter(|(_, t)| t.contains(needle))
            .collect()
    }

    /// Message ids passed to [`Notifier::reply`], in delivery order.
    pub fn replied_to(&self) -> Vec<i64> {
        self.replied_to.lock().map(|v| v.clone()).unwrap_or_default()
    }

    pub fn clear(&self) {
        if let Ok(mut v) = self.sent.lock() {
            v.clear();
        }
    }
}

#[async_trait::async_trait]
impl Notifier for RecordingNotifier {
    fn channel_name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        if self.stalling.contains(recipient) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing.contains(recipient) {
            bail!("recipient {} unreachable", recipient);
        }
        if let Ok(mut v) = self.sent.lock() {
            v.push((recipient.to_string(), text.to_string()));
        }
        Ok(())
    }

    async fn reply(&self, recipient: &str, text: &str, reply_to: i64) -> Result<()> {
        self.send(recipient, text).await?;
        if let Ok(mut v) = self.replied_to.lock() {
            v.push(reply_to);
        }
        Ok(())
    }
}
