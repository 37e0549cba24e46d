//! Bounded, isolated fan-out of one message to many recipients.
//!
//! Recipients are served sequentially. Each send is wrapped in its own
//! timeout, and a failure for one recipient never prevents delivery to the
//! next. Failures are logged and returned, never retried.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::Notifier;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeliveryError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error("{0}")]
    Failed(String),
}

/// Outcome for one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    pub recipient: String,
    pub result: Result<(), DeliveryError>,
}

impl Delivery {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// Send `text` to every recipient, in order, each bounded by `timeout`.
pub async fn notify_all(
    notifier: &dyn Notifier,
    recipients: &[String],
    text: &str,
    timeout: Duration,
) -> Vec<Delivery> {
    let mut out = Vec::with_capacity(recipients.len());

    for recipient in recipients {
        let result = match tokio::time::timeout(timeout, notifier.send(recipient, text)).await {
            Ok(Ok(())) => {
                debug!(channel = notifier.channel_name(), recipient = %recipient, "notification delivered");
                Ok(())
            }
            Ok(Err(e)) => {
                warn!(channel = notifier.channel_name(), recipient = %recipient, error = %format!("{e:#}"), "notification failed");
                Err(DeliveryError::Failed(format!("{e:#}")))
            }
            Err(_) => {
                warn!(channel = notifier.channel_name(), recipient = %recipient, ?timeout, "notification timed out");
                Err(DeliveryError::Timeout(timeout))
            }
        };
        out.push(Delivery {
            recipient: recipient.clone(),
            result,
        });
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::RecordingNotifier;

    fn ids(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn failing_recipient_does_not_block_the_rest() {
        let n = RecordingNotifier::new().failing_for("222");

        let out = notify_all(&n, &ids(&["111", "222", "333"]), "hi", Duration::from_secs(1)).await;

        assert_eq!(out.len(), 3);
        assert!(out[0].is_ok());
        assert!(matches!(out[1].result, Err(DeliveryError::Failed(_))));
        assert!(out[2].is_ok());
        assert_eq!(n.recipients_of("hi"), ids(&["111", "333"]));
    }

    #[tokio::test]
    async fn slow_recipient_is_cut_off_by_timeout() {
        let n = RecordingNotifier::new().stalling_for("111");

        let out = notify_all(&n, &ids(&["111", "222"]), "hi", Duration::from_millis(20)).await;

        assert_eq!(out[0].result, Err(DeliveryError::Timeout(Duration::from_millis(20))));
        assert!(out[1].is_ok());
    }
}
