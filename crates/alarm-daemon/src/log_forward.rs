//! Operator alerting for WARN and ERROR log records.
//!
//! [`LogForwardLayer`] formats every WARN/ERROR event and hands it to a
//! bounded channel with `try_send`; logging never waits on the chat API and
//! a full channel drops the record. [`spawn_log_forwarder`] drains the
//! channel into the notifier.
//!
//! Records emitted by `alarm_notify` are not forwarded, otherwise a failing
//! chat API would feed its own delivery warnings back into the channel.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use alarm_notify::{notify_all, templates, Notifier};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

pub const LOG_FORWARD_CAPACITY: usize = 64;

const SKIPPED_TARGET: &str = "alarm_notify";

/// `tracing_subscriber` layer that copies WARN and above into a channel.
#[derive(Debug, Clone)]
pub struct LogForwardLayer {
    tx: mpsc::Sender<String>,
}

/// Build a layer and the receiving end of its channel.
pub fn channel(capacity: usize) -> (LogForwardLayer, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(capacity);
    (LogForwardLayer { tx }, rx)
}

impl<S: Subscriber> Layer<S> for LogForwardLayer {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let meta = event.metadata();
        // More verbose levels compare greater.
        if *meta.level() > Level::WARN || meta.target().starts_with(SKIPPED_TARGET) {
            return;
        }

        let mut fields = FieldText::default();
        event.record(&mut fields);

        let text = templates::log_record(meta.level().as_str(), &fields.finish());
        let _ = self.tx.try_send(text);
    }
}

/// Drain forwarded records to every recipient until the layer is dropped.
pub fn spawn_log_forwarder(
    mut rx: mpsc::Receiver<String>,
    notifier: Arc<dyn Notifier>,
    recipients: Arc<Vec<String>>,
    timeout: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(text) = rx.recv().await {
            notify_all(notifier.as_ref(), &recipients, &text, timeout).await;
        }
    })
}

/// `message` first, then `name=value` pairs.
#[derive(Default)]
struct FieldText {
    message: String,
    rest: Vec<String>,
}

impl FieldText {
    fn finish(self) -> String {
        let mut out = self.message;
        for pair in self.rest {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(&pair);
        }
        out
    }
}

impl Visit for FieldText {
    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = value.to_string();
        } else {
            self.rest.push(format!("{}={}", field.name(), value));
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        if field.name() == "message" {
            self.message = format!("{value:?}");
        } else {
            self.rest.push(format!("{}={:?}", field.name(), value));
        }
    }
}
