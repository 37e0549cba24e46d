//! Telegram Bot API client and the subset of update types the daemon reads.
//!
//! The bot token is part of every request URL, so transport errors are
//! stripped of their URL before they are surfaced.

use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};

use crate::Notifier;

const DEFAULT_BASE_URL: &str = "https://api.telegram.org";
const PARSE_MODE: &str = "Markdown";

// ---------------------------------------------------------------------------
// Inbound update types
// ---------------------------------------------------------------------------

/// One webhook update. Only message updates are of interest.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Update {
    pub update_id: i64,
    #[serde(default)]
    pub message: Option<Message>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub chat: Chat,
    #[serde(default)]
    pub from: Option<User>,
    #[serde(default)]
    pub text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub username: Option<String>,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Response envelope shared by every Bot API method.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    result: Option<T>,
    #[serde(default)]
    description: Option<String>,
}

/// Async Telegram Bot API client.
///
/// Token is supplied by the caller from config; it is never logged and
/// `Debug` redacts it.
#[derive(Clone)]
pub struct TelegramClient {
    token: String,
    http: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for TelegramClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramClient")
            .field("token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl TelegramClient {
    pub fn new(token: String) -> Self {
        Self::new_with_base_url(token, DEFAULT_BASE_URL.to_string())
    }

    pub fn new_with_base_url(token: String, base_url: String) -> Self {
        Self {
            token,
            http: reqwest::Client::new(),
            base_url,
        }
    }

    /// Bound every Bot API request (connect through body) by `timeout`.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Result<Self> {
        self.http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| anyhow!("telegram http client build failed: {}", e.without_url()))?;
        Ok(self)
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/bot{}/{}", self.base_url.trim_end_matches('/'), self.token, method)
    }

    async fn call<T: DeserializeOwned>(&self, method: &str, body: &Value) -> Result<T> {
        let resp = self
            .http
            .post(self.method_url(method))
            .json(body)
            .send()
            .await
            .map_err(|e| anyhow!("telegram {} request failed: {}", method, e.without_url()))?;

        let status = resp.status();
        let envelope: ApiResponse<T> = resp
            .json()
            .await
            .map_err(|e| anyhow!("telegram {} response decode failed: {}", method, e.without_url()))?;

        if !status.is_success() || !envelope.ok {
            bail!(
                "telegram {} failed status={} description={}",
                method,
                status.as_u16(),
                envelope.description.as_deref().unwrap_or("unknown")
            );
        }

        envelope
            .result
            .with_context(|| format!("telegram {} returned no result", method))
    }

    /// `sendMessage` with Markdown parse mode.
    pub async fn send_message(&self, chat_id: &str, text: &str, reply_to: Option<i64>) -> Result<()> {
        let mut body = json!({
            "chat_id": chat_id,
            "text": text,
            "parse_mode": PARSE_MODE,
        });
        if let Some(id) = reply_to {
            body["reply_to_message_id"] = json!(id);
        }
        let _: Value = self.call("sendMessage", &body).await?;
        Ok(())
    }

    /// `getMe`: the bot's own user record.
    pub async fn get_me(&self) -> Result<User> {
        self.call("getMe", &json!({})).await
    }

    /// `setMyCommands` from `(command, description)` pairs.
    pub async fn set_my_commands(&self, commands: &[(&str, &str)]) -> Result<()> {
        let list: Vec<Value> = commands
            .iter()
            .map(|(command, description)| json!({ "command": command, "description": description }))
            .collect();
        let _: bool = self.call("setMyCommands", &json!({ "commands": list })).await?;
        Ok(())
    }

    /// `setWebhook` to `url`, replacing any previous webhook.
    pub async fn set_webhook(&self, url: &str) -> Result<()> {
        let _: bool = self.call("setWebhook", &json!({ "url": url })).await?;
        Ok(())
    }
}

#[async_trait::async_trait]
impl Notifier for TelegramClient {
    fn channel_name(&self) -> &'static str {
        "telegram"
    }

    async fn send(&self, recipient: &str, text: &str) -> Result<()> {
        self.send_message(recipient, text, None).await
    }

    async fn reply(&self, recipient: &str, text: &str, reply_to: i64) -> Result<()> {
        self.send_message(recipient, text, Some(reply_to)).await
    }
}
