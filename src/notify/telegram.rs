// src/notify/telegram.rs
use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use super::Transport;

const SEND_TIMEOUT: Duration = Duration::from_secs(15);

/// Bot API transport: `sendMessage` / `sendPhoto` against one chat.
/// Success is HTTP 200 *and* `"ok": true` in the reply body; anything else
/// surfaces the API description for the caller's log line. No retries here —
/// the dispatcher's fallback is deterministic by design.
pub struct TelegramBot {
    api_base: String,
    chat_id: i64,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct ApiReply {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

impl TelegramBot {
    pub fn new(token: &str, chat_id: i64) -> Self {
        Self::with_api_base(format!("https://api.telegram.org/bot{token}"), chat_id)
    }

    /// Base override for tests pointed at a local server.
    pub fn with_api_base(api_base: impl Into<String>, chat_id: i64) -> Self {
        Self {
            api_base: api_base.into(),
            chat_id,
            client: Client::new(),
        }
    }

    async fn call(&self, method: &str, payload: serde_json::Value) -> Result<()> {
        let url = format!("{}/{}", self.api_base, method);
        let resp = self
            .client
            .post(&url)
            .timeout(SEND_TIMEOUT)
            .json(&payload)
            .send()
            .await
            .with_context(|| format!("telegram {method} request"))?;

        let status = resp.status();
        let body = resp
            .text()
            .await
            .with_context(|| format!("telegram {method} body"))?;
        let reply: Option<ApiReply> = serde_json::from_str(&body).ok();

        if status.is_success() && reply.as_ref().is_some_and(|r| r.ok) {
            return Ok(());
        }
        let detail = reply
            .and_then(|r| r.description)
            .unwrap_or_else(|| body.chars().take(200).collect());
        bail!("telegram {method} rejected (status {status}): {detail}");
    }
}

#[async_trait]
impl Transport for TelegramBot {
    async fn send_text(&self, body: &str) -> Result<()> {
        self.call(
            "sendMessage",
            json!({ "chat_id": self.chat_id, "text": body }),
        )
        .await
    }

    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()> {
        let mut payload = json!({ "chat_id": self.chat_id, "photo": photo_url });
        if let Some(c) = caption {
            payload["caption"] = json!(c);
        }
        self.call("sendPhoto", payload).await
    }
}
