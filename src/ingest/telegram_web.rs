// src/ingest/telegram_web.rs
//
// Source adapter for the public channel preview pages at `t.me/s/<channel>`.
// The page is server-rendered HTML; no auth, no API token. Parsing is
// regex-based over the handful of stable widget classes.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;

use crate::ingest::html_fragment_to_text;
use crate::ingest::types::{ChannelPost, ChannelSource};

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";
const FETCH_TIMEOUT: Duration = Duration::from_secs(15);

/// Extract posts from one preview page. Pure, so tests can feed fixture HTML.
///
/// Entries with neither text nor photo (service rows, stripped media types)
/// are dropped here, before they reach the pipeline.
pub fn parse_channel_page(channel: &str, html: &str) -> Vec<ChannelPost> {
    static RE_POST_ID: OnceCell<Regex> = OnceCell::new();
    let re_post_id = RE_POST_ID.get_or_init(|| Regex::new(r#"data-post="[^"]*/(\d+)""#).unwrap());

    static RE_PHOTO: OnceCell<Regex> = OnceCell::new();
    let re_photo = RE_PHOTO.get_or_init(|| {
        Regex::new(
            r#"class="[^"]*tgme_widget_message_photo_wrap[^"]*"[^>]*background-image:url\('?([^')]+)'?\)"#,
        )
        .unwrap()
    });

    static RE_REPLY: OnceCell<Regex> = OnceCell::new();
    let re_reply = RE_REPLY
        .get_or_init(|| Regex::new(r#"(?is)<a class="tgme_widget_message_reply[^"]*"[^>]*>.*?</a>"#).unwrap());

    static RE_TEXT: OnceCell<Regex> = OnceCell::new();
    let re_text = RE_TEXT
        .get_or_init(|| Regex::new(r#"(?is)class="tgme_widget_message_text[^"]*"[^>]*>(.*?)</div>"#).unwrap());

    let mut posts = Vec::new();
    for chunk in html.split("tgme_widget_message_wrap").skip(1) {
        let Some(id) = re_post_id
            .captures(chunk)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().parse::<i64>().ok())
        else {
            continue;
        };

        let photo_url = re_photo
            .captures(chunk)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().to_string());

        // Quoted replies carry their own text div; drop them so the quoted
        // content does not leak into the post body.
        let without_replies = re_reply.replace_all(chunk, "");
        let text = re_text
            .captures(&without_replies)
            .and_then(|c| c.get(1))
            .map(|m| html_fragment_to_text(m.as_str()));

        if let Some(post) = ChannelPost::new(channel, id, text, photo_url) {
            posts.push(post);
        }
    }
    posts
}

pub struct TelegramWebSource {
    base_url: String,
    client: reqwest::Client,
}

impl TelegramWebSource {
    pub fn new() -> Self {
        Self::with_base_url("https://t.me")
    }

    /// Base override for tests pointed at a local server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            client: reqwest::Client::new(),
        }
    }
}

impl Default for TelegramWebSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChannelSource for TelegramWebSource {
    async fn fetch(&self, channel: &str) -> Result<Vec<ChannelPost>> {
        let url = format!("{}/s/{}", self.base_url, channel);
        let resp = self
            .client
            .get(&url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .send()
            .await
            .with_context(|| format!("fetching {url}"))?
            .error_for_status()
            .with_context(|| format!("fetching {url}"))?;
        let body = resp.text().await.context("reading channel page body")?;
        Ok(parse_channel_page(channel, &body))
    }

    fn name(&self) -> &'static str {
        "telegram-web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn photo_url_is_pulled_from_style() {
        let html = r#"
            <div class="tgme_widget_message_wrap js-widget_message_wrap">
              <div class="tgme_widget_message" data-post="somechan/42">
                <a class="tgme_widget_message_photo_wrap abc"
                   style="width:480px;background-image:url('https://cdn.test/42.jpg')"></a>
              </div>
            </div>"#;
        let posts = parse_channel_page("somechan", html);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].id, 42);
        assert_eq!(posts[0].photo_url.as_deref(), Some("https://cdn.test/42.jpg"));
        assert!(posts[0].text.is_none());
    }

    #[test]
    fn malformed_post_id_is_skipped() {
        let html = r#"
            <div class="tgme_widget_message_wrap">
              <div class="tgme_widget_message" data-post="somechan/oops">
                <div class="tgme_widget_message_text">hello</div>
              </div>
            </div>"#;
        assert!(parse_channel_page("somechan", html).is_empty());
    }

    #[test]
    fn reply_quote_does_not_leak_into_text() {
        let html = r#"
            <div class="tgme_widget_message_wrap">
              <div class="tgme_widget_message" data-post="somechan/7">
                <a class="tgme_widget_message_reply" href="https://t.me/somechan/6">
                  <div class="tgme_widget_message_text">quoted stuff</div>
                </a>
                <div class="tgme_widget_message_text js-message_text" dir="auto">actual reply</div>
              </div>
            </div>"#;
        let posts = parse_channel_page("somechan", html);
        assert_eq!(posts.len(), 1);
        assert_eq!(posts[0].text.as_deref(), Some("actual reply"));
    }
}
