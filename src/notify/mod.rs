// src/notify/mod.rs
//! Caption building and the media-aware dispatch state machine.

pub mod telegram;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use metrics::counter;

use crate::ingest::types::ChannelPost;

/// Original text is capped well under the transport limits so the
/// translation block always fits alongside it.
pub const MAX_ORIGINAL_CHARS: usize = 800;
/// Telegram caption ceiling for media sends; plain messages allow 4096.
pub const CAPTION_LIMIT: usize = 1024;

/// Body stand-in for posts that carry only a photo.
pub const PHOTO_PLACEHOLDER: &str = "[图片消息]";
const DEGRADE_MARKER: &str = "⚠️ 图片发送失败，请前往原频道查看";
const SEPARATOR: &str = "━━━━━━━━━━━━━━━";

/// Delivery boundary. One recipient, fixed at construction.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send_text(&self, body: &str) -> Result<()>;
    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()>;
}

/// Terminal state of one dispatch. The monitor advances the watermark on
/// anything delivered; `Failed` leaves the post to be retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// Delivered as intended (with photo when the post had one).
    Sent,
    /// Photo was rejected; text went out with the degradation marker.
    SentDegraded,
    Failed,
}

impl DispatchOutcome {
    pub fn delivered(self) -> bool {
        !matches!(self, DispatchOutcome::Failed)
    }
}

/// Notification body. The translation block appears only when a translation
/// was actually produced — its absence tells the reader the source was
/// already in the target language (or translation was skipped).
pub fn build_caption(
    channel_label: &str,
    original_text: &str,
    translated: Option<&str>,
    now: DateTime<FixedOffset>,
) -> String {
    let ts = now.format("%Y-%m-%d %H:%M:%S");
    let original_display = truncate_chars(original_text, MAX_ORIGINAL_CHARS);

    match translated {
        Some(t) => format!(
            "📢 来自频道: {channel_label}\n🕐 {ts}\n{SEPARATOR}\n🌐 原文:\n{original_display}\n\n🇨🇳 中文翻译:\n{t}"
        ),
        None => format!("📢 来自频道: {channel_label}\n🕐 {ts}\n{SEPARATOR}\n{original_display}"),
    }
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() > max {
        let mut out: String = s.chars().take(max).collect();
        out.push_str("...");
        out
    } else {
        s.to_string()
    }
}

/// Send one post to the recipient.
///
/// No photo: single text send. With photo: combined photo+caption when the
/// caption fits the ceiling, else photo without caption followed by the full
/// text (both must succeed). A rejected photo send degrades — once, no
/// retry — to a marked text-only message. Transport errors are logged here
/// and folded into the outcome; they never propagate.
pub async fn dispatch(
    transport: &dyn Transport,
    post: &ChannelPost,
    translated: Option<&str>,
    now: DateTime<FixedOffset>,
) -> DispatchOutcome {
    let label = format!("@{}", post.channel);
    let original = post.text.as_deref().unwrap_or(PHOTO_PLACEHOLDER);
    let caption = build_caption(&label, original, translated, now);

    let outcome = match &post.photo_url {
        None => match transport.send_text(&caption).await {
            Ok(()) => DispatchOutcome::Sent,
            Err(e) => {
                warn_step(post, "text", &e);
                DispatchOutcome::Failed
            }
        },
        Some(url) => {
            if caption.chars().count() <= CAPTION_LIMIT {
                match transport.send_photo(url, Some(&caption)).await {
                    Ok(()) => DispatchOutcome::Sent,
                    Err(e) => {
                        warn_step(post, "photo", &e);
                        degrade_to_text(transport, post, &caption).await
                    }
                }
            } else {
                // Caption would be cut by the transport: photo first with no
                // caption, then the full text as its own message.
                match transport.send_photo(url, None).await {
                    Ok(()) => match transport.send_text(&caption).await {
                        Ok(()) => DispatchOutcome::Sent,
                        Err(e) => {
                            // Photo already reached the recipient; still a
                            // failure so the post is retried whole.
                            warn_step(post, "text-after-photo", &e);
                            DispatchOutcome::Failed
                        }
                    },
                    Err(e) => {
                        warn_step(post, "photo", &e);
                        degrade_to_text(transport, post, &caption).await
                    }
                }
            }
        }
    };

    match outcome {
        DispatchOutcome::Sent => counter!("relay_notify_sent_total").increment(1),
        DispatchOutcome::SentDegraded => counter!("relay_notify_degraded_total").increment(1),
        DispatchOutcome::Failed => counter!("relay_notify_failed_total").increment(1),
    }
    outcome
}

async fn degrade_to_text(
    transport: &dyn Transport,
    post: &ChannelPost,
    caption: &str,
) -> DispatchOutcome {
    let body = format!("{DEGRADE_MARKER}\n\n{caption}");
    match transport.send_text(&body).await {
        Ok(()) => DispatchOutcome::SentDegraded,
        Err(e) => {
            warn_step(post, "text-fallback", &e);
            DispatchOutcome::Failed
        }
    }
}

fn warn_step(post: &ChannelPost, stage: &str, error: &anyhow::Error) {
    tracing::warn!(
        channel = %post.channel,
        id = post.id,
        stage,
        error = %format!("{error:#}"),
        "send step failed"
    );
}
