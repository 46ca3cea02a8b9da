// src/ingest/types.rs
use anyhow::Result;

/// One post observed on a channel's public preview page.
///
/// `id` is the per-channel message number Telegram assigns: strictly
/// increasing, unique within the channel. It is the only thing the
/// dedup logic looks at.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct ChannelPost {
    pub channel: String,
    pub id: i64,
    pub text: Option<String>,
    pub photo_url: Option<String>,
}

impl ChannelPost {
    /// Returns `None` for a post with neither text nor photo; such entries
    /// (join/pin service rows, stripped stickers) never enter the pipeline.
    pub fn new(
        channel: impl Into<String>,
        id: i64,
        text: Option<String>,
        photo_url: Option<String>,
    ) -> Option<Self> {
        let text = text.filter(|t| !t.trim().is_empty());
        let photo_url = photo_url.filter(|u| !u.is_empty());
        if text.is_none() && photo_url.is_none() {
            return None;
        }
        Some(Self {
            channel: channel.into(),
            id,
            text,
            photo_url,
        })
    }
}

#[async_trait::async_trait]
pub trait ChannelSource: Send + Sync {
    /// Fetch the current page of posts for `channel`, newest page only.
    /// No ordering guarantee; the caller sorts.
    async fn fetch(&self, channel: &str) -> Result<Vec<ChannelPost>>;
    fn name(&self) -> &'static str;
}
