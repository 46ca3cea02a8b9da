// src/change_detector.rs
//! Pure new-post detection. No I/O; the monitor owns fetching and the
//! watermark advance.

use crate::ingest::types::ChannelPost;

/// Outcome of comparing one fetched batch against the stored watermark.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// First sight of the channel: record `latest`, report nothing.
    /// Avoids replaying the whole visible history on first run.
    Bootstrap { latest: i64 },
    /// Genuinely new posts, ascending by id.
    Fresh(Vec<ChannelPost>),
    /// Empty fetch or nothing past the watermark.
    Quiet,
}

/// The source gives no ordering guarantee, so the batch is sorted ascending
/// before comparison. An empty fetch is a no-op, never an error.
pub fn detect(last_seen: Option<i64>, mut posts: Vec<ChannelPost>) -> Detection {
    if posts.is_empty() {
        return Detection::Quiet;
    }
    posts.sort_by_key(|p| p.id);

    let Some(latest) = posts.last().map(|p| p.id) else {
        return Detection::Quiet;
    };

    match last_seen {
        None => Detection::Bootstrap { latest },
        Some(mark) => {
            posts.retain(|p| p.id > mark);
            if posts.is_empty() {
                Detection::Quiet
            } else {
                Detection::Fresh(posts)
            }
        }
    }
}
