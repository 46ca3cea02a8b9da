//! Demo that pushes a couple of sample posts through the dispatcher against
//! a stdout transport (nothing leaves the machine).

use anyhow::Result;
use async_trait::async_trait;
use chrono::{FixedOffset, Utc};

use channel_relay::notify::{self, Transport};
use channel_relay::ChannelPost;

struct StdoutTransport;

#[async_trait]
impl Transport for StdoutTransport {
    async fn send_text(&self, body: &str) -> Result<()> {
        println!("--- sendMessage ---\n{body}\n");
        Ok(())
    }

    async fn send_photo(&self, photo_url: &str, caption: Option<&str>) -> Result<()> {
        println!(
            "--- sendPhoto {photo_url} ---\n{}\n",
            caption.unwrap_or("(no caption)")
        );
        Ok(())
    }
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_target(false).init();
    let transport = StdoutTransport;
    let now = Utc::now().with_timezone(&FixedOffset::east_opt(8 * 3600).expect("offset"));

    let text_post = ChannelPost::new(
        "demo_channel",
        101,
        Some("The central bank held rates steady today.".into()),
        None,
    )
    .expect("demo post");
    let outcome = notify::dispatch(&transport, &text_post, Some("央行今日维持利率不变。"), now).await;
    println!("text post outcome: {outcome:?}");

    let photo_post = ChannelPost::new(
        "demo_channel",
        102,
        None,
        Some("https://example.test/photo.jpg".into()),
    )
    .expect("demo post");
    let outcome = notify::dispatch(&transport, &photo_post, None, now).await;
    println!("photo post outcome: {outcome:?}");

    println!("notify-demo done");
}
