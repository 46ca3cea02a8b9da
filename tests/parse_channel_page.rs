// tests/parse_channel_page.rs
use channel_relay::ingest::telegram_web::parse_channel_page;

#[test]
fn fixture_page_yields_posts_with_content_only() {
    let html = include_str!("fixtures/channel_page.html");
    let posts = parse_channel_page("relaytest", html);

    // 104 is a round-video-only row: no text, no photo — dropped.
    let ids: Vec<i64> = posts.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![101, 102, 103, 105]);
    assert!(posts.iter().all(|p| p.channel == "relaytest"));
}

#[test]
fn text_is_unescaped_with_line_breaks() {
    let html = include_str!("fixtures/channel_page.html");
    let posts = parse_channel_page("relaytest", html);

    let first = posts.iter().find(|p| p.id == 101).unwrap();
    assert_eq!(
        first.text.as_deref(),
        Some("Breaking: rates held steady.\nMore details to follow & a briefing at noon.")
    );
    assert!(first.photo_url.is_none());
}

#[test]
fn photo_posts_carry_the_cdn_url() {
    let html = include_str!("fixtures/channel_page.html");
    let posts = parse_channel_page("relaytest", html);

    let combined = posts.iter().find(|p| p.id == 102).unwrap();
    assert_eq!(combined.text.as_deref(), Some("Chart of the day"));
    assert_eq!(
        combined.photo_url.as_deref(),
        Some("https://cdn4.telesco.pe/file/abc102.jpg")
    );

    let photo_only = posts.iter().find(|p| p.id == 103).unwrap();
    assert!(photo_only.text.is_none());
    assert_eq!(
        photo_only.photo_url.as_deref(),
        Some("https://cdn4.telesco.pe/file/abc103.jpg")
    );
}

#[test]
fn quoted_reply_text_is_not_mistaken_for_the_post_body() {
    let html = include_str!("fixtures/channel_page.html");
    let posts = parse_channel_page("relaytest", html);

    let reply = posts.iter().find(|p| p.id == 105).unwrap();
    assert_eq!(
        reply.text.as_deref(),
        Some("Follow-up: briefing moved to 1pm.")
    );
}

#[test]
fn unrelated_pages_parse_to_nothing() {
    assert!(parse_channel_page("relaytest", "<html><body>404</body></html>").is_empty());
    assert!(parse_channel_page("relaytest", "").is_empty());
}
