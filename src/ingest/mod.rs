// src/ingest/mod.rs
pub mod telegram_web;
pub mod types;

use metrics::describe_counter;
use once_cell::sync::OnceCell;

/// One-time metrics registration (no-op until a recorder is installed).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "relay_fetch_errors_total",
            "Channel page fetch/parse failures."
        );
        describe_counter!("relay_posts_seen_total", "Posts parsed from channel pages.");
        describe_counter!("relay_notify_sent_total", "Notifications delivered in full.");
        describe_counter!(
            "relay_notify_degraded_total",
            "Notifications delivered text-only after a photo rejection."
        );
        describe_counter!(
            "relay_notify_failed_total",
            "Notification attempts that failed and will be retried."
        );
    });
}

/// Turn a message-body HTML fragment into plain text.
///
/// `<br>` becomes a newline, remaining tags are stripped, entities decoded,
/// then each line is trimmed and blank lines dropped.
pub fn html_fragment_to_text(fragment: &str) -> String {
    static RE_BR: OnceCell<regex::Regex> = OnceCell::new();
    let re_br = RE_BR.get_or_init(|| regex::Regex::new(r"(?i)<br\s*/?>").unwrap());
    let with_breaks = re_br.replace_all(fragment, "\n");

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    let stripped = re_tags.replace_all(&with_breaks, "");

    let decoded = html_escape::decode_html_entities(&stripped);

    static RE_SP: OnceCell<regex::Regex> = OnceCell::new();
    let re_sp = RE_SP.get_or_init(|| regex::Regex::new(r"[ \t\u{00A0}]+").unwrap());

    decoded
        .lines()
        .map(|l| re_sp.replace_all(l, " ").trim().to_string())
        .filter(|l| !l.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}
