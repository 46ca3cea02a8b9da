// src/translate.rs
//
// Translation boundary. `translate` returns `None` both when translation is
// unnecessary (text already in the target language) and when the backend
// fails; callers cannot and must not distinguish the two.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

const TRANSLATE_ENDPOINT: &str = "https://translate.googleapis.com/translate_a/single";
const TRANSLATE_TIMEOUT: Duration = Duration::from_secs(15);

#[async_trait]
pub trait Translator: Send + Sync {
    /// `Some(translated)` when a translation was produced, `None` otherwise.
    /// Never errors: a failed call degrades to "no translation".
    async fn translate(&self, text: &str) -> Option<String>;
}

/// Share of CJK ideographs among non-whitespace chars. Text past 0.5 is
/// treated as already-Chinese and skipped when the target is a zh variant.
pub fn is_mostly_chinese(text: &str) -> bool {
    let total = text.chars().filter(|c| !c.is_whitespace()).count();
    if total == 0 {
        return true;
    }
    let cjk = text
        .chars()
        .filter(|c| ('\u{4e00}'..='\u{9fff}').contains(c))
        .count();
    cjk as f64 / total as f64 > 0.5
}

/// Unauthenticated Google Translate web endpoint (`client=gtx`). The reply
/// is a nested JSON array; segment texts live at `[0][n][0]`.
pub struct GoogleTranslator {
    client: reqwest::Client,
    target: String,
}

impl GoogleTranslator {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            target: target.into(),
        }
    }

    async fn call(&self, text: &str) -> anyhow::Result<Option<String>> {
        let resp = self
            .client
            .get(TRANSLATE_ENDPOINT)
            .query(&[
                ("client", "gtx"),
                ("sl", "auto"),
                ("tl", self.target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .timeout(TRANSLATE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        let body: Value = resp.json().await?;
        Ok(join_segments(&body))
    }
}

fn join_segments(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let mut out = String::new();
    for seg in segments {
        if let Some(piece) = seg.get(0).and_then(Value::as_str) {
            out.push_str(piece);
        }
    }
    let out = out.trim().to_string();
    if out.is_empty() {
        None
    } else {
        Some(out)
    }
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str) -> Option<String> {
        if text.trim().is_empty() {
            return None;
        }
        if self.target.starts_with("zh") && is_mostly_chinese(text) {
            return None;
        }
        match self.call(text).await {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(error = %format!("{e:#}"), "translation failed, relaying original only");
                None
            }
        }
    }
}
