// src/config.rs
//
// All runtime configuration comes from the environment (`.env` is loaded by
// main). Missing required vars are the only fatal startup condition.
//
// Channel list resolution:
//   1) $CHANNELS             comma-separated usernames, `@` optional
//   2) $CHANNELS_PATH        TOML file with `channels = [...]`
//   3) config/channels.toml

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, FixedOffset, Utc};

const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
const DEFAULT_TARGET_LANG: &str = "zh-CN";
const DEFAULT_TZ_OFFSET_HOURS: i32 = 8;
const DEFAULT_STATE_PATH: &str = "state/watermarks.json";
const ENV_CHANNELS_PATH: &str = "CHANNELS_PATH";

#[derive(Debug, Clone)]
pub struct Config {
    pub bot_token: String,
    pub chat_id: i64,
    pub channels: Vec<String>,
    pub poll_interval: Duration,
    pub target_lang: String,
    pub tz_offset_hours: i32,
    pub state_path: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let bot_token = require("BOT_TOKEN")?;
        let chat_id = require("CHAT_ID")?
            .parse::<i64>()
            .context("CHAT_ID must be an integer chat identifier")?;

        let channels = match std::env::var("CHANNELS") {
            Ok(raw) if !raw.trim().is_empty() => parse_channel_list(&raw),
            _ => load_channels_file()?,
        };
        if channels.is_empty() {
            return Err(anyhow!(
                "no channels configured: set CHANNELS (see .env.example) or provide config/channels.toml"
            ));
        }

        let poll_interval = Duration::from_secs(
            std::env::var("POLL_INTERVAL")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_POLL_INTERVAL_SECS),
        );
        let target_lang =
            std::env::var("TARGET_LANG").unwrap_or_else(|_| DEFAULT_TARGET_LANG.to_string());
        let tz_offset_hours = std::env::var("TZ_OFFSET_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_TZ_OFFSET_HOURS);
        if !(-23..=23).contains(&tz_offset_hours) {
            return Err(anyhow!("TZ_OFFSET_HOURS out of range: {tz_offset_hours}"));
        }
        let state_path = std::env::var("STATE_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_STATE_PATH));

        Ok(Self {
            bot_token,
            chat_id,
            channels,
            poll_interval,
            target_lang,
            tz_offset_hours,
            state_path,
        })
    }

    pub fn tz(&self) -> FixedOffset {
        // Range-checked in from_env; 0 only as a belt for hand-built configs.
        FixedOffset::east_opt(self.tz_offset_hours * 3600)
            .unwrap_or_else(|| FixedOffset::east_opt(0).expect("UTC offset"))
    }

    /// Wall clock in the recipient's zone, used for caption timestamps.
    pub fn local_now(&self) -> DateTime<FixedOffset> {
        Utc::now().with_timezone(&self.tz())
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .with_context(|| format!("missing required env var {name} (see .env.example)"))
}

/// `a, @b ,,c` → `["a", "b", "c"]`. Order preserved; that is the polling order.
pub fn parse_channel_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|c| c.trim().trim_start_matches('@').to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

fn load_channels_file() -> Result<Vec<String>> {
    if let Ok(p) = std::env::var(ENV_CHANNELS_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return parse_channels_toml_file(&pb);
        }
        return Err(anyhow!("CHANNELS_PATH points to non-existent path"));
    }
    let default = Path::new("config/channels.toml");
    if default.exists() {
        return parse_channels_toml_file(default);
    }
    Ok(Vec::new())
}

fn parse_channels_toml_file(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("reading channels from {}", path.display()))?;
    parse_channels_toml(&content)
}

fn parse_channels_toml(s: &str) -> Result<Vec<String>> {
    #[derive(serde::Deserialize)]
    struct ChannelsFile {
        channels: Vec<String>,
    }
    let v: ChannelsFile = toml::from_str(s).context("parsing channels file")?;
    Ok(v.channels
        .iter()
        .flat_map(|c| parse_channel_list(c))
        .collect())
}
