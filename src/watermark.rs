// src/watermark.rs
//
// The only durable state in the system: per channel, the highest post id
// that has already been relayed. Loaded once at startup, written after
// every successful per-item advance.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tokio::fs;

#[derive(Debug)]
pub struct WatermarkStore {
    path: PathBuf,
    map: BTreeMap<String, i64>,
}

impl WatermarkStore {
    /// Load from `path`. A missing, unreadable, or corrupt file degrades to
    /// an empty map — every channel then behaves as never-initialized.
    pub async fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let map = match fs::read_to_string(&path).await {
            Ok(s) => match serde_json::from_str(&s) {
                Ok(m) => m,
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "watermark file unreadable, starting from empty state"
                    );
                    BTreeMap::new()
                }
            },
            Err(_) => BTreeMap::new(),
        };
        Self { path, map }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Highest id already processed for `channel`; `None` = never initialized.
    pub fn last_seen(&self, channel: &str) -> Option<i64> {
        self.map.get(channel).copied()
    }

    /// Advance `channel` to `id`. Monotonic: an id at or below the current
    /// watermark is ignored and `false` is returned.
    pub fn advance(&mut self, channel: &str, id: i64) -> bool {
        match self.map.get(channel) {
            Some(&current) if id <= current => false,
            _ => {
                self.map.insert(channel.to_string(), id);
                true
            }
        }
    }

    /// Write the full mapping. Failure is the caller's to log; the pipeline
    /// keeps running on a failed write.
    pub async fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.as_os_str().is_empty() {
                fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("creating state dir {}", dir.display()))?;
            }
        }
        let body = serde_json::to_vec_pretty(&self.map).context("serializing watermarks")?;
        fs::write(&self.path, body)
            .await
            .with_context(|| format!("writing {}", self.path.display()))?;
        Ok(())
    }
}
