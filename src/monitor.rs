// src/monitor.rs
//! The poll orchestrator: fetch → detect → translate → dispatch → advance,
//! per channel, with per-item watermark persistence.

use std::time::Duration;

use metrics::counter;
use tokio::time::Instant;
use tracing::{info, warn};

use crate::change_detector::{detect, Detection};
use crate::config::Config;
use crate::ingest::types::{ChannelPost, ChannelSource};
use crate::notify::{self, DispatchOutcome, Transport};
use crate::translate::Translator;
use crate::watermark::WatermarkStore;

pub struct Monitor {
    cfg: Config,
    source: Box<dyn ChannelSource>,
    translator: Box<dyn Translator>,
    transport: Box<dyn Transport>,
    store: WatermarkStore,
}

impl Monitor {
    pub fn new(
        cfg: Config,
        source: Box<dyn ChannelSource>,
        translator: Box<dyn Translator>,
        transport: Box<dyn Transport>,
        store: WatermarkStore,
    ) -> Self {
        crate::ingest::ensure_metrics_described();
        Self {
            cfg,
            source,
            translator,
            transport,
            store,
        }
    }

    pub fn store(&self) -> &WatermarkStore {
        &self.store
    }

    /// One pass over every configured channel, in configured order.
    /// Channels are independent: a failure in one never touches the others.
    pub async fn run_cycle(&mut self) {
        for channel in self.cfg.channels.clone() {
            self.process_channel(&channel).await;
        }
    }

    async fn process_channel(&mut self, channel: &str) {
        let posts = match self.source.fetch(channel).await {
            Ok(posts) => posts,
            Err(e) => {
                warn!(
                    channel,
                    source = self.source.name(),
                    error = %format!("{e:#}"),
                    "fetch failed, skipping channel this cycle"
                );
                counter!("relay_fetch_errors_total").increment(1);
                return;
            }
        };
        counter!("relay_posts_seen_total").increment(posts.len() as u64);

        match detect(self.store.last_seen(channel), posts) {
            Detection::Quiet => {}
            Detection::Bootstrap { latest } => {
                self.store.advance(channel, latest);
                self.persist(channel, latest).await;
                info!(channel, latest, "channel initialized, history not replayed");
            }
            Detection::Fresh(fresh) => {
                for post in fresh {
                    self.relay_post(channel, post).await;
                }
            }
        }
    }

    async fn relay_post(&mut self, channel: &str, post: ChannelPost) {
        let translated = match post.text.as_deref() {
            Some(text) => self.translator.translate(text).await,
            None => None,
        };

        let now = self.cfg.local_now();
        let outcome =
            notify::dispatch(self.transport.as_ref(), &post, translated.as_deref(), now).await;

        match outcome {
            DispatchOutcome::Sent | DispatchOutcome::SentDegraded => {
                self.store.advance(channel, post.id);
                self.persist(channel, post.id).await;
                info!(
                    channel,
                    id = post.id,
                    translated = translated.is_some(),
                    degraded = matches!(outcome, DispatchOutcome::SentDegraded),
                    "post relayed"
                );
            }
            // Watermark untouched: the post stays "new" and is retried next
            // cycle unless a later post of this batch advances past it.
            DispatchOutcome::Failed => {
                warn!(channel, id = post.id, "dispatch failed, post left for retry");
            }
        }
    }

    async fn persist(&self, channel: &str, id: i64) {
        if let Err(e) = self.store.persist().await {
            warn!(
                channel,
                id,
                path = %self.store.path().display(),
                error = %format!("{e:#}"),
                "could not persist watermarks; a restart may replay this post"
            );
        }
    }

    /// Continuous mode. The only exit is Ctrl-C, observed between cycles —
    /// a cycle in flight always finishes.
    pub async fn run_forever(&mut self) {
        info!(
            channels = ?self.cfg.channels,
            interval_secs = self.cfg.poll_interval.as_secs(),
            "monitoring started, Ctrl-C to stop"
        );
        self.run_cycle().await;
        loop {
            tokio::select! {
                _ = tokio::time::sleep(self.cfg.poll_interval) => {}
                _ = tokio::signal::ctrl_c() => {
                    info!("interrupt received, stopping");
                    break;
                }
            }
            self.run_cycle().await;
        }
    }

    /// Bounded mode for external schedulers: immediate first cycle, then
    /// repeat on the interval until the deadline passes.
    pub async fn run_for_duration(&mut self, seconds: u64) {
        info!(
            seconds,
            interval_secs = self.cfg.poll_interval.as_secs(),
            "bounded monitoring started"
        );
        let deadline = Instant::now() + Duration::from_secs(seconds);
        self.run_cycle().await;
        while Instant::now() < deadline {
            tokio::time::sleep(self.cfg.poll_interval).await;
            self.run_cycle().await;
        }
        info!("bounded monitoring finished");
    }
}
