//! channel-relay — Binary Entrypoint
//! Watches public Telegram channels and relays new posts (translated when
//! needed) to one chat via the Bot API.
//!
//! Modes:
//!   channel-relay                   single check
//!   channel-relay --loop            continuous monitoring
//!   channel-relay --duration 240    loop for N seconds, then exit (cron use)

use anyhow::{bail, Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use channel_relay::config::Config;
use channel_relay::ingest::telegram_web::TelegramWebSource;
use channel_relay::monitor::Monitor;
use channel_relay::notify::telegram::TelegramBot;
use channel_relay::translate::GoogleTranslator;
use channel_relay::watermark::WatermarkStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Once,
    Loop,
    Duration(u64),
}

fn parse_mode(args: &[String]) -> Result<Mode> {
    match args.first().map(String::as_str) {
        None => Ok(Mode::Once),
        Some("--loop") => Ok(Mode::Loop),
        Some("--duration") => {
            let secs = args
                .get(1)
                .context("--duration requires a seconds argument")?
                .parse::<u64>()
                .context("--duration seconds must be an integer")?;
            Ok(Mode::Duration(secs))
        }
        Some(other) => bail!("unknown argument: {other} (expected --loop or --duration <secs>)"),
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("channel_relay=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env in local/dev; no-op when vars come from the real environment.
    let _ = dotenvy::dotenv();
    init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let mode = parse_mode(&args)?;
    let cfg = Config::from_env().context("loading configuration")?;

    let store = WatermarkStore::load(&cfg.state_path).await;
    let source = Box::new(TelegramWebSource::new());
    let translator = Box::new(GoogleTranslator::new(&cfg.target_lang));
    let transport = Box::new(TelegramBot::new(&cfg.bot_token, cfg.chat_id));

    let mut monitor = Monitor::new(cfg, source, translator, transport, store);
    match mode {
        Mode::Once => monitor.run_cycle().await,
        Mode::Loop => monitor.run_forever().await,
        Mode::Duration(secs) => monitor.run_for_duration(secs).await,
    }
    Ok(())
}
