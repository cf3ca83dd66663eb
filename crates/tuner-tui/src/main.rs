mod action;
mod app;
mod app_state;
mod component;
mod components;
mod theme;
mod transport;
mod widgets;

use std::sync::Arc;

use tuner_core::config::Config;
use tuner_core::platform;
use tuner_core::session::PlayerSession;
use tuner_core::source::{RemoteSource, Source, StaticSource};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let data_dir = platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("tuner.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; suppress noisy connection-level DEBUG from
    // HTTP client internals.
    let log_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        "info,tuner_core=debug,tuner_tui=debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string()
    });
    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_env_filter(log_filter.as_str())
        .with_ansi(false)
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("tuner log: {}", log_path.display());
    tracing::info!("tuner starting…");

    let config = Config::load().unwrap_or_default();

    let source = Arc::new(match &config.catalog.remote_url {
        Some(url) => Source::Remote(RemoteSource::new(url.clone())),
        None => Source::Static(StaticSource::new()),
    });

    // Kick off the load; the UI observes readiness through the state watch.
    let loader = source.clone();
    tokio::spawn(async move {
        if let Err(e) = loader.load().await {
            tracing::warn!("catalog load failed: {}", e);
        }
    });

    let session = Arc::new(PlayerSession::new());
    let cmd_tx = transport::start(source.clone(), session.clone(), config.player.volume);

    let app = app::App::new(source, session, cmd_tx, data_dir.join("state.json"));
    app.run().await?;

    Ok(())
}
