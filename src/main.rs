//! aistrail: records one vessel's AIS position reports from aisstream.io
//! into a git-backed JSON snapshot.

use std::path::PathBuf;

use anyhow::Context;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use aistrail::config::Config;
use aistrail::history::HistoryStore;
use aistrail::ingest::Ingestor;
use aistrail::sink::GitSink;
use aistrail::stream::FeedSubscriber;
use aistrail::supervisor::{IngestSession, Supervisor};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "Invalid configuration");
            eprintln!("ERROR: {e}");
            std::process::exit(1);
        }
    };

    info!(
        mmsi = %config.target_mmsi,
        feed = %config.feed_url,
        data_file = %config.data_file.display(),
        max_records = config.max_records,
        "Starting aistrail"
    );

    let store = HistoryStore::load(&config.data_file, config.max_records);
    info!(records = store.len(), "Loaded history");

    let repo_dir = match config.data_file.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    let sink = GitSink::new(repo_dir);

    let ingestor = Ingestor::new(config.target_mmsi.clone(), store, Box::new(sink));
    let session = IngestSession::new(FeedSubscriber::new(config), ingestor);
    let mut supervisor = Supervisor::new(session);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        shutdown_signal().await;
        let _ = shutdown_tx.send(true);
    });

    supervisor
        .run(shutdown_rx)
        .await
        .context("supervisor terminated")?;

    info!("Shutdown complete");
    Ok(())
}

/// Wait for SIGINT or SIGTERM.
#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigint = signal(SignalKind::interrupt()).expect("failed to install SIGINT handler");
    let mut sigterm = signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

    tokio::select! {
        _ = sigint.recv() => info!(signal = "SIGINT", "Signal received"),
        _ = sigterm.recv() => info!(signal = "SIGTERM", "Signal received"),
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Ctrl-C received");
}
