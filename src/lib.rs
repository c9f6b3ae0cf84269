pub mod config;
pub mod db;
pub mod engine;
pub mod host;
pub mod metrics;
pub mod models;
pub mod ranking;
pub mod risk;
pub mod selection;
pub mod session;
pub mod settings;
pub mod tracking;
mod utils;

use std::time::Instant;

use anyhow::{Context, Result};
use log::{info, warn};
use tokio::io::{AsyncBufReadExt, BufReader};

use config::RuntimeConfig;
use db::Database;
use engine::HintEngine;
use host::{JsonLineExecutor, JsonLineSink, LineWriter};
use session::{InputEvent, SessionController};
use settings::SettingsStore;

/// Headless entry point: JSON-line input events on stdin, JSON-line engine
/// events and host commands on stdout, logs on stderr.
pub fn run() -> Result<()> {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    info!("steadyhint starting up...");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to build tokio runtime")?;
    runtime.block_on(serve(RuntimeConfig::from_env()))
}

async fn serve(config: RuntimeConfig) -> Result<()> {
    std::fs::create_dir_all(&config.data_dir).with_context(|| {
        format!("failed to create data directory {}", config.data_dir.display())
    })?;

    let settings_store = SettingsStore::new(config.settings_path())?;
    let database = Database::new(config.database_path())?;

    let weights = match database.load_weights().await? {
        Some(stored) => {
            info!(
                "loaded learned weights ({} feedback events)",
                stored.feedback_events
            );
            stored.weights
        }
        None => Default::default(),
    };

    let writer = LineWriter::stdout();
    let mut engine = HintEngine::new(
        settings_store.get(),
        weights,
        Box::new(JsonLineExecutor::new(writer.clone())),
        Box::new(JsonLineSink::new(writer)),
        Instant::now(),
    );
    engine.set_checkpoint_every(config.checkpoint_every());

    let mut session = SessionController::new();
    session.start(engine, database)?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        let line = tokio::select! {
            line = lines.next_line() => line.context("failed to read stdin")?,
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                None
            }
        };
        let Some(line) = line else {
            break;
        };
        if line.trim().is_empty() {
            continue;
        }

        let event: InputEvent = match serde_json::from_str(&line) {
            Ok(event) => event,
            Err(err) => {
                warn!("skipping malformed input line: {err}");
                continue;
            }
        };

        if let InputEvent::Settings { settings } = &event {
            if let Err(err) = settings_store.update(settings.clone()) {
                warn!("settings rejected: {err:#}");
                continue;
            }
        }

        session.send(event).await?;
    }

    let report = session.stop().await?;
    info!(
        "session {} ended after {} ms with {} selections",
        report.session_id,
        report.metrics.session_duration_ms,
        report.metrics.selections.len()
    );
    Ok(())
}
