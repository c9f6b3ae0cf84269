use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use tokio::sync::mpsc;
use tokio::time::{Duration, Interval, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::db::Database;
use crate::engine::HintEngine;
use crate::metrics::SessionMetrics;
use crate::models::WeightVector;

use super::events::{apply_event, InputEvent};

// Set to true to enable verbose logging in this module
const ENABLE_LOGS: bool = true;

use crate::{log_debug, log_error, log_info};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionReport {
    pub session_id: String,
    pub metrics: SessionMetrics,
    pub weights: WeightVector,
    pub feedback_events: u64,
}

fn now() -> std::time::Instant {
    tokio::time::Instant::now().into_std()
}

fn new_ticker(period: Duration) -> Interval {
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker
}

/// Drive `engine` until cancelled or until every event sender is gone, then
/// persist the learned weights and the session metrics.
pub async fn session_loop(
    session_id: String,
    mut engine: HintEngine,
    db: Database,
    mut events_rx: mpsc::Receiver<InputEvent>,
    cancel_token: CancellationToken,
) -> Result<SessionReport> {
    let mut period = engine.settings().tick_interval();
    let mut ticker = new_ticker(period);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(ranked) = engine.tick(now()) {
                    log_debug!("session {} showing {} predictions", session_id, ranked.len());
                }
            }
            event = events_rx.recv() => {
                let Some(event) = event else {
                    log_info!("event channel closed, ending session {}", session_id);
                    break;
                };
                apply_event(&mut engine, event, now());

                let wanted = engine.settings().tick_interval();
                if wanted != period {
                    log_info!("tick interval {:?} -> {:?}", period, wanted);
                    period = wanted;
                    ticker = new_ticker(period);
                }
            }
            _ = cancel_token.cancelled() => {
                log_info!("session loop shutting down");
                break;
            }
        }

        if let Some(weights) = engine.take_checkpoint() {
            if let Err(err) = db.save_weights(weights, engine.feedback_events()).await {
                log_error!("weight checkpoint failed for session {}: {err:?}", session_id);
            }
        }
    }

    finish(session_id, engine, &db).await
}

async fn finish(session_id: String, engine: HintEngine, db: &Database) -> Result<SessionReport> {
    let report = SessionReport {
        metrics: engine.metrics(now()),
        weights: engine.weights(),
        feedback_events: engine.feedback_events(),
        session_id,
    };

    db.save_weights(report.weights, report.feedback_events)
        .await
        .context("failed to persist learned weights")?;
    db.insert_session_metrics(&report.session_id, &report.metrics, Utc::now())
        .await
        .context("failed to persist session metrics")?;

    log_info!(
        "session {} finished: {} selections, {} feedback events",
        report.session_id,
        report.metrics.selections.len(),
        report.feedback_events
    );
    Ok(report)
}
