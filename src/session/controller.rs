use anyhow::{anyhow, bail, Context, Result};
use log::info;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::db::Database;
use crate::engine::HintEngine;

use super::events::InputEvent;
use super::loop_worker::{session_loop, SessionReport};

const EVENT_QUEUE_DEPTH: usize = 256;

/// Owns the tick loop task of at most one active session.
pub struct SessionController {
    handle: Option<JoinHandle<Result<SessionReport>>>,
    cancel_token: Option<CancellationToken>,
    events_tx: Option<mpsc::Sender<InputEvent>>,
    session_id: Option<String>,
}

impl SessionController {
    pub fn new() -> Self {
        Self {
            handle: None,
            cancel_token: None,
            events_tx: None,
            session_id: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.handle.is_some()
    }

    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Spawn the tick loop for `engine`. Returns the new session id.
    pub fn start(&mut self, engine: HintEngine, db: Database) -> Result<String> {
        if self.handle.is_some() {
            bail!("session already active");
        }

        let session_id = Uuid::new_v4().to_string();
        let cancel_token = CancellationToken::new();
        let (events_tx, events_rx) = mpsc::channel(EVENT_QUEUE_DEPTH);

        let handle = tokio::spawn(session_loop(
            session_id.clone(),
            engine,
            db,
            events_rx,
            cancel_token.clone(),
        ));

        info!("session {} started", session_id);
        self.handle = Some(handle);
        self.cancel_token = Some(cancel_token);
        self.events_tx = Some(events_tx);
        self.session_id = Some(session_id.clone());
        Ok(session_id)
    }

    /// A sender for feeding the active session from another task.
    pub fn sender(&self) -> Option<mpsc::Sender<InputEvent>> {
        self.events_tx.clone()
    }

    pub async fn send(&self, event: InputEvent) -> Result<()> {
        let Some(tx) = &self.events_tx else {
            bail!("no active session");
        };
        tx.send(event)
            .await
            .map_err(|_| anyhow!("session loop is no longer receiving events"))
    }

    /// Cancel the loop and wait for it to persist its state.
    pub async fn stop(&mut self) -> Result<SessionReport> {
        let Some(handle) = self.handle.take() else {
            bail!("no active session");
        };

        if let Some(token) = self.cancel_token.take() {
            token.cancel();
        }
        self.events_tx = None;
        self.session_id = None;

        handle.await.context("session loop task failed to join")?
    }

    /// Wait for a loop that ends on its own, e.g. after its senders closed.
    pub async fn join(&mut self) -> Result<SessionReport> {
        self.events_tx = None;
        let Some(handle) = self.handle.take() else {
            bail!("no active session");
        };
        self.cancel_token = None;
        self.session_id = None;

        handle.await.context("session loop task failed to join")?
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new()
    }
}
