//! JSON-lines bridge to an out-of-process host.
//!
//! Engine events and action commands share one writer, one JSON object per
//! line, so the host reads a single ordered stream.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::engine::{EngineEvent, RenderSink};
use crate::models::Handle;
use crate::selection::ActionExecutor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum HostAction {
    ScrollIntoView,
    Focus,
    Activate,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HostCommand {
    #[serde(rename = "type")]
    kind: &'static str,
    action: HostAction,
    handle: Handle,
}

/// Line-oriented writer shared by the sink and the executor.
pub struct LineWriter<W: Write + Send> {
    inner: Arc<Mutex<W>>,
}

impl<W: Write + Send> Clone for LineWriter<W> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl LineWriter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> LineWriter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            inner: Arc::new(Mutex::new(writer)),
        }
    }

    pub fn write_json<T: Serialize>(&self, value: &T) -> Result<()> {
        let line = serde_json::to_string(value).context("failed to encode host message")?;
        let mut writer = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        writeln!(writer, "{line}").context("failed to write host message")?;
        writer.flush().context("failed to flush host stream")
    }

    pub fn with_inner<R>(&self, f: impl FnOnce(&W) -> R) -> R {
        let guard = self
            .inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }
}

pub struct JsonLineSink<W: Write + Send> {
    writer: LineWriter<W>,
}

impl<W: Write + Send> JsonLineSink<W> {
    pub fn new(writer: LineWriter<W>) -> Self {
        Self { writer }
    }
}

impl<W: Write + Send> RenderSink for JsonLineSink<W> {
    fn emit(&mut self, event: EngineEvent) {
        if let Err(err) = self.writer.write_json(&event) {
            log::error!("dropping engine event: {err:#}");
        }
    }
}

/// Forwards actions to the host as `{"type":"command",...}` lines. A write
/// failure surfaces as a failed action.
pub struct JsonLineExecutor<W: Write + Send> {
    writer: LineWriter<W>,
}

impl<W: Write + Send> JsonLineExecutor<W> {
    pub fn new(writer: LineWriter<W>) -> Self {
        Self { writer }
    }

    fn send(&self, action: HostAction, handle: Handle) -> Result<()> {
        self.writer.write_json(&HostCommand {
            kind: "command",
            action,
            handle,
        })
    }
}

impl<W: Write + Send> ActionExecutor for JsonLineExecutor<W> {
    fn scroll_into_view(&mut self, handle: Handle) -> Result<()> {
        self.send(HostAction::ScrollIntoView, handle)
    }

    fn focus(&mut self, handle: Handle) -> Result<()> {
        self.send(HostAction::Focus, handle)
    }

    fn activate(&mut self, handle: Handle) -> Result<()> {
        self.send(HostAction::Activate, handle)
    }
}
