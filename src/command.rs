use anyhow::{bail, Result};
use std::fmt;
use std::str::FromStr;

use tracing::{debug, info};

use crate::config::SyncConfig;
use crate::continuous::{ContinuousSync, TickOutcome};
use crate::host::{HostError, ViewHost};
use crate::sync_once::sync_views_once;

/// Result reported back to the host's UI shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutcome {
    Succeeded,
    Cancelled,
    Failed(String),
}

impl From<HostError> for CommandOutcome {
    fn from(err: HostError) -> Self {
        if err.is_cancellation() {
            CommandOutcome::Cancelled
        } else {
            CommandOutcome::Failed(err.to_string())
        }
    }
}

impl fmt::Display for CommandOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandOutcome::Succeeded => write!(f, "succeeded"),
            CommandOutcome::Cancelled => write!(f, "cancelled"),
            CommandOutcome::Failed(message) => write!(f, "failed: {message}"),
        }
    }
}

/// Actions exposed to the host UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncCommand {
    /// One-shot sync of all open views to the active view.
    SyncNow,
    /// Toggle continuous background sync.
    SyncContinuously,
}

impl SyncCommand {
    pub fn label(self) -> &'static str {
        match self {
            SyncCommand::SyncNow => "Sync Views",
            SyncCommand::SyncContinuously => "Sync Views Continuously",
        }
    }
}

impl FromStr for SyncCommand {
    type Err = anyhow::Error;

    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_lowercase().as_str() {
            "sync-now" | "now" | "once" => Ok(SyncCommand::SyncNow),
            "toggle" | "continuous" | "sync-continuously" => Ok(SyncCommand::SyncContinuously),
            other => bail!("Unknown command '{other}'. Use sync-now or toggle."),
        }
    }
}

/// Commands are offered only for an open project document.
pub fn is_available<H: ViewHost + ?Sized>(host: &H) -> bool {
    host.active_document().is_some_and(|doc| !doc.is_family)
}

/// Per-process command surface: owns the configuration and the continuous-sync state.
#[derive(Debug, Default)]
pub struct ViewSyncApp {
    config: SyncConfig,
    continuous: ContinuousSync,
}

impl ViewSyncApp {
    pub fn new(config: SyncConfig) -> Self {
        Self { config, continuous: ContinuousSync::Idle }
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn continuous(&self) -> &ContinuousSync {
        &self.continuous
    }

    pub fn is_continuous_active(&self) -> bool {
        self.continuous.is_running()
    }

    pub fn execute<H: ViewHost + ?Sized>(&mut self, host: &mut H, command: SyncCommand) -> CommandOutcome {
        // Turning continuous sync off stays possible even after the document went away.
        let turning_off = command == SyncCommand::SyncContinuously && self.continuous.is_running();
        if !turning_off && !is_available(&*host) {
            let document = host.active_document().map(|doc| doc.title);
            debug!(command = command.label(), ?document, "command unavailable without a project document");
            return CommandOutcome::Cancelled;
        }
        let outcome = match command {
            SyncCommand::SyncNow => sync_views_once(host, &self.config),
            SyncCommand::SyncContinuously => self.continuous.toggle(host, &self.config),
        };
        info!(command = command.label(), %outcome, "command finished");
        outcome
    }

    /// Idle callback entry point; `None` while continuous sync is off.
    pub fn on_idle<H: ViewHost + ?Sized>(&mut self, host: &mut H) -> Option<TickOutcome> {
        self.continuous.tick(host)
    }
}
