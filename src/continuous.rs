use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::command::CommandOutcome;
use crate::comparison::ComparisonPolicy;
use crate::config::SyncConfig;
use crate::host::ViewHost;
use crate::view::ViewId;
use crate::view_box::ViewBox;

/// Result of a single idle tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// The active view's framing could not be captured; nothing happened.
    Skipped,
    /// One more view was brought up to date.
    Applied { view: ViewId, new_epoch: bool },
    /// Every open view is already up to date for the current epoch.
    Settled { new_epoch: bool },
}

/// Bookkeeping for one enable/disable span of continuous sync.
#[derive(Debug)]
pub struct SyncSession {
    previous_box: ViewBox,
    synced: HashSet<ViewId>,
    cursor: usize,
    change_policy: ComparisonPolicy,
}

impl SyncSession {
    pub fn new(change_policy: ComparisonPolicy) -> Self {
        Self { previous_box: ViewBox::UNSET, synced: HashSet::new(), cursor: 0, change_policy }
    }

    pub fn previous_box(&self) -> &ViewBox {
        &self.previous_box
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_synced(&self, view: ViewId) -> bool {
        self.synced.contains(&view)
    }

    /// Detects framing changes in the active view and brings at most one other view up to date.
    pub fn tick<H: ViewHost + ?Sized>(&mut self, host: &mut H) -> TickOutcome {
        let Some(active) = host.active_view() else {
            return TickOutcome::Skipped;
        };
        let current = match ViewBox::capture(&*host, active) {
            Ok(Some(current)) => current,
            Ok(None) => return TickOutcome::Skipped,
            Err(err) => {
                warn!(view = %active, "capture failed during idle sync: {err}");
                return TickOutcome::Skipped;
            }
        };

        let new_epoch = !current.is_almost_equal_to(&self.previous_box, &self.change_policy);
        if new_epoch {
            debug!(view = %active, scalar = current.scalar(), "framing changed, starting new epoch");
            self.synced.clear();
            self.synced.insert(active);
            self.previous_box = current;
        }

        let open = match host.open_views() {
            Ok(open) => open,
            Err(err) => {
                warn!("listing open views failed during idle sync: {err}");
                return TickOutcome::Skipped;
            }
        };
        for _ in 0..open.len() {
            let index = self.cursor % open.len();
            self.cursor = index + 1;
            let view = open[index];
            if !self.synced.insert(view) {
                continue;
            }
            match self.previous_box.apply(host, view) {
                Ok(true) => {
                    debug!(view = %view, "view re-framed");
                    return TickOutcome::Applied { view, new_epoch };
                }
                Ok(false) => debug!(view = %view, "view cannot take a view box"),
                Err(err) => warn!(view = %view, "re-framing failed during idle sync: {err}"),
            }
        }
        TickOutcome::Settled { new_epoch }
    }
}

/// Continuous sync toggle: idle until enabled, then owns a fresh [`SyncSession`].
#[derive(Debug, Default)]
pub enum ContinuousSync {
    #[default]
    Idle,
    Running(SyncSession),
}

impl ContinuousSync {
    pub fn is_running(&self) -> bool {
        matches!(self, ContinuousSync::Running(_))
    }

    pub fn session(&self) -> Option<&SyncSession> {
        match self {
            ContinuousSync::Running(session) => Some(session),
            ContinuousSync::Idle => None,
        }
    }

    /// Flips between idle and running. The idle subscription is made after the session exists and is
    /// dropped before the session is discarded.
    pub fn toggle<H: ViewHost + ?Sized>(&mut self, host: &mut H, config: &SyncConfig) -> CommandOutcome {
        if self.is_running() {
            host.unsubscribe_idle();
            *self = ContinuousSync::Idle;
            info!("continuous view sync disabled");
        } else {
            *self = ContinuousSync::Running(SyncSession::new(config.change_comparison()));
            host.subscribe_idle();
            info!("continuous view sync enabled");
        }
        CommandOutcome::Succeeded
    }

    /// Runs one idle tick; `None` while idle.
    pub fn tick<H: ViewHost + ?Sized>(&mut self, host: &mut H) -> Option<TickOutcome> {
        match self {
            ContinuousSync::Running(session) => Some(session.tick(host)),
            ContinuousSync::Idle => None,
        }
    }
}
