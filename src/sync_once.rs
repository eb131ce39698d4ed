use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::command::CommandOutcome;
use crate::comparison::ComparisonPolicy;
use crate::config::SyncConfig;
use crate::host::{HostResult, ViewHost};
use crate::view::ViewId;
use crate::view_box::ViewBox;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TargetSync {
    Applied,
    UpToDate,
    Incompatible,
}

#[derive(Debug, Default)]
struct PassSummary {
    applied: usize,
    up_to_date: usize,
    skipped: usize,
}

/// Re-frames every other open view to the active view's box, once.
///
/// Targets are visited in reverse window open order so the on-screen stacking of the active window is kept.
/// The active view is never a target of its own broadcast.
pub fn sync_views_once<H: ViewHost + ?Sized>(host: &mut H, config: &SyncConfig) -> CommandOutcome {
    let Some(active) = host.active_view() else {
        debug!("no active view to sync from");
        return CommandOutcome::Cancelled;
    };
    let result = run_pass(host, active, config);
    if config.activate_targets && host.active_view() != Some(active) {
        if let Err(err) = host.set_active_view(active) {
            warn!(view = %active, "failed to restore active view: {err}");
        }
    }
    match result {
        Ok(Some(summary)) => {
            info!(
                source = %active,
                applied = summary.applied,
                up_to_date = summary.up_to_date,
                skipped = summary.skipped,
                "views synced"
            );
            CommandOutcome::Succeeded
        }
        Ok(None) => {
            debug!(view = %active, "active view framing cannot be captured");
            CommandOutcome::Cancelled
        }
        Err(err) => CommandOutcome::from(err),
    }
}

fn run_pass<H: ViewHost + ?Sized>(
    host: &mut H,
    active: ViewId,
    config: &SyncConfig,
) -> HostResult<Option<PassSummary>> {
    let Some(source) = ViewBox::capture(&*host, active)? else {
        return Ok(None);
    };
    let policy = config.comparison();
    let mut summary = PassSummary::default();
    let mut visited = HashSet::from([active]);
    for view in host.open_views()?.into_iter().rev() {
        if !visited.insert(view) {
            continue;
        }
        match sync_target(host, view, &source, &policy, config.activate_targets) {
            Ok(TargetSync::Applied) => summary.applied += 1,
            Ok(TargetSync::UpToDate) => summary.up_to_date += 1,
            Ok(TargetSync::Incompatible) => summary.skipped += 1,
            Err(err) if err.is_view_local() => {
                debug!(view = %view, "skipping view: {err}");
                summary.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }
    Ok(Some(summary))
}

fn sync_target<H: ViewHost + ?Sized>(
    host: &mut H,
    view: ViewId,
    source: &ViewBox,
    policy: &ComparisonPolicy,
    activate_first: bool,
) -> HostResult<TargetSync> {
    if !ViewBox::can_zoom(&*host, view)? {
        return Ok(TargetSync::Incompatible);
    }
    if let Some(current) = ViewBox::capture(&*host, view)? {
        if current.is_almost_equal_to(source, policy) {
            debug!(view = %view, "already in sync");
            return Ok(TargetSync::UpToDate);
        }
    }
    if activate_first {
        host.set_active_view(view)?;
    }
    if source.apply(host, view)? {
        debug!(view = %view, "view re-framed");
        Ok(TargetSync::Applied)
    } else {
        Ok(TargetSync::Incompatible)
    }
}
