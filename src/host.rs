use glam::DVec3;
use thiserror::Error;

use crate::geometry::{CropTransform, WindowRect};
use crate::view::{FarClip, PlanViewRange, ViewId, ViewKind};

pub type HostResult<T> = std::result::Result<T, HostError>;

/// Failures surfaced by the host application while reading or re-framing views.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HostError {
    /// The user cancelled an interactive host operation.
    #[error("operation cancelled by user")]
    Cancelled,
    #[error("view {0} does not exist in the active document")]
    ViewNotFound(ViewId),
    #[error("view {0} has no open window")]
    NoOpenWindow(ViewId),
    #[error("host failure: {0}")]
    Failed(String),
}

impl HostError {
    pub fn is_cancellation(&self) -> bool {
        matches!(self, HostError::Cancelled)
    }

    /// Failures scoped to a single view; a sync pass skips that view and carries on.
    pub fn is_view_local(&self) -> bool {
        matches!(self, HostError::ViewNotFound(_) | HostError::NoOpenWindow(_))
    }
}

/// Active document facts the command surface needs for availability.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentInfo {
    pub title: String,
    /// Family (template) documents have no project views to keep in sync.
    pub is_family: bool,
}

/// Narrow capability interface over the host's document/view model.
///
/// Views are addressed by id only; the engine never holds on to host objects between calls.
pub trait ViewHost {
    /// Active document, if any document is open.
    fn active_document(&self) -> Option<DocumentInfo>;

    /// View currently focused by the user.
    fn active_view(&self) -> Option<ViewId>;

    /// Give focus to `view`. Used by hosts that only re-frame the active window.
    fn set_active_view(&mut self, view: ViewId) -> HostResult<()>;

    /// Views with an open window, in window open order. A view may be listed more than once.
    fn open_views(&self) -> HostResult<Vec<ViewId>>;

    fn view_kind(&self, view: ViewId) -> HostResult<ViewKind>;

    /// Pixel rectangle of the view's window, or `None` when the view is not open.
    fn window_rect(&self, view: ViewId) -> HostResult<Option<WindowRect>>;

    /// Two opposite world-space corners of the region currently visible in the view's window.
    fn visible_corners(&self, view: ViewId) -> HostResult<[DVec3; 2]>;

    fn crop_transform(&self, view: ViewId) -> HostResult<CropTransform>;

    /// Depth range of a plan view.
    fn plan_view_range(&self, view: ViewId) -> HostResult<PlanViewRange>;

    /// Far clipping state of a section view.
    fn far_clip(&self, view: ViewId) -> HostResult<FarClip>;

    /// Zoom and center the view's window on the rectangle spanned by two world-space corners.
    fn zoom_and_center_rectangle(&mut self, view: ViewId, first: DVec3, second: DVec3) -> HostResult<()>;

    /// Start delivering idle notifications to the engine.
    fn subscribe_idle(&mut self);

    /// Stop delivering idle notifications.
    fn unsubscribe_idle(&mut self);
}
