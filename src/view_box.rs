use glam::DVec3;

use crate::comparison::ComparisonPolicy;
use crate::geometry::{corner_bounds, CropTransform};
use crate::host::{HostResult, ViewHost};
use crate::view::{FarClip, PlanViewRange, ViewId, ViewKind};

/// View-type specific depth correction applied to a captured center.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DepthAdjust {
    None,
    Plan(PlanViewRange),
    Section(FarClip),
}

impl DepthAdjust {
    /// Offset along the local depth axis for a box of the given half extent.
    pub fn local_offset(&self, half_extent: f64) -> f64 {
        match self {
            DepthAdjust::None => 0.0,
            DepthAdjust::Plan(range) => range.depth_shift(),
            DepthAdjust::Section(far_clip) => -far_clip.depth_shift(half_extent),
        }
    }
}

/// Window-size independent framing: a world-space center plus the half extent per pixel of the shorter
/// window side.
///
/// A box with a zero scalar has never been captured and is never applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    center: DVec3,
    scalar: f64,
}

impl Default for ViewBox {
    fn default() -> Self {
        Self::UNSET
    }
}

impl ViewBox {
    pub const UNSET: Self = Self { center: DVec3::ZERO, scalar: 0.0 };

    pub fn new(center: DVec3, scalar: f64) -> Self {
        Self { center, scalar }
    }

    pub fn center(&self) -> DVec3 {
        self.center
    }

    pub fn scalar(&self) -> f64 {
        self.scalar
    }

    pub fn is_set(&self) -> bool {
        self.scalar.is_finite() && self.scalar > 0.0 && self.center.is_finite()
    }

    /// Half extent in world units once scaled to a window whose shorter side is `window_min_px`.
    pub fn half_extent_for(&self, window_min_px: u32) -> f64 {
        self.scalar * window_min_px as f64
    }

    pub fn is_almost_equal_to(&self, other: &ViewBox, policy: &ComparisonPolicy) -> bool {
        policy.scalars_match(self.scalar, other.scalar) && policy.points_match(self.center, other.center)
    }

    /// Builds a box from a view's visible corners, its crop transform and its window's shorter side.
    ///
    /// The shorter visible dimension sets the scale so the framed content survives re-application to a
    /// window of any aspect ratio. Returns `None` for a minimized window, a degenerate transform or a
    /// visible region with no area.
    pub fn from_framing(
        transform: &CropTransform,
        visible_corners: [DVec3; 2],
        window_min_px: u32,
        depth: DepthAdjust,
    ) -> Option<Self> {
        if window_min_px == 0 {
            return None;
        }
        let (min, max) =
            corner_bounds(transform.to_local(visible_corners[0])?, transform.to_local(visible_corners[1])?);
        let half_extent = (max.x - min.x).min(max.y - min.y) / 2.0;
        let scalar = half_extent / window_min_px as f64;

        let local_center = (min + max) / 2.0 + DVec3::new(0.0, 0.0, depth.local_offset(half_extent));
        Some(Self { center: transform.of_point(local_center), scalar }).filter(ViewBox::is_set)
    }

    /// World-space corners to zoom a target view to, using the target's own orientation.
    pub fn zoom_corners(&self, target: &CropTransform, window_min_px: u32) -> Option<[DVec3; 2]> {
        if !self.is_set() || window_min_px == 0 {
            return None;
        }
        let extent = self.half_extent_for(window_min_px);
        let placed = target.with_origin(self.center);
        Some([placed.of_point(DVec3::splat(-extent)), placed.of_point(DVec3::splat(extent))])
    }

    /// True when a box can be captured from `view` right now.
    pub fn can_set<H: ViewHost + ?Sized>(host: &H, view: ViewId) -> HostResult<bool> {
        if !host.view_kind(view)?.can_capture() {
            return Ok(false);
        }
        Ok(open_window_min(host, view)?.is_some())
    }

    /// True when a box can be applied to `view` right now.
    pub fn can_zoom<H: ViewHost + ?Sized>(host: &H, view: ViewId) -> HostResult<bool> {
        if !host.view_kind(view)?.can_apply() {
            return Ok(false);
        }
        Ok(open_window_min(host, view)?.is_some())
    }

    /// Captures the current framing of `view`.
    ///
    /// `Ok(None)` covers the expected cases: unsupported kind, no open window, minimized window.
    pub fn capture<H: ViewHost + ?Sized>(host: &H, view: ViewId) -> HostResult<Option<Self>> {
        let kind = host.view_kind(view)?;
        if !kind.can_capture() {
            return Ok(None);
        }
        let Some(window_min) = open_window_min(host, view)? else {
            return Ok(None);
        };
        let corners = host.visible_corners(view)?;
        let transform = host.crop_transform(view)?;
        let depth = match kind {
            ViewKind::Plan => DepthAdjust::Plan(host.plan_view_range(view)?),
            ViewKind::Section => DepthAdjust::Section(host.far_clip(view)?),
            _ => DepthAdjust::None,
        };
        Ok(Self::from_framing(&transform, corners, window_min, depth))
    }

    /// Re-frames `view` to this box. `Ok(false)` when the box is unset or the view cannot take it.
    pub fn apply<H: ViewHost + ?Sized>(&self, host: &mut H, view: ViewId) -> HostResult<bool> {
        if !self.is_set() || !host.view_kind(view)?.can_apply() {
            return Ok(false);
        }
        let Some(window_min) = open_window_min(&*host, view)? else {
            return Ok(false);
        };
        let transform = host.crop_transform(view)?;
        let Some([first, second]) = self.zoom_corners(&transform, window_min) else {
            return Ok(false);
        };
        host.zoom_and_center_rectangle(view, first, second)?;
        Ok(true)
    }
}

fn open_window_min<H: ViewHost + ?Sized>(host: &H, view: ViewId) -> HostResult<Option<u32>> {
    Ok(host.window_rect(view)?.filter(|rect| !rect.is_minimized()).map(|rect| rect.min_dimension()))
}
