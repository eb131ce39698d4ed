use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Host-assigned identity of a view element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub i64);

impl fmt::Display for ViewId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags! {
    /// What the sync engine may do with a view of a given kind.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct SyncCapabilities: u8 {
        /// A view box can be captured from the view's framing.
        const CAPTURE = 0b0000_0001;
        /// A view box can be applied to the view.
        const APPLY   = 0b0000_0010;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewKind {
    /// Floor, ceiling and area plans.
    Plan,
    /// Sections and elevations.
    Section,
    /// Free orthographic or perspective 3D views.
    ThreeD,
    Schedule,
    Sheet,
    Drafting,
    Legend,
}

impl ViewKind {
    pub fn capabilities(self) -> SyncCapabilities {
        match self {
            ViewKind::Plan | ViewKind::Section => SyncCapabilities::CAPTURE | SyncCapabilities::APPLY,
            ViewKind::ThreeD => SyncCapabilities::APPLY,
            ViewKind::Schedule | ViewKind::Sheet | ViewKind::Drafting | ViewKind::Legend => {
                SyncCapabilities::empty()
            }
        }
    }

    pub fn can_capture(self) -> bool {
        self.capabilities().contains(SyncCapabilities::CAPTURE)
    }

    pub fn can_apply(self) -> bool {
        self.capabilities().contains(SyncCapabilities::APPLY)
    }

    pub fn label(self) -> &'static str {
        match self {
            ViewKind::Plan => "Plan",
            ViewKind::Section => "Section",
            ViewKind::ThreeD => "3D",
            ViewKind::Schedule => "Schedule",
            ViewKind::Sheet => "Sheet",
            ViewKind::Drafting => "Drafting",
            ViewKind::Legend => "Legend",
        }
    }
}

/// One clip plane of a plan view range: a reference level elevation plus an offset from it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DepthPlane {
    /// Elevation of the associated level; `None` when the plane is unlimited or the level is missing.
    #[serde(default)]
    pub level_elevation: Option<f64>,
    #[serde(default)]
    pub offset: f64,
}

impl DepthPlane {
    pub fn at_level(level_elevation: f64, offset: f64) -> Self {
        Self { level_elevation: Some(level_elevation), offset }
    }

    pub fn unresolved() -> Self {
        Self::default()
    }

    pub fn elevation(&self) -> Option<f64> {
        self.level_elevation.map(|level| level + self.offset)
    }
}

/// Top and bottom clip planes of a plan view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct PlanViewRange {
    pub top: DepthPlane,
    pub bottom: DepthPlane,
}

impl PlanViewRange {
    pub fn new(top: DepthPlane, bottom: DepthPlane) -> Self {
        Self { top, bottom }
    }

    /// Shift from the cut plane to the middle of the view range. A missing bottom level resolves to 0,
    /// a missing top level collapses onto the bottom.
    pub fn depth_shift(&self) -> f64 {
        let bottom = self.bottom.elevation().unwrap_or(0.0);
        let top = self.top.elevation().unwrap_or(bottom);
        (top - bottom) / 2.0
    }
}

/// Far clipping state of a section view.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FarClip {
    pub enabled: bool,
    #[serde(default)]
    pub offset: f64,
}

impl FarClip {
    pub fn enabled(offset: f64) -> Self {
        Self { enabled: true, offset }
    }

    pub fn disabled() -> Self {
        Self::default()
    }

    /// Backward shift into the section depth, never deeper than `half_extent`.
    pub fn depth_shift(&self, half_extent: f64) -> f64 {
        if !self.enabled {
            return 0.0;
        }
        (self.offset / 2.0).min(half_extent)
    }
}
