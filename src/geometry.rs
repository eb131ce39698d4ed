use glam::{DAffine3, DMat3, DVec3};
use serde::{Deserialize, Serialize};

/// Placement of a view's crop volume in world space.
///
/// The basis columns are the view-local right, up and depth axes; the translation is the crop origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CropTransform {
    pub origin: DVec3,
    pub basis_x: DVec3,
    pub basis_y: DVec3,
    pub basis_z: DVec3,
}

impl Default for CropTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl CropTransform {
    pub const IDENTITY: Self = Self { origin: DVec3::ZERO, basis_x: DVec3::X, basis_y: DVec3::Y, basis_z: DVec3::Z };

    pub fn new(origin: DVec3, basis_x: DVec3, basis_y: DVec3, basis_z: DVec3) -> Self {
        Self { origin, basis_x, basis_y, basis_z }
    }

    /// Looking down the world Z axis, as plan views do.
    pub fn plan(origin: DVec3) -> Self {
        Self { origin, ..Self::IDENTITY }
    }

    /// Looking along `view_direction` with world Z up, as section views do. The local depth axis points back
    /// towards the viewer, so the far clip plane lies along negative local Z.
    pub fn section(origin: DVec3, view_direction: DVec3) -> Self {
        let basis_z = -view_direction.normalize_or_zero();
        let basis_x = DVec3::Z.cross(basis_z).normalize_or_zero();
        let basis_y = basis_z.cross(basis_x);
        Self { origin, basis_x, basis_y, basis_z }
    }

    pub fn with_origin(self, origin: DVec3) -> Self {
        Self { origin, ..self }
    }

    pub fn to_affine(&self) -> DAffine3 {
        DAffine3::from_mat3_translation(DMat3::from_cols(self.basis_x, self.basis_y, self.basis_z), self.origin)
    }

    pub fn of_point(&self, local: DVec3) -> DVec3 {
        self.to_affine().transform_point3(local)
    }

    /// Maps a world-space point into the crop-local frame. Returns `None` for a degenerate basis.
    pub fn to_local(&self, world: DVec3) -> Option<DVec3> {
        let affine = self.to_affine();
        if affine.matrix3.determinant().abs() <= f64::EPSILON {
            return None;
        }
        Some(affine.inverse().transform_point3(world))
    }
}

/// On-screen window rectangle in pixels, in the host's window coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct WindowRect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl WindowRect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self { left, top, right, bottom }
    }

    pub fn from_size(width: u32, height: u32) -> Self {
        let clamp = |size: u32| i32::try_from(size).unwrap_or(i32::MAX);
        Self { left: 0, top: 0, right: clamp(width), bottom: clamp(height) }
    }

    pub fn width(&self) -> u32 {
        self.right.saturating_sub(self.left).max(0) as u32
    }

    pub fn height(&self) -> u32 {
        self.bottom.saturating_sub(self.top).max(0) as u32
    }

    /// Shorter side in pixels; zero means the window is minimized.
    pub fn min_dimension(&self) -> u32 {
        self.width().min(self.height())
    }

    pub fn is_minimized(&self) -> bool {
        self.min_dimension() == 0
    }

    pub fn aspect(&self) -> f64 {
        if self.height() == 0 {
            1.0
        } else {
            self.width() as f64 / self.height() as f64
        }
    }
}

/// Axis-aligned bounds of a pair of opposite corners.
pub fn corner_bounds(a: DVec3, b: DVec3) -> (DVec3, DVec3) {
    (a.min(b), a.max(b))
}
