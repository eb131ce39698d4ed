use glam::DVec3;

pub const DEFAULT_TOLERANCE: f64 = 1.0e-9;

/// Tolerance-based equality used to tell real framing changes from read noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonPolicy {
    epsilon: f64,
}

impl Default for ComparisonPolicy {
    fn default() -> Self {
        Self { epsilon: DEFAULT_TOLERANCE }
    }
}

impl ComparisonPolicy {
    /// Negative or non-finite tolerances fall back to the default.
    pub fn new(epsilon: f64) -> Self {
        if epsilon.is_finite() && epsilon >= 0.0 {
            Self { epsilon }
        } else {
            Self::default()
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    pub fn scalars_match(&self, a: f64, b: f64) -> bool {
        (a - b).abs() <= self.epsilon
    }

    /// Coordinate-wise comparison.
    pub fn points_match(&self, a: DVec3, b: DVec3) -> bool {
        self.scalars_match(a.x, b.x) && self.scalars_match(a.y, b.y) && self.scalars_match(a.z, b.z)
    }
}
