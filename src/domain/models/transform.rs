use serde::{Deserialize, Serialize};

/// Where a rotation pivots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PivotPolicy {
    /// Rotate about the sketch origin.
    #[default]
    Origin,
    /// Rotate about the arithmetic mean of the sketch's representative
    /// points, computed from the untransformed document.
    Centroid,
}

/// A rigid transform to apply to a sketch before delivery.
///
/// Rotation is in degrees, counter-clockwise positive, and is applied before
/// the translation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TransformRequest {
    pub dx: f64,
    pub dy: f64,
    pub angle: f64,
    pub pivot: PivotPolicy,
    /// Remove all constraints from the transformed copy. Recommended whenever
    /// geometry is relocated by coordinate edit: stale constraints can make a
    /// downstream solver fight the moved geometry and distort it.
    pub strip_constraints: bool,
}

impl TransformRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn translate(mut self, dx: f64, dy: f64) -> Self {
        self.dx = dx;
        self.dy = dy;
        self
    }

    pub fn rotate(mut self, angle: f64) -> Self {
        self.angle = angle;
        self
    }

    pub fn about_centroid(mut self) -> Self {
        self.pivot = PivotPolicy::Centroid;
        self
    }

    pub fn stripping_constraints(mut self) -> Self {
        self.strip_constraints = true;
        self
    }

    /// True when applying this request would change nothing, letting the
    /// orchestrator skip the pipeline entirely.
    pub fn is_identity(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0 && self.angle == 0.0 && !self.strip_constraints
    }
}
