//! Single tracked identity.

use crate::gate::Point;

/// One physical object's identity and rolling centroid.
///
/// A track lives exactly as long as it keeps being matched: a frame without a
/// matching detection ends it, and the id is never handed out again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    /// Unique, strictly increasing identifier
    pub id: u64,
    /// Centroid of the last matched detection
    pub center: Point,
}

impl Track {
    pub fn new(id: u64, center: Point) -> Self {
        Self { id, center }
    }

    pub fn update(&mut self, center: Point) {
        self.center = center;
    }
}

/// A detection together with the identity assigned to it this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrackedBox {
    pub bbox: super::BBox,
    pub id: u64,
}

impl TrackedBox {
    pub fn center(&self) -> Point {
        self.bbox.center()
    }
}
