//! Points and configured reference lines.

use nalgebra::Point2;
use serde::Deserialize;

use crate::error::GeometryError;

/// Integer point in frame pixel coordinates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Deserialize)]
#[serde(from = "(i32, i32)")]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to `other`.
    #[inline]
    pub fn distance(&self, other: &Point) -> f64 {
        nalgebra::distance(&self.to_point2(), &other.to_point2())
    }

    #[inline]
    fn to_point2(self) -> Point2<f64> {
        Point2::new(self.x as f64, self.y as f64)
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

/// Orientation of a counting line.
///
/// The primary axis is the one the line spans; the tolerance band lies along the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    /// Pick the axis along which `start -> end` spans further. Ties go horizontal.
    pub fn dominant(start: Point, end: Point) -> Self {
        if (end.x - start.x).abs() >= (end.y - start.y).abs() {
            Axis::Horizontal
        } else {
            Axis::Vertical
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Horizontal => "horizontal",
            Self::Vertical => "vertical",
        }
    }
}

/// An immutable, validated counting line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrossingLine {
    label: String,
    start: Point,
    end: Point,
    axis: Axis,
}

impl CrossingLine {
    /// Fails when the endpoints do not differ along `axis`, which covers zero-length lines.
    pub fn new(
        label: impl Into<String>,
        start: Point,
        end: Point,
        axis: Axis,
    ) -> Result<Self, GeometryError> {
        let label = label.into();
        let span = match axis {
            Axis::Horizontal => end.x - start.x,
            Axis::Vertical => end.y - start.y,
        };
        if span == 0 {
            return Err(GeometryError::DegenerateLine { label });
        }
        Ok(Self {
            label,
            start,
            end,
            axis,
        })
    }

    /// Like [`CrossingLine::new`] with the axis taken from the dominant span.
    pub fn inferred(label: impl Into<String>, start: Point, end: Point) -> Result<Self, GeometryError> {
        Self::new(label, start, end, Axis::dominant(start, end))
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn start(&self) -> Point {
        self.start
    }

    pub fn end(&self) -> Point {
        self.end
    }

    pub fn axis(&self) -> Axis {
        self.axis
    }

    /// Whether `p` lies inside the line's gate.
    ///
    /// The primary coordinate must fall strictly between the endpoints and the
    /// orthogonal coordinate strictly within `tolerance` of the start point's.
    pub fn contains(&self, p: Point, tolerance: i32) -> bool {
        let (along, across, a, b, anchor) = match self.axis {
            Axis::Horizontal => (p.x, p.y, self.start.x, self.end.x, self.start.y),
            Axis::Vertical => (p.y, p.x, self.start.y, self.end.y, self.start.x),
        };
        let (lo, hi) = (a.min(b), a.max(b));
        lo < along && along < hi && (across - anchor).abs() < tolerance
    }
}
