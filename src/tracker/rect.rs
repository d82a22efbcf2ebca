use crate::error::GeometryError;
use crate::gate::Point;

/// Axis-aligned bounding box in integer frame pixel coordinates.
///
/// Supports two common layouts:
/// - TLBR: Top-Left X, Top-Left Y, Bottom-Right X, Bottom-Right Y
/// - TLWH: Top-Left X, Top-Left Y, Width, Height
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct BBox {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl BBox {
    /// Create a box from TLBR corners without validation.
    #[inline]
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self { x1, y1, x2, y2 }
    }

    /// Create a box from TLBR corners, rejecting inverted corners.
    pub fn from_tlbr(x1: i32, y1: i32, x2: i32, y2: i32) -> Result<Self, GeometryError> {
        let bbox = Self::new(x1, y1, x2, y2);
        bbox.validate()?;
        Ok(bbox)
    }

    /// Create a box from TLWH format (top-left x, top-left y, width, height).
    pub fn from_tlwh(x: i32, y: i32, width: i32, height: i32) -> Result<Self, GeometryError> {
        let (x, y) = (i64::from(x), i64::from(y));
        Self::from_wide(x, y, x + i64::from(width), y + i64::from(height))
    }

    /// Create a box from corners computed in wider arithmetic.
    pub(crate) fn from_wide(x1: i64, y1: i64, x2: i64, y2: i64) -> Result<Self, GeometryError> {
        let narrow = |v: i64| i32::try_from(v).ok();
        match (narrow(x1), narrow(y1), narrow(x2), narrow(y2)) {
            (Some(x1), Some(y1), Some(x2), Some(y2)) => Self::from_tlbr(x1, y1, x2, y2),
            _ => Err(GeometryError::OutOfRange { x1, y1, x2, y2 }),
        }
    }

    /// Fails when `x2 < x1` or `y2 < y1`. Zero-area boxes are accepted.
    pub fn validate(&self) -> Result<(), GeometryError> {
        if self.x2 < self.x1 || self.y2 < self.y1 {
            return Err(GeometryError::InvalidBox {
                x1: self.x1,
                y1: self.y1,
                x2: self.x2,
                y2: self.y2,
            });
        }
        Ok(())
    }

    #[inline]
    pub fn to_tlbr(&self) -> [i32; 4] {
        [self.x1, self.y1, self.x2, self.y2]
    }

    #[inline]
    pub fn to_tlwh(&self) -> [i32; 4] {
        [self.x1, self.y1, self.width(), self.height()]
    }

    /// Saturates at `i32::MAX` for boxes spanning more than the i32 range.
    #[inline]
    pub fn width(&self) -> i32 {
        self.x2.saturating_sub(self.x1)
    }

    #[inline]
    pub fn height(&self) -> i32 {
        self.y2.saturating_sub(self.y1)
    }

    /// Integer centroid, floored toward negative infinity.
    #[inline]
    pub fn center(&self) -> Point {
        Point::new(midpoint(self.x1, self.x2), midpoint(self.y1, self.y2))
    }
}

/// Floored midpoint; the sum is taken in i64 so it cannot overflow.
#[inline]
fn midpoint(a: i32, b: i32) -> i32 {
    let mid = (i64::from(a) + i64::from(b)).div_euclid(2);
    // Lies between `a` and `b`.
    mid as i32
}

/// One frame-local detection from the external detector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Detection {
    pub bbox: BBox,
    /// Class label, when the detector reports one.
    pub class: Option<String>,
}

impl Detection {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Self {
            bbox: BBox::new(x1, y1, x2, y2),
            class: None,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn from_bbox(bbox: BBox) -> Self {
        Self { bbox, class: None }
    }
}

impl From<BBox> for Detection {
    fn from(bbox: BBox) -> Self {
        Self::from_bbox(bbox)
    }
}
