//! Builder for creating Detection objects from various input formats.

use crate::error::GeometryError;
use crate::tracker::{BBox, Detection};

/// Builder for creating `Detection` objects from various input formats.
///
/// Corners are held in i64 so that center or size based layouts near the edge of the
/// i32 range are reported by [`DetectionBuilder::build`] instead of overflowing.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    x1: i64,
    y1: i64,
    x2: i64,
    y2: i64,
    class: Option<String>,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set bounding box in TLBR format (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        self.x1 = x1.into();
        self.y1 = y1.into();
        self.x2 = x2.into();
        self.y2 = y2.into();
        self
    }

    /// Set bounding box in XYWH format (center_x, center_y, width, height).
    pub fn xywh(mut self, cx: i32, cy: i32, w: i32, h: i32) -> Self {
        let (w, h) = (i64::from(w), i64::from(h));
        self.x1 = i64::from(cx) - w / 2;
        self.y1 = i64::from(cy) - h / 2;
        self.x2 = self.x1 + w;
        self.y2 = self.y1 + h;
        self
    }

    /// Set bounding box in TLWH format (left, top, width, height).
    pub fn tlwh(mut self, l: i32, t: i32, w: i32, h: i32) -> Self {
        self.x1 = l.into();
        self.y1 = t.into();
        self.x2 = self.x1 + i64::from(w);
        self.y2 = self.y1 + i64::from(h);
        self
    }

    pub fn class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Build the final `Detection`, rejecting inverted corners and corners outside i32.
    pub fn build(self) -> Result<Detection, GeometryError> {
        Ok(Detection {
            bbox: BBox::from_wide(self.x1, self.y1, self.x2, self.y2)?,
            class: self.class,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detection_builder() {
        let det = DetectionBuilder::new()
            .tlbr(10, 20, 50, 80)
            .class("car")
            .build()
            .unwrap();

        assert_eq!(det.bbox.to_tlbr(), [10, 20, 50, 80]);
        assert_eq!(det.class.as_deref(), Some("car"));
    }

    #[test]
    fn test_xywh_and_tlwh_agree() {
        let a = DetectionBuilder::new().xywh(30, 50, 40, 60).build().unwrap();
        let b = DetectionBuilder::new().tlwh(10, 20, 40, 60).build().unwrap();
        assert_eq!(a.bbox, b.bbox);
        assert_eq!(a.bbox.center().x, 30);
    }

    #[test]
    fn test_negative_size_rejected() {
        assert!(DetectionBuilder::new().tlwh(10, 20, -5, 10).build().is_err());
    }

    #[test]
    fn test_extent_past_i32_rejected() {
        let err = DetectionBuilder::new()
            .tlwh(i32::MAX - 1, 0, 4, 4)
            .build()
            .unwrap_err();
        assert!(matches!(err, GeometryError::OutOfRange { .. }));

        let err = DetectionBuilder::new()
            .xywh(i32::MIN, 0, 10, 10)
            .build()
            .unwrap_err();
        assert!(matches!(err, GeometryError::OutOfRange { .. }));

        let det = DetectionBuilder::new()
            .xywh(i32::MAX - 5, 100, 10, 10)
            .build()
            .unwrap();
        assert_eq!(det.bbox.to_tlbr(), [i32::MAX - 10, 95, i32::MAX, 105]);
    }
}
