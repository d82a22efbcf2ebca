//! The boundary to the external object detector.

use crate::tracker::Detection;

/// Supplies the boxes of one video frame to a `CountingPipeline`.
///
/// The detector itself is a black box. Whatever it runs, it must hand back axis-aligned
/// boxes in the frame's pixel coordinates, one per object, already reduced to the classes
/// worth counting. A class label may ride along on each [`Detection`]; the pipeline can
/// filter on it again but never requires it. Order within a frame carries no meaning
/// beyond the tracker's first-match tie-break, and boxes are validated by the tracker,
/// so an inverted box fails the frame rather than the source.
///
/// ```ignore
/// use crossing_counter::{Detection, DetectionSource};
///
/// struct ReplayedBoxes {
///     frames: std::vec::IntoIter<Vec<[i32; 4]>>,
/// }
///
/// impl DetectionSource for ReplayedBoxes {
///     type Error = std::convert::Infallible;
///
///     fn detect(&mut self, _frame: &[u8], _width: u32, _height: u32) -> Result<Vec<Detection>, Self::Error> {
///         let rows = self.frames.next().unwrap_or_default();
///         Ok(rows.into_iter().map(|[x1, y1, x2, y2]| Detection::new(x1, y1, x2, y2).with_class("car")).collect())
///     }
/// }
/// ```
pub trait DetectionSource {
    type Error;

    /// Detect the objects in one frame of `width` x `height` pixels.
    ///
    /// `frame` holds the encoded or raw pixels in whatever layout the source expects.
    fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Conversion from a detector's native output into [`Detection`]s.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}

/// Rows of `[x1, y1, x2, y2]`, the layout most detectors emit after filtering.
impl IntoDetections for Vec<[i32; 4]> {
    fn into_detections(self) -> Vec<Detection> {
        self.into_iter()
            .map(|[x1, y1, x2, y2]| Detection::new(x1, y1, x2, y2))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_into_detections() {
        let dets = vec![[1, 2, 3, 4], [10, 20, 30, 40]].into_detections();
        assert_eq!(dets.len(), 2);
        assert_eq!(dets[1].bbox.to_tlbr(), [10, 20, 30, 40]);
        assert!(dets[0].class.is_none());
    }
}
