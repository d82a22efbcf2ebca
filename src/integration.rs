//! Integration module for connecting an external detector to the counting pipeline.
//!
//! The detector is a black box producing bounding boxes (and optionally class labels)
//! per frame. This module provides the trait it implements and the single-writer
//! pipeline stage that owns the tracker, the gate detectors and the counts.

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::{CountingPipeline, FrameError, FrameReport};
