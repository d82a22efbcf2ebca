//! Centroid identity tracking with exactly-once line crossing events.
//!
//! Detections flow one way per frame: [`CentroidTracker`] assigns ids, the gate
//! detectors ([`SpeedGateDetector`], [`LineGateDetector`]) turn tracked centroids into
//! [`CrossingEvent`]s, and [`CountAggregator`] keeps the distinct objects per line.
//! [`CountingPipeline`] wires the three together.

pub mod config;
pub mod error;
pub mod gate;
pub mod integration;
pub mod tracker;

pub use config::PipelineConfig;
pub use error::{ConfigError, Error, GeometryError, Result, TimingError};
pub use gate::{
    Axis, CountAggregator, CountKey, CountSnapshot, CrossingEvent, CrossingLine, Direction,
    LineGateDetector, LineRegistry, Point, SpeedGate, SpeedGateDetector,
};
pub use integration::{CountingPipeline, DetectionBuilder, DetectionSource, FrameReport};
pub use tracker::{BBox, CentroidTracker, Detection, MatchStrategy, Track, TrackedBox, TrackerConfig};
