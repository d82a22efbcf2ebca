//! CountingPipeline: tracker, gate detectors and counts behind one writer.

use thiserror::Error;
use tracing::debug;

use crate::config::PipelineConfig;
use crate::error::{ConfigError, GeometryError, TimingError};
use crate::gate::{
    CountAggregator, CountKey, CountSnapshot, CrossingEvent, Direction, LineGateDetector,
    SpeedGateDetector,
};
use crate::tracker::{CentroidTracker, Detection, TrackedBox};

use super::DetectionSource;

/// Failure of one frame run through a detector.
#[derive(Debug, Error)]
pub enum FrameError<E> {
    #[error("detector failed: {0}")]
    Detector(E),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
}

/// Everything one frame produced.
#[derive(Debug, Clone, Default)]
pub struct FrameReport {
    /// Detections with their assigned ids, in input order
    pub tracked: Vec<TrackedBox>,
    /// Crossing events emitted this frame
    pub events: Vec<CrossingEvent>,
    /// Speed measurements withheld this frame
    pub timing_failures: Vec<TimingError>,
    pub counts: CountSnapshot,
}

/// Owns every stateful stage and runs them to completion once per frame.
///
/// Calls take `&mut self`; callers feeding frames from several threads must
/// serialize them, e.g. through a single-consumer channel.
#[derive(Debug, Clone)]
pub struct CountingPipeline {
    tracker: CentroidTracker,
    speed: Option<SpeedGateDetector>,
    lines: Option<LineGateDetector>,
    counts: CountAggregator,
    classes: Option<Vec<String>>,
    retire_dropped_ids: bool,
}

impl CountingPipeline {
    pub fn new(
        tracker: CentroidTracker,
        speed: Option<SpeedGateDetector>,
        lines: Option<LineGateDetector>,
    ) -> Self {
        let mut counts = CountAggregator::new();
        if let Some(speed) = &speed {
            for direction in Direction::ALL {
                counts.register(CountKey::new(speed.gate().label(), Some(direction)));
            }
        }
        if let Some(lines) = &lines {
            for line in lines.registry().lines() {
                counts.register(CountKey::line(line.label()));
            }
        }
        Self {
            tracker,
            speed,
            lines,
            counts,
            classes: None,
            retire_dropped_ids: true,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Result<Self, ConfigError> {
        let tracker = CentroidTracker::new(config.tracker.clone())?;
        let speed = config.speed_gate()?.map(SpeedGateDetector::new);
        let registry = config.line_registry()?;
        let lines = (!registry.is_empty()).then(|| LineGateDetector::new(registry));

        let mut pipeline = Self::new(tracker, speed, lines);
        pipeline.classes = config.classes.clone();
        pipeline.retire_dropped_ids = config.retire_dropped_ids;
        Ok(pipeline)
    }

    /// Only keep detections whose class is listed. Unlabelled detections pass.
    pub fn with_classes(mut self, classes: Vec<String>) -> Self {
        self.classes = Some(classes);
        self
    }

    pub fn with_retire_dropped_ids(mut self, retire: bool) -> Self {
        self.retire_dropped_ids = retire;
        self
    }

    fn accepts(&self, det: &Detection) -> bool {
        match (&self.classes, &det.class) {
            (Some(allowed), Some(class)) => allowed.iter().any(|c| c == class),
            _ => true,
        }
    }

    /// Run one frame of detections observed at `timestamp` seconds.
    pub fn process_detections(
        &mut self,
        detections: &[Detection],
        timestamp: f64,
    ) -> Result<FrameReport, GeometryError> {
        let kept: Vec<Detection> = detections
            .iter()
            .filter(|d| self.accepts(d))
            .cloned()
            .collect();
        let tracked = self.tracker.update(&kept)?;

        let mut events = Vec::new();
        let mut timing_failures = Vec::new();
        for tb in &tracked {
            let center = tb.center();
            if let Some(speed) = &mut self.speed {
                for outcome in speed.observe_both(tb.id, center, timestamp) {
                    match outcome {
                        Ok(event) => events.push(event),
                        Err(err) => timing_failures.push(err),
                    }
                }
            }
            if let Some(lines) = &mut self.lines {
                events.extend(lines.observe(tb.id, center, timestamp));
            }
        }

        for event in &events {
            self.counts.record(event);
        }

        if self.retire_dropped_ids {
            for &id in self.tracker.retired() {
                if let Some(speed) = &mut self.speed {
                    speed.retire(id);
                }
                if let Some(lines) = &mut self.lines {
                    lines.retire(id);
                }
                self.counts.retire(id);
            }
        }

        debug!(
            frame = self.tracker.frame_id(),
            tracked = tracked.len(),
            events = events.len(),
            "frame processed"
        );
        Ok(FrameReport {
            tracked,
            events,
            timing_failures,
            counts: self.counts.snapshot(),
        })
    }

    /// Run `detector` on one frame and feed its output through the pipeline.
    pub fn process_frame<D: DetectionSource>(
        &mut self,
        detector: &mut D,
        input: &[u8],
        width: u32,
        height: u32,
        timestamp: f64,
    ) -> Result<FrameReport, FrameError<D::Error>> {
        let detections = detector
            .detect(input, width, height)
            .map_err(FrameError::Detector)?;
        Ok(self.process_detections(&detections, timestamp)?)
    }

    pub fn counts(&self) -> CountSnapshot {
        self.counts.snapshot()
    }

    pub fn tracker(&self) -> &CentroidTracker {
        &self.tracker
    }

    pub fn speed_detector(&self) -> Option<&SpeedGateDetector> {
        self.speed.as_ref()
    }

    pub fn line_detector(&self) -> Option<&LineGateDetector> {
        self.lines.as_ref()
    }
}
