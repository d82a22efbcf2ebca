//! Centroid identity tracker.

use std::collections::{HashMap, HashSet};

use serde::Deserialize;
use tracing::debug;

use crate::error::{ConfigError, GeometryError};
use crate::gate::Point;
use crate::tracker::matching;
use crate::tracker::rect::Detection;
use crate::tracker::track::{Track, TrackedBox};

/// How a detection picks among previous tracks within the match distance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStrategy {
    /// First qualifying track in stored order. Order-dependent and non-exclusive:
    /// two detections near the same track both receive its id.
    #[default]
    FirstMatch,
    /// Nearest unclaimed track, greedy in detection order.
    Nearest,
    /// Minimum-cost one-to-one assignment.
    Optimal,
}

/// Configuration for the CentroidTracker.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Centroids strictly closer than this are the same object.
    pub match_distance: f64,
    pub strategy: MatchStrategy,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            match_distance: 25.0,
            strategy: MatchStrategy::FirstMatch,
        }
    }
}

impl TrackerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.match_distance.is_finite() && self.match_distance > 0.0) {
            return Err(ConfigError::NonPositiveThreshold(self.match_distance));
        }
        Ok(())
    }
}

/// Frame-by-frame identity tracker without occlusion memory.
///
/// Only tracks matched in the latest frame survive into the next one, so a single
/// missed frame ends an identity and the object comes back under a fresh id.
#[derive(Debug, Clone)]
pub struct CentroidTracker {
    /// Live tracks in iteration order: the order of the previous frame's output.
    tracks: Vec<Track>,
    retired: Vec<u64>,
    next_id: u64,
    frame_id: u64,
    config: TrackerConfig,
}

impl Default for CentroidTracker {
    fn default() -> Self {
        Self {
            tracks: Vec::new(),
            retired: Vec::new(),
            next_id: 0,
            frame_id: 0,
            config: TrackerConfig::default(),
        }
    }
}

impl CentroidTracker {
    pub fn new(config: TrackerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    /// Assign an id to every detection of the current frame.
    ///
    /// Output order follows input order. A malformed box fails the call before any
    /// state changes; an empty frame drops every track.
    pub fn update(&mut self, detections: &[Detection]) -> Result<Vec<TrackedBox>, GeometryError> {
        for det in detections {
            det.bbox.validate()?;
        }
        self.frame_id += 1;

        let centers: Vec<Point> = detections.iter().map(|d| d.bbox.center()).collect();

        // Step 1: Associate with the previous frame's tracks only
        let mut previous = std::mem::take(&mut self.tracks);
        let assignment: Vec<Option<usize>> = match self.config.strategy {
            MatchStrategy::FirstMatch => centers
                .iter()
                .map(|&center| {
                    let idx = matching::first_match(&previous, center, self.config.match_distance);
                    if let Some(i) = idx {
                        previous[i].update(center);
                    }
                    idx
                })
                .collect(),
            MatchStrategy::Nearest | MatchStrategy::Optimal => {
                let track_centers: Vec<Point> = previous.iter().map(|t| t.center).collect();
                let dists = matching::centroid_distance(&track_centers, &centers);
                let assignment = if self.config.strategy == MatchStrategy::Nearest {
                    matching::nearest_match(&dists, self.config.match_distance)
                } else {
                    matching::optimal_match(&dists, self.config.match_distance)
                };
                for (j, idx) in assignment.iter().enumerate() {
                    if let Some(i) = *idx {
                        previous[i].update(centers[j]);
                    }
                }
                assignment
            }
        };

        // Step 2: Open new tracks for unmatched detections
        let mut latest: HashMap<u64, Point> = previous.iter().map(|t| (t.id, t.center)).collect();
        let mut output = Vec::with_capacity(detections.len());
        for ((det, center), idx) in detections.iter().zip(&centers).zip(assignment) {
            let id = match idx {
                Some(i) => previous[i].id,
                None => {
                    let id = self.next_id;
                    self.next_id += 1;
                    latest.insert(id, *center);
                    debug!(id, x = center.x, y = center.y, "new track");
                    id
                }
            };
            output.push(TrackedBox { bbox: det.bbox, id });
        }

        // Step 3: Live set becomes exactly the ids referenced by this frame
        let mut seen = HashSet::new();
        self.tracks = output
            .iter()
            .filter(|tb| seen.insert(tb.id))
            .map(|tb| Track::new(tb.id, latest[&tb.id]))
            .collect();

        self.retired = previous
            .iter()
            .map(|t| t.id)
            .filter(|id| !seen.contains(id))
            .collect();
        if !self.retired.is_empty() {
            debug!(frame = self.frame_id, retired = ?self.retired, "tracks dropped");
        }

        Ok(output)
    }

    /// Live tracks in the order the next frame will test them.
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Ids dropped by the latest `update`. They are never issued again.
    pub fn retired(&self) -> &[u64] {
        &self.retired
    }

    /// The id the next new track will receive.
    pub fn next_id(&self) -> u64 {
        self.next_id
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn config(&self) -> &TrackerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(cx: i32, cy: i32) -> Detection {
        Detection::new(cx - 5, cy - 5, cx + 5, cy + 5)
    }

    #[test]
    fn test_ids_start_at_zero_and_increase() {
        let mut tracker = CentroidTracker::default();
        let out = tracker.update(&[at(10, 10), at(200, 200)]).unwrap();
        assert_eq!(out[0].id, 0);
        assert_eq!(out[1].id, 1);
        assert_eq!(tracker.next_id(), 2);
    }

    #[test]
    fn test_same_frame_tracks_are_not_candidates() {
        let mut tracker = CentroidTracker::default();
        // Second detection is within 25 units of the first but both are new this frame.
        let out = tracker.update(&[at(10, 10), at(12, 10)]).unwrap();
        assert_ne!(out[0].id, out[1].id);
    }

    #[test]
    fn test_first_match_is_non_exclusive() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[at(100, 100)]).unwrap();
        let out = tracker.update(&[at(105, 100), at(108, 100)]).unwrap();
        assert_eq!(out[0].id, 0);
        assert_eq!(out[1].id, 0);
        assert_eq!(tracker.tracks(), &[Track::new(0, Point::new(108, 100))]);
    }

    #[test]
    fn test_first_match_compares_updated_centroid() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[at(100, 100)]).unwrap();
        // 20 units moves the track; the next detection is 40 from the old centroid, 20 from the new.
        let out = tracker.update(&[at(120, 100), at(140, 100)]).unwrap();
        assert_eq!(out[0].id, 0);
        assert_eq!(out[1].id, 0);
    }

    #[test]
    fn test_nearest_strategy_is_exclusive() {
        let config = TrackerConfig {
            strategy: MatchStrategy::Nearest,
            ..TrackerConfig::default()
        };
        let mut tracker = CentroidTracker::new(config).unwrap();
        tracker.update(&[at(100, 100)]).unwrap();
        let out = tracker.update(&[at(105, 100), at(108, 100)]).unwrap();
        assert_eq!(out[0].id, 0);
        assert_eq!(out[1].id, 1);
    }

    #[test]
    fn test_live_set_follows_output_order() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[at(10, 10), at(300, 300)]).unwrap();
        tracker.update(&[at(300, 302), at(12, 10)]).unwrap();
        let ids: Vec<u64> = tracker.tracks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 0]);
    }

    #[test]
    fn test_retired_ids_reported() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[at(10, 10), at(300, 300)]).unwrap();
        tracker.update(&[at(11, 10)]).unwrap();
        assert_eq!(tracker.retired(), &[1]);
        tracker.update(&[]).unwrap();
        assert_eq!(tracker.retired(), &[0]);
        assert!(tracker.tracks().is_empty());
    }

    #[test]
    fn test_malformed_box_leaves_state_untouched() {
        let mut tracker = CentroidTracker::default();
        tracker.update(&[at(10, 10)]).unwrap();
        let err = tracker
            .update(&[at(12, 10), Detection::new(50, 50, 40, 60)])
            .unwrap_err();
        assert!(matches!(err, GeometryError::InvalidBox { .. }));
        assert_eq!(tracker.tracks(), &[Track::new(0, Point::new(10, 10))]);
        assert_eq!(tracker.next_id(), 1);
        assert_eq!(tracker.frame_id(), 1);
    }

    #[test]
    fn test_invalid_config_rejected() {
        let config = TrackerConfig {
            match_distance: 0.0,
            ..TrackerConfig::default()
        };
        assert!(CentroidTracker::new(config).is_err());
    }
}
