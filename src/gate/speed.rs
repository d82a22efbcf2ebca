//! Paired-line speed measurement.

use std::collections::{HashMap, HashSet};

use tracing::{info, warn};

use crate::error::TimingError;
use crate::gate::event::{CrossingEvent, Direction};
use crate::gate::line::Point;
use crate::gate::registry::SpeedGate;

const MPS_TO_KMH: f64 = 3.6;

#[derive(Debug, Clone, Default)]
struct DirectionState {
    /// Latest timestamp seen inside the first band, per object
    entries: HashMap<u64, f64>,
    /// Objects that already produced their event
    crossed: HashSet<u64>,
}

impl DirectionState {
    fn forget(&mut self, object_id: u64) {
        self.entries.remove(&object_id);
        self.crossed.remove(&object_id);
    }
}

/// Emits at most one speed event per (object, direction) for a [`SpeedGate`].
#[derive(Debug, Clone)]
pub struct SpeedGateDetector {
    gate: SpeedGate,
    down: DirectionState,
    up: DirectionState,
    last_seen: HashMap<u64, f64>,
}

impl SpeedGateDetector {
    pub fn new(gate: SpeedGate) -> Self {
        Self {
            gate,
            down: DirectionState::default(),
            up: DirectionState::default(),
            last_seen: HashMap::new(),
        }
    }

    pub fn gate(&self) -> &SpeedGate {
        &self.gate
    }

    fn state_mut(&mut self, direction: Direction) -> &mut DirectionState {
        match direction {
            Direction::Down => &mut self.down,
            Direction::Up => &mut self.up,
        }
    }

    fn state(&self, direction: Direction) -> &DirectionState {
        match direction {
            Direction::Down => &self.down,
            Direction::Up => &self.up,
        }
    }

    /// Feed one observation of `object_id` for a single direction.
    ///
    /// Inside the first band the entry timestamp is overwritten on every frame, so the
    /// measurement starts at the last frame spent there. Inside the second band, with an
    /// entry on record and no prior event, the speed is computed and the pair is closed.
    ///
    /// A non-positive interval yields `TimingError` and leaves the pair open.
    pub fn observe(
        &mut self,
        object_id: u64,
        centroid: Point,
        direction: Direction,
        timestamp: f64,
    ) -> Result<Option<CrossingEvent>, TimingError> {
        self.last_seen.insert(object_id, timestamp);

        let (first_y, second_y) = self.gate.lines_for(direction);
        let in_first = self.gate.within_band(centroid.y, first_y);
        let in_second = self.gate.within_band(centroid.y, second_y);
        let distance_m = self.gate.distance_m();

        let state = self.state_mut(direction);
        if state.crossed.contains(&object_id) {
            return Ok(None);
        }
        if in_first {
            state.entries.insert(object_id, timestamp);
        }
        if !in_second {
            return Ok(None);
        }
        let Some(&entered) = state.entries.get(&object_id) else {
            return Ok(None);
        };

        let elapsed = timestamp - entered;
        if !(elapsed > 0.0) {
            warn!(object_id, %direction, elapsed, "non-positive gate interval, event withheld");
            return Err(TimingError::NonPositiveElapsed { object_id, elapsed });
        }

        state.crossed.insert(object_id);
        state.entries.remove(&object_id);

        let label = self.gate.label().to_string();
        let speed_kmh = distance_m / elapsed * MPS_TO_KMH;
        info!(object_id, %direction, elapsed, speed_kmh, gate = %label, "speed measured");
        Ok(Some(CrossingEvent {
            object_id,
            line_label: label,
            direction: Some(direction),
            timestamp,
            speed_kmh: Some(speed_kmh),
        }))
    }

    /// Feed one observation for both directions, down first.
    pub fn observe_both(
        &mut self,
        object_id: u64,
        centroid: Point,
        timestamp: f64,
    ) -> Vec<Result<CrossingEvent, TimingError>> {
        Direction::ALL
            .into_iter()
            .filter_map(|direction| {
                self.observe(object_id, centroid, direction, timestamp)
                    .transpose()
            })
            .collect()
    }

    pub fn has_crossed(&self, object_id: u64, direction: Direction) -> bool {
        self.state(direction).crossed.contains(&object_id)
    }

    /// Entry timestamp currently on record for the pair.
    pub fn entry_time(&self, object_id: u64, direction: Direction) -> Option<f64> {
        self.state(direction).entries.get(&object_id).copied()
    }

    /// Drop all state for an id that will never be observed again.
    pub fn retire(&mut self, object_id: u64) {
        self.down.forget(object_id);
        self.up.forget(object_id);
        self.last_seen.remove(&object_id);
    }

    /// Drop pending entry timestamps of objects not observed within `max_idle` seconds
    /// of `now`. Returns how many objects were swept.
    ///
    /// Crossed markers are kept: an idle id may still be live in the tracker, and only
    /// [`SpeedGateDetector::retire`] may release them.
    pub fn evict_idle(&mut self, now: f64, max_idle: f64) -> usize {
        let stale: Vec<u64> = self
            .last_seen
            .iter()
            .filter(|&(_, &seen)| now - seen > max_idle)
            .map(|(&id, _)| id)
            .collect();
        for id in &stale {
            self.down.entries.remove(id);
            self.up.entries.remove(id);
            self.last_seen.remove(id);
        }
        stale.len()
    }

    /// Number of objects observed and not yet retired or swept as idle.
    pub fn tracked_objects(&self) -> usize {
        self.last_seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn detector() -> SpeedGateDetector {
        SpeedGateDetector::new(SpeedGate::new("speed", 120, 80, 6, 200.0).unwrap())
    }

    fn at(cy: i32) -> Point {
        Point::new(500, cy)
    }

    #[test]
    fn test_speed_down() {
        let mut det = detector();
        assert_eq!(det.observe(7, at(121), Direction::Down, 0.0).unwrap(), None);
        let event = det
            .observe(7, at(82), Direction::Down, 5.0)
            .unwrap()
            .expect("exit band reached");
        assert_eq!(event.object_id, 7);
        assert_eq!(event.line_label, "speed");
        assert_eq!(event.direction, Some(Direction::Down));
        assert_relative_eq!(event.speed_kmh.unwrap(), 144.0, epsilon = 1e-9);
    }

    #[test]
    fn test_speed_up() {
        let mut det = detector();
        det.observe(3, at(80), Direction::Up, 10.0).unwrap();
        let event = det.observe(3, at(120), Direction::Up, 12.0).unwrap().unwrap();
        assert_relative_eq!(event.speed_kmh.unwrap(), 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_entry_timestamp_refreshes_while_dwelling() {
        let mut det = detector();
        det.observe(1, at(118), Direction::Down, 0.0).unwrap();
        det.observe(1, at(120), Direction::Down, 1.0).unwrap();
        det.observe(1, at(122), Direction::Down, 2.0).unwrap();
        assert_eq!(det.entry_time(1, Direction::Down), Some(2.0));
        let event = det.observe(1, at(80), Direction::Down, 6.0).unwrap().unwrap();
        assert_relative_eq!(event.speed_kmh.unwrap(), 200.0 / 4.0 * 3.6, epsilon = 1e-9);
    }

    #[test]
    fn test_exit_without_entry_is_ignored() {
        let mut det = detector();
        assert_eq!(det.observe(1, at(80), Direction::Down, 1.0).unwrap(), None);
        assert!(!det.has_crossed(1, Direction::Down));
    }

    #[test]
    fn test_at_most_one_event() {
        let mut det = detector();
        det.observe(1, at(121), Direction::Down, 0.0).unwrap();
        assert!(det.observe(1, at(82), Direction::Down, 5.0).unwrap().is_some());
        // Back through both bands again.
        det.observe(1, at(121), Direction::Down, 6.0).unwrap();
        assert_eq!(det.observe(1, at(82), Direction::Down, 9.0).unwrap(), None);
        assert_eq!(det.observe(1, at(80), Direction::Down, 10.0).unwrap(), None);
        assert!(det.has_crossed(1, Direction::Down));
    }

    #[test]
    fn test_zero_elapsed_is_an_error_not_an_event() {
        let mut det = detector();
        det.observe(1, at(121), Direction::Down, 0.0).unwrap();
        let err = det.observe(1, at(82), Direction::Down, 0.0).unwrap_err();
        assert_eq!(
            err,
            TimingError::NonPositiveElapsed {
                object_id: 1,
                elapsed: 0.0
            }
        );
        assert!(!det.has_crossed(1, Direction::Down));

        // The pair stays open; a later valid exit still measures.
        let event = det.observe(1, at(81), Direction::Down, 2.0).unwrap().unwrap();
        assert_relative_eq!(event.speed_kmh.unwrap(), 360.0, epsilon = 1e-9);
    }

    #[test]
    fn test_negative_elapsed_is_an_error() {
        let mut det = detector();
        det.observe(1, at(121), Direction::Down, 5.0).unwrap();
        assert!(det.observe(1, at(82), Direction::Down, 4.0).is_err());
    }

    #[test]
    fn test_directions_are_independent() {
        let mut det = detector();
        det.observe(1, at(121), Direction::Down, 0.0).unwrap();
        det.observe(1, at(82), Direction::Down, 5.0).unwrap();
        assert!(det.has_crossed(1, Direction::Down));
        assert!(!det.has_crossed(1, Direction::Up));
    }

    #[test]
    fn test_observe_both() {
        let mut det = detector();
        assert!(det.observe_both(4, at(121), 0.0).is_empty());
        let events = det.observe_both(4, at(82), 5.0);
        assert_eq!(events.len(), 1);
        let event = events[0].as_ref().unwrap();
        assert_eq!(event.direction, Some(Direction::Down));
        // The exit band of "down" is the entry band of "up".
        assert_eq!(det.entry_time(4, Direction::Up), Some(5.0));
    }

    #[test]
    fn test_retire_and_evict() {
        let mut det = detector();
        det.observe_both(1, at(121), 0.0);
        det.observe_both(2, at(121), 10.0);
        assert_eq!(det.tracked_objects(), 2);

        assert_eq!(det.evict_idle(12.0, 5.0), 1);
        assert_eq!(det.entry_time(1, Direction::Down), None);
        assert_eq!(det.entry_time(2, Direction::Down), Some(10.0));

        det.retire(2);
        assert_eq!(det.tracked_objects(), 0);
    }

    #[test]
    fn test_idle_eviction_keeps_crossed_pairs() {
        let mut det = detector();
        det.observe(1, at(121), Direction::Down, 0.0).unwrap();
        assert!(det.observe(1, at(82), Direction::Down, 5.0).unwrap().is_some());

        assert_eq!(det.evict_idle(100.0, 5.0), 1);
        assert!(det.has_crossed(1, Direction::Down));

        // Same id resumes after the stall and passes the gate again.
        det.observe(1, at(121), Direction::Down, 101.0).unwrap();
        assert_eq!(det.observe(1, at(82), Direction::Down, 106.0).unwrap(), None);
    }
}
