//! Multi-line counting gates.

use std::collections::{HashMap, HashSet};

use tracing::info;

use crate::gate::event::CrossingEvent;
use crate::gate::line::Point;
use crate::gate::registry::LineRegistry;

/// Emits at most one event per (object, line) for every line of a [`LineRegistry`].
#[derive(Debug, Clone)]
pub struct LineGateDetector {
    registry: LineRegistry,
    /// Objects already counted, indexed like `registry.lines()`
    crossed: Vec<HashSet<u64>>,
    last_seen: HashMap<u64, f64>,
}

impl LineGateDetector {
    pub fn new(registry: LineRegistry) -> Self {
        let crossed = vec![HashSet::new(); registry.len()];
        Self {
            registry,
            crossed,
            last_seen: HashMap::new(),
        }
    }

    pub fn registry(&self) -> &LineRegistry {
        &self.registry
    }

    /// Test `centroid` against every line, in registry order.
    ///
    /// Returns the events for lines this object enters for the first time.
    pub fn observe(&mut self, object_id: u64, centroid: Point, timestamp: f64) -> Vec<CrossingEvent> {
        self.last_seen.insert(object_id, timestamp);

        let tolerance = self.registry.tolerance();
        let mut events = Vec::new();
        for (line, crossed) in self.registry.lines().iter().zip(self.crossed.iter_mut()) {
            if !line.contains(centroid, tolerance) || !crossed.insert(object_id) {
                continue;
            }
            info!(object_id, line = line.label(), x = centroid.x, y = centroid.y, "line crossed");
            events.push(CrossingEvent {
                object_id,
                line_label: line.label().to_string(),
                direction: None,
                timestamp,
                speed_kmh: None,
            });
        }
        events
    }

    pub fn has_crossed(&self, object_id: u64, label: &str) -> bool {
        self.registry
            .lines()
            .iter()
            .position(|l| l.label() == label)
            .is_some_and(|i| self.crossed[i].contains(&object_id))
    }

    /// Drop all state for an id that will never be observed again.
    pub fn retire(&mut self, object_id: u64) {
        for crossed in &mut self.crossed {
            crossed.remove(&object_id);
        }
        self.last_seen.remove(&object_id);
    }

    /// Forget the last-seen time of objects idle for more than `max_idle` seconds.
    /// Returns how many.
    ///
    /// Crossed markers are kept; an idle id may still be live in the tracker.
    /// Use [`LineGateDetector::retire`] once the tracker drops it.
    pub fn evict_idle(&mut self, now: f64, max_idle: f64) -> usize {
        let before = self.last_seen.len();
        self.last_seen.retain(|_, &mut seen| now - seen <= max_idle);
        before - self.last_seen.len()
    }

    pub fn tracked_objects(&self) -> usize {
        self.last_seen.len()
    }
}
