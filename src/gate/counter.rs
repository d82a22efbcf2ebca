//! Per-line, per-direction object counts.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use crate::gate::event::{CrossingEvent, Direction};

/// What a count is kept for: a line label, plus the direction for speed gates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CountKey {
    pub line_label: String,
    pub direction: Option<Direction>,
}

impl CountKey {
    pub fn new(line_label: impl Into<String>, direction: Option<Direction>) -> Self {
        Self {
            line_label: line_label.into(),
            direction,
        }
    }

    pub fn line(line_label: impl Into<String>) -> Self {
        Self::new(line_label, None)
    }

    pub fn of(event: &CrossingEvent) -> Self {
        Self::new(event.line_label.clone(), event.direction)
    }
}

impl fmt::Display for CountKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.direction {
            Some(direction) => write!(f, "{}/{}", self.line_label, direction),
            None => f.write_str(&self.line_label),
        }
    }
}

#[derive(Debug, Clone, Default)]
struct Tally {
    live: HashSet<u64>,
    /// Ids folded out of `live` after their track was retired
    settled: usize,
}

impl Tally {
    fn count(&self) -> usize {
        self.live.len() + self.settled
    }
}

/// Point-in-time copy of every count.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CountSnapshot(BTreeMap<CountKey, usize>);

impl CountSnapshot {
    pub fn get(&self, key: &CountKey) -> usize {
        self.0.get(key).copied().unwrap_or(0)
    }

    pub fn line(&self, label: &str) -> usize {
        self.get(&CountKey::line(label))
    }

    pub fn total(&self) -> usize {
        self.0.values().sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CountKey, usize)> {
        self.0.iter().map(|(k, v)| (k, *v))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Accumulates the distinct objects seen crossing each line/direction.
///
/// Counts are set sizes, so a repeated event for the same object is absorbed.
#[derive(Debug, Clone, Default)]
pub struct CountAggregator {
    tallies: BTreeMap<CountKey, Tally>,
}

impl CountAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `key` appear in snapshots with a count of zero.
    pub fn register(&mut self, key: CountKey) {
        self.tallies.entry(key).or_default();
    }

    /// Add the event's object to its key and return the updated counts.
    pub fn record(&mut self, event: &CrossingEvent) -> CountSnapshot {
        self.tallies
            .entry(CountKey::of(event))
            .or_default()
            .live
            .insert(event.object_id);
        self.snapshot()
    }

    pub fn count(&self, key: &CountKey) -> usize {
        self.tallies.get(key).map_or(0, Tally::count)
    }

    pub fn snapshot(&self) -> CountSnapshot {
        CountSnapshot(
            self.tallies
                .iter()
                .map(|(k, t)| (k.clone(), t.count()))
                .collect(),
        )
    }

    /// Fold a retired id into the settled tallies.
    ///
    /// Counts are unchanged; only the per-id memory is released. Safe because
    /// retired ids are never issued again.
    pub fn retire(&mut self, object_id: u64) {
        for tally in self.tallies.values_mut() {
            if tally.live.remove(&object_id) {
                tally.settled += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(object_id: u64, label: &str, direction: Option<Direction>) -> CrossingEvent {
        CrossingEvent {
            object_id,
            line_label: label.to_string(),
            direction,
            timestamp: 0.0,
            speed_kmh: None,
        }
    }

    #[test]
    fn test_duplicate_events_absorbed() {
        let mut agg = CountAggregator::new();
        agg.record(&event(1, "NB", None));
        let snapshot = agg.record(&event(1, "NB", None));
        assert_eq!(snapshot.line("NB"), 1);
        let snapshot = agg.record(&event(2, "NB", None));
        assert_eq!(snapshot.line("NB"), 2);
    }

    #[test]
    fn test_directions_counted_separately() {
        let mut agg = CountAggregator::new();
        agg.record(&event(1, "speed", Some(Direction::Down)));
        agg.record(&event(2, "speed", Some(Direction::Up)));
        agg.record(&event(3, "speed", Some(Direction::Up)));
        assert_eq!(agg.count(&CountKey::new("speed", Some(Direction::Down))), 1);
        assert_eq!(agg.count(&CountKey::new("speed", Some(Direction::Up))), 2);
        assert_eq!(agg.snapshot().total(), 3);
    }

    #[test]
    fn test_registered_keys_report_zero() {
        let mut agg = CountAggregator::new();
        agg.register(CountKey::line("SB"));
        let snapshot = agg.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot.line("SB"), 0);
        assert_eq!(snapshot.line("unknown"), 0);
    }

    #[test]
    fn test_retire_keeps_counts() {
        let mut agg = CountAggregator::new();
        agg.record(&event(1, "NB", None));
        agg.record(&event(2, "NB", None));
        agg.retire(1);
        agg.retire(1);
        assert_eq!(agg.count(&CountKey::line("NB")), 2);
        agg.record(&event(2, "NB", None));
        assert_eq!(agg.count(&CountKey::line("NB")), 2);
    }

    #[test]
    fn test_key_display() {
        assert_eq!(CountKey::line("NB").to_string(), "NB");
        assert_eq!(CountKey::new("speed", Some(Direction::Up)).to_string(), "speed/up");
    }
}
