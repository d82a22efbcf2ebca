use std::fmt;

use serde::Deserialize;

/// Travel direction through a paired speed gate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Entry line first, exit line second
    Down,
    /// Exit line first, entry line second
    Up,
}

impl Direction {
    pub const ALL: [Direction; 2] = [Direction::Down, Direction::Up];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Down => "down",
            Self::Up => "up",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One-time signal that an object passed a gate.
#[derive(Debug, Clone, PartialEq)]
pub struct CrossingEvent {
    pub object_id: u64,
    pub line_label: String,
    /// Set for speed gates; counting lines carry their direction in the label.
    pub direction: Option<Direction>,
    /// Seconds, from the caller's clock
    pub timestamp: f64,
    pub speed_kmh: Option<f64>,
}
