//! Validated gate configurations.

use std::collections::HashSet;

use crate::error::ConfigError;
use crate::gate::event::Direction;
use crate::gate::line::CrossingLine;

/// Default tolerance band around a counting line, in pixels.
pub const DEFAULT_LINE_TOLERANCE: i32 = 10;

/// Two horizontal lines a known real-world distance apart.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeedGate {
    label: String,
    entry_y: i32,
    exit_y: i32,
    offset: i32,
    distance_m: f64,
}

impl SpeedGate {
    pub fn new(
        label: impl Into<String>,
        entry_y: i32,
        exit_y: i32,
        offset: i32,
        distance_m: f64,
    ) -> Result<Self, ConfigError> {
        if !(distance_m.is_finite() && distance_m > 0.0) {
            return Err(ConfigError::NonPositiveDistance(distance_m));
        }
        if offset < 0 {
            return Err(ConfigError::NegativeOffset(offset));
        }
        if entry_y == exit_y {
            return Err(ConfigError::CoincidentGateLines(entry_y));
        }
        Ok(Self {
            label: label.into(),
            entry_y,
            exit_y,
            offset,
            distance_m,
        })
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn entry_y(&self) -> i32 {
        self.entry_y
    }

    pub fn exit_y(&self) -> i32 {
        self.exit_y
    }

    pub fn offset(&self) -> i32 {
        self.offset
    }

    pub fn distance_m(&self) -> f64 {
        self.distance_m
    }

    /// The (first, second) line ordinates an object passes when moving in `direction`.
    pub fn lines_for(&self, direction: Direction) -> (i32, i32) {
        match direction {
            Direction::Down => (self.entry_y, self.exit_y),
            Direction::Up => (self.exit_y, self.entry_y),
        }
    }

    /// Whether `y` lies in the closed band `[line_y - offset, line_y + offset]`.
    #[inline]
    pub fn within_band(&self, y: i32, line_y: i32) -> bool {
        (y - line_y).abs() <= self.offset
    }
}

/// Ordered set of independent counting lines.
#[derive(Debug, Clone, PartialEq)]
pub struct LineRegistry {
    lines: Vec<CrossingLine>,
    tolerance: i32,
}

impl LineRegistry {
    pub fn new(lines: Vec<CrossingLine>) -> Result<Self, ConfigError> {
        Self::with_tolerance(lines, DEFAULT_LINE_TOLERANCE)
    }

    pub fn with_tolerance(lines: Vec<CrossingLine>, tolerance: i32) -> Result<Self, ConfigError> {
        if tolerance < 0 {
            return Err(ConfigError::NegativeOffset(tolerance));
        }
        let mut labels = HashSet::new();
        for line in &lines {
            if !labels.insert(line.label()) {
                return Err(ConfigError::DuplicateLabel(line.label().to_string()));
            }
        }
        Ok(Self { lines, tolerance })
    }

    pub fn lines(&self) -> &[CrossingLine] {
        &self.lines
    }

    pub fn get(&self, label: &str) -> Option<&CrossingLine> {
        self.lines.iter().find(|l| l.label() == label)
    }

    pub fn tolerance(&self) -> i32 {
        self.tolerance
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
