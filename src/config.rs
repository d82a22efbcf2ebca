//! Pipeline configuration, deserialized from YAML.
//!
//! ```yaml
//! tracker:
//!   match_distance: 25
//!   strategy: first_match
//! speed_gate:
//!   entry_y: 120
//!   exit_y: 80
//!   offset: 6
//!   distance_m: 200
//! line_tolerance: 10
//! lines:
//!   - { label: NB, start: [880, 390], end: [1000, 380], axis: horizontal }
//!   - { label: WB, start: [630, 430], end: [630, 620] }
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;
use crate::gate::{Axis, CrossingLine, DEFAULT_LINE_TOLERANCE, LineRegistry, Point, SpeedGate};
use crate::tracker::TrackerConfig;

fn default_gate_label() -> String {
    "speed".to_string()
}

fn default_distance_m() -> f64 {
    200.0
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SpeedGateConfig {
    #[serde(default = "default_gate_label")]
    pub label: String,
    pub entry_y: i32,
    pub exit_y: i32,
    pub offset: i32,
    #[serde(default = "default_distance_m")]
    pub distance_m: f64,
}

impl SpeedGateConfig {
    pub fn build(&self) -> Result<SpeedGate, ConfigError> {
        SpeedGate::new(
            self.label.clone(),
            self.entry_y,
            self.exit_y,
            self.offset,
            self.distance_m,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LineConfig {
    pub label: String,
    pub start: Point,
    pub end: Point,
    /// Inferred from the dominant span when absent.
    #[serde(default)]
    pub axis: Option<Axis>,
}

impl LineConfig {
    pub fn build(&self) -> Result<CrossingLine, ConfigError> {
        let line = match self.axis {
            Some(axis) => CrossingLine::new(self.label.clone(), self.start, self.end, axis)?,
            None => CrossingLine::inferred(self.label.clone(), self.start, self.end)?,
        };
        Ok(line)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub tracker: TrackerConfig,
    pub speed_gate: Option<SpeedGateConfig>,
    pub lines: Vec<LineConfig>,
    pub line_tolerance: i32,
    /// Allow-list of detection classes; detections without a class always pass.
    pub classes: Option<Vec<String>>,
    /// Release per-object state as soon as the tracker drops an id.
    pub retire_dropped_ids: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            tracker: TrackerConfig::default(),
            speed_gate: None,
            lines: Vec::new(),
            line_tolerance: DEFAULT_LINE_TOLERANCE,
            classes: None,
            retire_dropped_ids: true,
        }
    }
}

impl PipelineConfig {
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(contents)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    pub fn speed_gate(&self) -> Result<Option<SpeedGate>, ConfigError> {
        self.speed_gate.as_ref().map(SpeedGateConfig::build).transpose()
    }

    pub fn line_registry(&self) -> Result<LineRegistry, ConfigError> {
        let lines = self
            .lines
            .iter()
            .map(LineConfig::build)
            .collect::<Result<Vec<_>, _>>()?;
        LineRegistry::with_tolerance(lines, self.line_tolerance)
    }
}
