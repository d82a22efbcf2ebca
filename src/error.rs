//! Error types for tracking, gate configuration and speed measurement.

use thiserror::Error;

/// A bounding box or configured line that cannot be interpreted geometrically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GeometryError {
    #[error("malformed bounding box [{x1}, {y1}, {x2}, {y2}]: expected x1 <= x2 and y1 <= y2")]
    InvalidBox { x1: i32, y1: i32, x2: i32, y2: i32 },
    #[error("bounding box [{x1}, {y1}, {x2}, {y2}] does not fit in i32 pixel coordinates")]
    OutOfRange { x1: i64, y1: i64, x2: i64, y2: i64 },
    #[error("line '{label}' has no extent along its primary axis")]
    DegenerateLine { label: String },
}

/// A paired-gate measurement whose entry and exit timestamps leave no positive interval.
///
/// Recoverable: the event is withheld and the stream continues.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TimingError {
    #[error("object {object_id}: non-positive elapsed time {elapsed}s between gate lines")]
    NonPositiveElapsed { object_id: u64, elapsed: f64 },
}

/// Invalid construction of a registry, detector or tracker.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("gate distance must be positive, got {0}")]
    NonPositiveDistance(f64),
    #[error("tolerance must not be negative, got {0}")]
    NegativeOffset(i32),
    #[error("match distance must be positive, got {0}")]
    NonPositiveThreshold(f64),
    #[error("entry and exit lines coincide at y = {0}")]
    CoincidentGateLines(i32),
    #[error("duplicate line label '{0}'")]
    DuplicateLabel(String),
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_yaml::Error),
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Timing(#[from] TimingError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate::SpeedGate;
    use crate::tracker::BBox;

    fn build_gate(distance_m: f64) -> Result<SpeedGate> {
        BBox::from_tlbr(0, 0, 10, 10)?;
        Ok(SpeedGate::new("speed", 120, 80, 6, distance_m)?)
    }

    #[test]
    fn test_errors_convert_into_umbrella() {
        assert!(build_gate(200.0).is_ok());
        let err = build_gate(-1.0).unwrap_err();
        assert!(matches!(err, Error::Config(ConfigError::NonPositiveDistance(_))));
        assert_eq!(err.to_string(), "gate distance must be positive, got -1");
    }
}
