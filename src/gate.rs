mod counter;
mod event;
mod line;
mod line_gate;
mod registry;
mod speed;

pub use counter::{CountAggregator, CountKey, CountSnapshot};
pub use event::{CrossingEvent, Direction};
pub use line::{Axis, CrossingLine, Point};
pub use line_gate::LineGateDetector;
pub use registry::{DEFAULT_LINE_TOLERANCE, LineRegistry, SpeedGate};
pub use speed::SpeedGateDetector;
