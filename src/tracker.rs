mod centroid_tracker;
mod matching;
mod rect;
mod track;

pub use centroid_tracker::{CentroidTracker, MatchStrategy, TrackerConfig};
pub use matching::{centroid_distance, first_match, nearest_match, optimal_match};
pub use rect::{BBox, Detection};
pub use track::{Track, TrackedBox};
