//! Association of new detections with the previous frame's tracks.

use ndarray::Array2;

use crate::gate::Point;
use crate::tracker::track::Track;

/// Cost assigned to padding cells and out-of-threshold pairs before solving.
const INFEASIBLE: f64 = 1e6;

/// Compute the centroid distance matrix between tracks (rows) and detections (columns).
pub fn centroid_distance(track_centers: &[Point], det_centers: &[Point]) -> Array2<f64> {
    let mut dists = Array2::zeros((track_centers.len(), det_centers.len()));
    for (i, t) in track_centers.iter().enumerate() {
        for (j, d) in det_centers.iter().enumerate() {
            dists[[i, j]] = t.distance(d);
        }
    }
    dists
}

/// Index of the first track, in stored order, whose centroid is strictly closer than `thresh`.
///
/// Not distance-optimal: when several tracks qualify the earliest one wins even if a
/// later one is nearer. Tracks already claimed this frame stay eligible.
pub fn first_match(tracks: &[Track], center: Point, thresh: f64) -> Option<usize> {
    tracks
        .iter()
        .position(|track| track.center.distance(&center) < thresh)
}

/// Greedy nearest-track assignment, visiting detections in input order.
///
/// Each track is claimed at most once; equal distances go to the lower track index.
pub fn nearest_match(dists: &Array2<f64>, thresh: f64) -> Vec<Option<usize>> {
    let (num_tracks, num_dets) = dists.dim();
    let mut claimed = vec![false; num_tracks];
    let mut assignment = Vec::with_capacity(num_dets);

    for j in 0..num_dets {
        let mut best: Option<(usize, f64)> = None;
        for i in 0..num_tracks {
            let d = dists[[i, j]];
            if claimed[i] || d >= thresh {
                continue;
            }
            if best.is_none_or(|(_, best_d)| d < best_d) {
                best = Some((i, d));
            }
        }
        if let Some((i, _)) = best {
            claimed[i] = true;
        }
        assignment.push(best.map(|(i, _)| i));
    }
    assignment
}

/// Minimum total distance one-to-one assignment; pairs at or beyond `thresh` are left unmatched.
pub fn optimal_match(dists: &Array2<f64>, thresh: f64) -> Vec<Option<usize>> {
    let (num_tracks, num_dets) = dists.dim();
    if num_tracks == 0 || num_dets == 0 {
        return vec![None; num_dets];
    }

    let size = num_tracks.max(num_dets);
    let mut padded = Array2::<f64>::from_elem((size, size), INFEASIBLE);
    for i in 0..num_tracks {
        for j in 0..num_dets {
            let d = dists[[i, j]];
            if d < thresh {
                padded[[i, j]] = d;
            }
        }
    }

    let mut assignment = vec![None; num_dets];
    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row, &col) in row_to_col.iter().enumerate() {
                if row < num_tracks && col < num_dets && dists[[row, col]] < thresh {
                    assignment[col] = Some(row);
                }
            }
        }
        Err(_) => {
            tracing::warn!(num_tracks, num_dets, "assignment solver failed, falling back to nearest match");
            return nearest_match(dists, thresh);
        }
    }
    assignment
}
