//! Cost matrices and minimum-cost assignment between tracks and detections.

use ndarray::Array2;

use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::{GATING_THRESHOLD, KalmanFilter};
use crate::tracker::track::Track;

/// Sentinel cost for pairs the gate has ruled out. Larger than any matching
/// threshold, smaller than the solver's padding value.
pub const INFEASIBLE_COST: f32 = 1e5;

/// Outcome of one assignment pass. Indices refer to the candidate slices
/// passed to the cost builder, not to the tracker's full live list.
#[derive(Debug, Clone)]
pub struct AssignmentResult {
    pub matches: Vec<(usize, usize)>,
    pub unmatched_tracks: Vec<usize>,
    pub unmatched_detections: Vec<usize>,
}

/// Appearance cost matrix for one cascade level, hard-gated by motion.
///
/// The Mahalanobis gate is a feasibility mask: pairs whose gating distance
/// exceeds the chi-square threshold get [`INFEASIBLE_COST`] regardless of
/// appearance. Feasible pairs rank by nearest-neighbor cosine distance
/// against the track's gallery; a detection without an embedding (or a
/// track with an empty gallery) contributes no appearance evidence and
/// costs 0.0, so the motion gate alone decides it.
pub fn gated_appearance_cost(
    kf: &KalmanFilter,
    tracks: &[&Track],
    detections: &[&Detection],
) -> Array2<f32> {
    let mut cost = Array2::zeros((tracks.len(), detections.len()));
    if tracks.is_empty() || detections.is_empty() {
        return cost;
    }

    let measurements: Vec<[f64; 4]> = detections
        .iter()
        .map(|d| {
            let xyah = d.bbox.to_xyah();
            [
                xyah[0] as f64,
                xyah[1] as f64,
                xyah[2] as f64,
                xyah[3] as f64,
            ]
        })
        .collect();

    for (i, track) in tracks.iter().enumerate() {
        let gating = kf.gating_distance(track.mean(), track.covariance(), &measurements);
        for (j, det) in detections.iter().enumerate() {
            cost[[i, j]] = if gating[j] > GATING_THRESHOLD {
                INFEASIBLE_COST
            } else {
                det.embedding
                    .as_ref()
                    .and_then(|e| track.gallery().min_cosine_distance(e))
                    .unwrap_or(0.0)
            };
        }
    }
    cost
}

/// IoU cost matrix (`1 - IoU`) between predicted track boxes and detection
/// boxes. Motion-agnostic fallback for unconfirmed tracks and the
/// post-cascade stage.
pub fn iou_cost(tracks: &[&Track], detections: &[&Detection]) -> Array2<f32> {
    let mut cost = Array2::zeros((tracks.len(), detections.len()));
    for (i, track) in tracks.iter().enumerate() {
        let predicted = track.bbox();
        for (j, det) in detections.iter().enumerate() {
            cost[[i, j]] = 1.0 - predicted.iou(&det.bbox);
        }
    }
    cost
}

/// Solve minimum-cost one-to-one assignment over the cost matrix and reject
/// any pair whose cost exceeds `thresh`; rejected rows and columns return
/// to the unmatched pools.
///
/// Ties between equal-cost assignments resolve in row order: callers present
/// candidate tracks in ascending-id order, so the lowest track id wins.
pub fn linear_assignment(cost_matrix: &Array2<f32>, thresh: f32) -> AssignmentResult {
    let (num_rows, num_cols) = cost_matrix.dim();

    if num_rows == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: vec![],
            unmatched_detections: (0..num_cols).collect(),
        };
    }

    if num_cols == 0 {
        return AssignmentResult {
            matches: vec![],
            unmatched_tracks: (0..num_rows).collect(),
            unmatched_detections: vec![],
        };
    }

    let size = num_rows.max(num_cols);
    let mut padded = Array2::<f64>::from_elem((size, size), 1e6);

    for i in 0..num_rows {
        for j in 0..num_cols {
            padded[[i, j]] = cost_matrix[[i, j]] as f64;
        }
    }

    let mut matches = vec![];
    let mut unmatched_tracks = vec![];
    let mut matched_detections = vec![false; num_cols];

    match lapjv::lapjv(&padded) {
        Ok((row_to_col, _)) => {
            for (row_idx, &col_idx) in row_to_col.iter().enumerate() {
                if row_idx >= num_rows {
                    continue;
                }
                if col_idx >= num_cols {
                    unmatched_tracks.push(row_idx);
                } else if cost_matrix[[row_idx, col_idx]] <= thresh {
                    matches.push((row_idx, col_idx));
                    matched_detections[col_idx] = true;
                } else {
                    unmatched_tracks.push(row_idx);
                }
            }
        }
        Err(_) => {
            log::warn!("assignment solve failed for a {num_rows}x{num_cols} cost matrix");
            unmatched_tracks = (0..num_rows).collect();
        }
    }

    let unmatched_detections: Vec<usize> = matched_detections
        .iter()
        .enumerate()
        .filter_map(|(j, &m)| if m { None } else { Some(j) })
        .collect();

    AssignmentResult {
        matches,
        unmatched_tracks,
        unmatched_detections,
    }
}
