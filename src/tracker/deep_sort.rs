//! Tracker orchestration: predict, cascade match, update, spawn, expire.

use crate::tracker::detection::Detection;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::matching::{self, AssignmentResult};
use crate::tracker::rect::Rect;
use crate::tracker::track::Track;
use crate::tracker::track_state::TrackState;

/// Configuration for the tracker.
#[derive(Debug, Clone)]
pub struct TrackerConfig {
    /// Misses a Confirmed track tolerates before deletion
    pub max_age: u32,
    /// Consecutive hits required to confirm a Tentative track
    pub n_init: u32,
    /// Embeddings retained per track
    pub gallery_size: usize,
    /// Cost threshold (`1 - IoU`) for the IoU association stage
    pub max_iou_distance: f32,
    /// Cost threshold on min cosine distance for the appearance cascade
    pub max_appearance_distance: f32,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self {
            max_age: 30,
            n_init: 3,
            gallery_size: 100,
            max_iou_distance: 0.7,
            max_appearance_distance: 0.2,
        }
    }
}

/// Per-frame snapshot of one live track.
#[derive(Debug, Clone)]
pub struct TrackOutput {
    pub track_id: u64,
    pub bbox: Rect,
    pub state: TrackState,
    pub confidence: f32,
    pub label: Option<String>,
}

/// Appearance-aware multi-object tracker.
///
/// Each call to [`DeepSortTracker::update`] consumes exactly one frame's
/// detections, in frame order. The tracker is single-threaded and mutates
/// its live-track list in place; the caller must not interleave frames.
pub struct DeepSortTracker {
    tracks: Vec<Track>,
    next_id: u64,
    embedding_dim: Option<usize>,
    config: TrackerConfig,
    kalman_filter: KalmanFilter,
}

impl DeepSortTracker {
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            tracks: Vec::new(),
            next_id: 1,
            embedding_dim: None,
            config,
            kalman_filter: KalmanFilter::default(),
        }
    }

    /// Process one frame of detections and return a snapshot of every live
    /// track. Consumers displaying results should filter to
    /// [`TrackState::Confirmed`]; Tentative tracks are exposed for
    /// diagnostics.
    pub fn update(&mut self, detections: Vec<Detection>) -> Vec<TrackOutput> {
        let detections = self.sanitize(detections);

        // Step 1: advance every track's motion state
        for track in &mut self.tracks {
            track.predict(&self.kalman_filter);
        }

        // Step 2: cascade + IoU association
        let (matches, unmatched_tracks, unmatched_detections) = self.associate(&detections);

        // Step 3: apply matches, age the rest
        for (track_idx, det_idx) in matches {
            self.tracks[track_idx].update(&self.kalman_filter, &detections[det_idx]);
        }
        for track_idx in unmatched_tracks {
            self.tracks[track_idx].mark_missed();
        }

        // Step 4: spawn a Tentative track per unmatched detection
        for det_idx in unmatched_detections {
            let track_id = self.next_id;
            self.next_id += 1;
            self.tracks.push(Track::new(
                &self.kalman_filter,
                &detections[det_idx],
                track_id,
                self.config.n_init,
                self.config.max_age,
                self.config.gallery_size,
            ));
        }

        // Step 5: drop deleted tracks and snapshot the rest
        self.tracks.retain(|t| !t.is_deleted());

        self.tracks
            .iter()
            .map(|t| TrackOutput {
                track_id: t.track_id,
                bbox: t.bbox(),
                state: t.state(),
                confidence: t.confidence(),
                label: t.label().map(str::to_owned),
            })
            .collect()
    }

    /// Borrow the live track list (Tentative tracks included).
    pub fn tracks(&self) -> &[Track] {
        &self.tracks
    }

    /// Drop degenerate boxes and embeddings whose dimensionality does not
    /// match the session's. The first embedding seen fixes the expected
    /// dimension.
    fn sanitize(&mut self, detections: Vec<Detection>) -> Vec<Detection> {
        let mut kept = Vec::with_capacity(detections.len());
        for mut det in detections {
            if !det.bbox.is_valid() {
                log::debug!(
                    "dropping detection with degenerate box ({} x {})",
                    det.bbox.width,
                    det.bbox.height
                );
                continue;
            }
            if let Some(embedding) = &det.embedding {
                match self.embedding_dim {
                    None => self.embedding_dim = Some(embedding.len()),
                    Some(dim) if embedding.len() != dim => {
                        log::warn!(
                            "discarding embedding of dimension {} (session uses {dim})",
                            embedding.len()
                        );
                        det.embedding = None;
                    }
                    Some(_) => {}
                }
            }
            kept.push(det);
        }
        kept
    }

    /// Partition detections and tracks into matches and unmatched pools.
    ///
    /// Confirmed tracks match first, level by level of `time_since_update`
    /// (most recently updated first), on Mahalanobis-gated appearance cost.
    /// Tentative tracks and confirmed tracks missed exactly once then get
    /// one IoU pass against the leftover detections. Candidates are always
    /// presented in live-list order, which is ascending track id, so
    /// equal-cost ties resolve to the lowest id.
    #[allow(clippy::type_complexity)]
    fn associate(
        &self,
        detections: &[Detection],
    ) -> (Vec<(usize, usize)>, Vec<usize>, Vec<usize>) {
        let mut matches: Vec<(usize, usize)> = Vec::new();
        let mut unmatched_detections: Vec<usize> = (0..detections.len()).collect();

        let mut cascade_unmatched: Vec<usize> = self
            .tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.is_confirmed())
            .map(|(i, _)| i)
            .collect();

        // predict() has already incremented time_since_update, so a track
        // updated last frame sits at level 0 with time_since_update == 1
        for level in 0..self.config.max_age {
            if unmatched_detections.is_empty() {
                break;
            }

            let level_tracks: Vec<usize> = cascade_unmatched
                .iter()
                .copied()
                .filter(|&i| self.tracks[i].time_since_update == 1 + level)
                .collect();
            if level_tracks.is_empty() {
                continue;
            }

            let track_refs: Vec<&Track> = level_tracks.iter().map(|&i| &self.tracks[i]).collect();
            let det_refs: Vec<&Detection> = unmatched_detections
                .iter()
                .map(|&j| &detections[j])
                .collect();

            let cost = matching::gated_appearance_cost(&self.kalman_filter, &track_refs, &det_refs);
            let AssignmentResult {
                matches: level_matches,
                unmatched_detections: level_unmatched_dets,
                ..
            } = matching::linear_assignment(&cost, self.config.max_appearance_distance);

            for (row, col) in level_matches {
                let track_idx = level_tracks[row];
                matches.push((track_idx, unmatched_detections[col]));
                cascade_unmatched.retain(|&i| i != track_idx);
            }
            unmatched_detections = level_unmatched_dets
                .into_iter()
                .map(|col| unmatched_detections[col])
                .collect();
        }

        // IoU stage: all Tentative tracks, plus confirmed tracks the
        // cascade left unmatched that were seen last frame
        let mut iou_candidates: Vec<usize> = Vec::new();
        let mut unmatched_tracks: Vec<usize> = Vec::new();
        for (i, track) in self.tracks.iter().enumerate() {
            if track.is_tentative() {
                iou_candidates.push(i);
            } else if cascade_unmatched.contains(&i) {
                if track.time_since_update == 1 {
                    iou_candidates.push(i);
                } else {
                    unmatched_tracks.push(i);
                }
            }
        }

        if !iou_candidates.is_empty() && !unmatched_detections.is_empty() {
            let track_refs: Vec<&Track> =
                iou_candidates.iter().map(|&i| &self.tracks[i]).collect();
            let det_refs: Vec<&Detection> = unmatched_detections
                .iter()
                .map(|&j| &detections[j])
                .collect();

            let cost = matching::iou_cost(&track_refs, &det_refs);
            let AssignmentResult {
                matches: iou_matches,
                unmatched_tracks: iou_unmatched_tracks,
                unmatched_detections: iou_unmatched_dets,
            } = matching::linear_assignment(&cost, self.config.max_iou_distance);

            for (row, col) in iou_matches {
                matches.push((iou_candidates[row], unmatched_detections[col]));
            }
            for row in iou_unmatched_tracks {
                unmatched_tracks.push(iou_candidates[row]);
            }
            unmatched_detections = iou_unmatched_dets
                .into_iter()
                .map(|col| unmatched_detections[col])
                .collect();
        } else {
            unmatched_tracks.extend(iou_candidates);
        }

        (matches, unmatched_tracks, unmatched_detections)
    }
}
