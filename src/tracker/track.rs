//! Single-object track: one identity's filter state, appearance gallery
//! and lifecycle counters.

use ndarray::{Array1, Array2};

use crate::tracker::detection::Detection;
use crate::tracker::gallery::AppearanceGallery;
use crate::tracker::kalman_filter::KalmanFilter;
use crate::tracker::rect::Rect;
use crate::tracker::track_state::TrackState;

/// A persistent identity estimate for one physical object.
///
/// The motion state is owned exclusively by the track and mutated only
/// through [`Track::predict`] and [`Track::update`]. Lifecycle follows
/// `Tentative -> Confirmed -> Deleted`: a track confirms after `n_init`
/// consecutive matches, a Tentative track dies on its first miss, and a
/// Confirmed track dies once `time_since_update` exceeds `max_age`.
#[derive(Debug, Clone)]
pub struct Track {
    /// Unique, never-reused identifier
    pub track_id: u64,
    /// Frames since the last matched update
    pub time_since_update: u32,

    state: TrackState,
    mean: Array1<f64>,
    covariance: Array2<f64>,
    gallery: AppearanceGallery,
    hits: u32,
    age: u32,
    confidence: f32,
    label: Option<String>,
    n_init: u32,
    max_age: u32,
}

impl Track {
    /// Create a Tentative track from an unmatched detection.
    pub fn new(
        kf: &KalmanFilter,
        detection: &Detection,
        track_id: u64,
        n_init: u32,
        max_age: u32,
        gallery_size: usize,
    ) -> Self {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) = kf.initiate([
            xyah[0] as f64,
            xyah[1] as f64,
            xyah[2] as f64,
            xyah[3] as f64,
        ]);

        let mut gallery = AppearanceGallery::new(gallery_size);
        if let Some(embedding) = &detection.embedding {
            gallery.push(embedding.clone());
        }

        Self {
            track_id,
            time_since_update: 0,
            state: TrackState::Tentative,
            mean,
            covariance,
            gallery,
            hits: 1,
            age: 1,
            confidence: detection.confidence,
            label: detection.label.clone(),
            n_init,
            max_age,
        }
    }

    /// Current box estimate in TLWH format, derived from the filter mean.
    pub fn bbox(&self) -> Rect {
        Rect::from_xyah(
            self.mean[0] as f32,
            self.mean[1] as f32,
            self.mean[2] as f32,
            self.mean[3] as f32,
        )
    }

    /// Advance the motion state one frame. Counts as a provisional miss
    /// until a matched update resets `time_since_update`.
    pub fn predict(&mut self, kf: &KalmanFilter) {
        let (mean, covariance) = kf.predict(&self.mean, &self.covariance);
        self.mean = mean;
        self.covariance = covariance;
        self.age += 1;
        self.time_since_update += 1;
    }

    /// Apply a matched detection: filter correction, gallery append,
    /// counter updates, and Tentative -> Confirmed once `hits` reaches
    /// `n_init`.
    pub fn update(&mut self, kf: &KalmanFilter, detection: &Detection) {
        let xyah = detection.bbox.to_xyah();
        let (mean, covariance) = kf.update(
            &self.mean,
            &self.covariance,
            [
                xyah[0] as f64,
                xyah[1] as f64,
                xyah[2] as f64,
                xyah[3] as f64,
            ],
        );
        self.mean = mean;
        self.covariance = covariance;

        if let Some(embedding) = &detection.embedding {
            self.gallery.push(embedding.clone());
        }

        self.hits += 1;
        self.time_since_update = 0;
        self.confidence = detection.confidence;
        if detection.label.is_some() {
            self.label = detection.label.clone();
        }

        if self.state == TrackState::Tentative && self.hits >= self.n_init {
            self.state = TrackState::Confirmed;
        }
    }

    /// Register that no detection matched this track this frame.
    ///
    /// A Tentative track has no tolerance for a missed confirmation; a
    /// Confirmed track survives up to `max_age` misses.
    pub fn mark_missed(&mut self) {
        if self.state == TrackState::Tentative {
            self.state = TrackState::Deleted;
        } else if self.time_since_update > self.max_age {
            self.state = TrackState::Deleted;
        }
    }

    #[inline]
    pub fn state(&self) -> TrackState {
        self.state
    }

    #[inline]
    pub fn is_tentative(&self) -> bool {
        self.state == TrackState::Tentative
    }

    #[inline]
    pub fn is_confirmed(&self) -> bool {
        self.state == TrackState::Confirmed
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.state == TrackState::Deleted
    }

    #[inline]
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }

    #[inline]
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }

    #[inline]
    pub fn gallery(&self) -> &AppearanceGallery {
        &self.gallery
    }

    /// Total matched updates, including the creating detection.
    #[inline]
    pub fn hits(&self) -> u32 {
        self.hits
    }

    /// Frames since the track was created.
    #[inline]
    pub fn age(&self) -> u32 {
        self.age
    }

    /// Confidence of the most recently matched detection.
    #[inline]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    #[inline]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}
