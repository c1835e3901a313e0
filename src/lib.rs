//! Appearance-aware multi-object tracking.
//!
//! This crate turns a per-frame stream of object detections (bounding boxes
//! plus optional appearance embeddings) into temporally consistent track
//! identities. Each track owns a constant-velocity Kalman filter and a
//! bounded gallery of recent appearance embeddings; association runs as a
//! Mahalanobis-gated, appearance-ranked matching cascade with an IoU
//! fallback stage, solved by Jonker-Volgenant assignment.
//!
//! The crate does not decode video or run detection models. Feed it
//! [`Detection`] records frame by frame through [`DeepSortTracker::update`],
//! or couple it to any detector via the [`integration`] module.
//!
//! # Example
//!
//! ```
//! use deepsort_rs::{DeepSortTracker, Detection, Rect, TrackState, TrackerConfig};
//!
//! let mut tracker = DeepSortTracker::new(TrackerConfig::default());
//! let dets = vec![Detection::new(Rect::new(10.0, 10.0, 20.0, 20.0), 0.9)];
//! let tracks = tracker.update(dets);
//! assert_eq!(tracks.len(), 1);
//! assert_eq!(tracks[0].state, TrackState::Tentative);
//! ```

pub mod integration;
pub mod tracker;

pub use integration::{DetectionBuilder, DetectionSource, IntoDetections, TrackerPipeline};
pub use tracker::{
    DeepSortTracker, Detection, DetectionError, Rect, Track, TrackOutput, TrackState,
    TrackerConfig,
};
