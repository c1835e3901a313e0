//! Glue for coupling detection and feature-extraction backends to the
//! tracker.
//!
//! The tracker itself never runs inference; it consumes fully materialized,
//! frame-ordered detection sets. This module provides the seam: implement
//! [`DetectionSource`] for a detector (and optional embedding extractor),
//! build validated [`crate::Detection`] records with [`DetectionBuilder`],
//! and drive both with [`TrackerPipeline`].

mod builder;
mod detector;
mod pipeline;

pub use builder::DetectionBuilder;
pub use detector::{DetectionSource, IntoDetections};
pub use pipeline::TrackerPipeline;
