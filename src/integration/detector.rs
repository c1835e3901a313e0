//! Trait for detection inference backends.

use crate::tracker::Detection;

/// A per-frame supplier of detections.
///
/// Implementations wrap whatever produces boxes for a frame: an object
/// detector, optionally followed by an appearance-embedding extractor that
/// fills in [`Detection::embedding`]. The tracker requires exactly-once,
/// in-order delivery of each frame's detection set; implementations running
/// inference on a worker must materialize and reorder results before
/// returning them here.
///
/// # Example
///
/// ```ignore
/// use deepsort_rs::{Detection, DetectionSource};
///
/// struct MyDetector { /* model handle */ }
///
/// impl DetectionSource for MyDetector {
///     type Error = std::io::Error;
///
///     fn detect(&mut self, frame: &[u8], width: u32, height: u32) -> Result<Vec<Detection>, Self::Error> {
///         // run inference, attach embeddings, return detections
///         Ok(vec![])
///     }
/// }
/// ```
pub trait DetectionSource {
    /// Error type for detection failures.
    type Error;

    /// Run inference on raw frame data and return that frame's detections.
    fn detect(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<Detection>, Self::Error>;
}

/// Conversion from a model-specific output format into detections.
pub trait IntoDetections {
    fn into_detections(self) -> Vec<Detection>;
}

impl IntoDetections for Vec<Detection> {
    fn into_detections(self) -> Vec<Detection> {
        self
    }
}
