//! Validating builder for [`Detection`] records.

use ndarray::Array1;

use crate::tracker::{Detection, DetectionError, Rect};

/// Builder for [`Detection`] objects from the box conventions detectors
/// commonly emit. `build()` validates: non-finite or degenerate boxes and
/// empty embeddings are rejected rather than handed to the tracker.
#[derive(Debug, Clone, Default)]
pub struct DetectionBuilder {
    bbox: Rect,
    confidence: f32,
    embedding: Option<Array1<f32>>,
    label: Option<String>,
}

impl DetectionBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Box as top-left corner plus dimensions (x, y, width, height).
    pub fn tlwh(mut self, x: f32, y: f32, width: f32, height: f32) -> Self {
        self.bbox = Rect::new(x, y, width, height);
        self
    }

    /// Box as corner coordinates (x1, y1, x2, y2).
    pub fn tlbr(mut self, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        self.bbox = Rect::from_tlbr(x1, y1, x2, y2);
        self
    }

    /// Box as center plus dimensions (cx, cy, width, height).
    pub fn center_size(mut self, cx: f32, cy: f32, width: f32, height: f32) -> Self {
        self.bbox = Rect::new(cx - width / 2.0, cy - height / 2.0, width, height);
        self
    }

    /// Detector confidence in [0, 1].
    pub fn confidence(mut self, confidence: f32) -> Self {
        self.confidence = confidence;
        self
    }

    /// Appearance embedding from the feature extractor.
    pub fn embedding(mut self, embedding: Array1<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Class label.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validate and build the detection.
    pub fn build(self) -> Result<Detection, DetectionError> {
        let mut det = Detection::try_new(self.bbox, self.confidence, self.embedding)?;
        det.label = self.label;
        Ok(det)
    }
}
