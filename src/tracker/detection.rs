//! Per-frame detection input for the tracker.

use ndarray::Array1;
use thiserror::Error;

use crate::tracker::rect::Rect;

/// Validation failure when constructing a [`Detection`].
#[derive(Debug, Clone, Error)]
pub enum DetectionError {
    #[error("bounding box has non-finite coordinates")]
    NonFiniteBox,
    #[error("bounding box has non-positive extent ({width} x {height})")]
    DegenerateBox { width: f32, height: f32 },
    #[error("appearance embedding is empty")]
    EmptyEmbedding,
}

/// One frame's observation of an object: a bounding box, a confidence score,
/// and optionally an appearance embedding and a class label.
///
/// Whether an embedding was supplied is a per-detection capability the
/// matcher checks exactly once; a detection without one participates in
/// motion-gated and IoU matching only.
#[derive(Debug, Clone)]
pub struct Detection {
    /// Bounding box in TLWH format
    pub bbox: Rect,
    /// Detector confidence in [0, 1]
    pub confidence: f32,
    /// Appearance embedding of fixed dimensionality, if the feature
    /// extractor produced one for this box
    pub embedding: Option<Array1<f32>>,
    /// Optional class label (e.g. the animal species or instance name)
    pub label: Option<String>,
}

impl Detection {
    /// Create a detection from a box and confidence, with no embedding.
    pub fn new(bbox: Rect, confidence: f32) -> Self {
        Self {
            bbox,
            confidence,
            embedding: None,
            label: None,
        }
    }

    /// Attach an appearance embedding.
    pub fn with_embedding(mut self, embedding: Array1<f32>) -> Self {
        self.embedding = Some(embedding);
        self
    }

    /// Attach a class label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Validated construction: rejects non-finite or degenerate boxes and
    /// empty embeddings up front rather than silently inside the tracker.
    pub fn try_new(
        bbox: Rect,
        confidence: f32,
        embedding: Option<Array1<f32>>,
    ) -> Result<Self, DetectionError> {
        if !bbox.x.is_finite()
            || !bbox.y.is_finite()
            || !bbox.width.is_finite()
            || !bbox.height.is_finite()
        {
            return Err(DetectionError::NonFiniteBox);
        }
        if bbox.width <= 0.0 || bbox.height <= 0.0 {
            return Err(DetectionError::DegenerateBox {
                width: bbox.width,
                height: bbox.height,
            });
        }
        if let Some(e) = &embedding {
            if e.is_empty() {
                return Err(DetectionError::EmptyEmbedding);
            }
        }
        Ok(Self {
            bbox,
            confidence,
            embedding,
            label: None,
        })
    }

    /// Whether this detection carries an appearance embedding.
    #[inline]
    pub fn has_embedding(&self) -> bool {
        self.embedding.is_some()
    }
}
