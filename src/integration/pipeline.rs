//! End-to-end per-frame pipeline: detection source plus tracker.

use crate::tracker::{DeepSortTracker, TrackOutput, TrackerConfig};

use super::DetectionSource;

/// Couples a [`DetectionSource`] to a [`DeepSortTracker`] for end-to-end
/// per-frame processing. Frames must be fed in order; each call completes
/// one full predict-match-update cycle.
pub struct TrackerPipeline<D: DetectionSource> {
    detector: D,
    tracker: DeepSortTracker,
}

impl<D: DetectionSource> TrackerPipeline<D> {
    pub fn new(detector: D, config: TrackerConfig) -> Self {
        Self {
            detector,
            tracker: DeepSortTracker::new(config),
        }
    }

    pub fn with_default_config(detector: D) -> Self {
        Self::new(detector, TrackerConfig::default())
    }

    /// Run detection on one frame and update the tracker with the result.
    /// Returns the post-update snapshot of every live track; a detector
    /// error leaves the tracker untouched and the frame must be retried or
    /// discarded by the caller.
    pub fn process_frame(
        &mut self,
        frame: &[u8],
        width: u32,
        height: u32,
    ) -> Result<Vec<TrackOutput>, D::Error> {
        let detections = self.detector.detect(frame, width, height)?;
        Ok(self.tracker.update(detections))
    }

    pub fn detector(&self) -> &D {
        &self.detector
    }

    pub fn detector_mut(&mut self) -> &mut D {
        &mut self.detector
    }

    pub fn tracker(&self) -> &DeepSortTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut DeepSortTracker {
        &mut self.tracker
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::{Detection, Rect, TrackState};

    struct MockDetector {
        detections: Vec<Detection>,
    }

    impl DetectionSource for MockDetector {
        type Error = std::convert::Infallible;

        fn detect(
            &mut self,
            _frame: &[u8],
            _width: u32,
            _height: u32,
        ) -> Result<Vec<Detection>, Self::Error> {
            Ok(self.detections.clone())
        }
    }

    #[test]
    fn test_pipeline_spawns_tentative_track() {
        let detector = MockDetector {
            detections: vec![Detection::new(Rect::new(10.0, 20.0, 40.0, 60.0), 0.9)],
        };

        let mut pipeline = TrackerPipeline::with_default_config(detector);
        let tracks = pipeline.process_frame(&[], 640, 480).unwrap();

        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].state, TrackState::Tentative);
    }
}
