mod deep_sort;
mod detection;
mod gallery;
mod kalman_filter;
mod matching;
mod rect;
mod track;
mod track_state;

pub use deep_sort::{DeepSortTracker, TrackOutput, TrackerConfig};
pub use detection::{Detection, DetectionError};
pub use gallery::AppearanceGallery;
pub use kalman_filter::{GATING_THRESHOLD, KalmanFilter};
pub use rect::Rect;
pub use track::Track;
pub use track_state::TrackState;
