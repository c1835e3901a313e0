use deepsort_rs::{DeepSortTracker, Detection, Rect, TrackState, TrackerConfig};
use ndarray::arr1;

fn det(x: f32, y: f32, w: f32, h: f32, conf: f32) -> Detection {
    Detection::new(Rect::new(x, y, w, h), conf)
}

fn quick_confirm_config(max_age: u32) -> TrackerConfig {
    TrackerConfig {
        max_age,
        n_init: 1,
        ..TrackerConfig::default()
    }
}

#[test]
fn test_single_detection_spawns_tentative_track() {
    // Scenario: empty track list, one detection
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    let tracks = tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);

    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].state, TrackState::Tentative);
    assert_eq!(tracker.tracks()[0].hits(), 1);
    assert_eq!(tracker.tracks()[0].time_since_update, 0);
}

#[test]
fn test_confirmation_requires_consecutive_hits() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default()); // n_init = 3

    let t1 = tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    assert_eq!(t1[0].state, TrackState::Tentative);

    let t2 = tracker.update(vec![det(10.5, 10.5, 20.0, 20.0, 0.9)]);
    assert_eq!(t2[0].state, TrackState::Tentative);

    let t3 = tracker.update(vec![det(11.0, 11.0, 20.0, 20.0, 0.9)]);
    assert_eq!(t3[0].state, TrackState::Confirmed);
    assert_eq!(t3[0].track_id, t1[0].track_id);
}

#[test]
fn test_tentative_track_dies_on_first_miss() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);

    let tracks = tracker.update(vec![]);
    assert!(tracks.is_empty());
    assert!(tracker.tracks().is_empty());
}

#[test]
fn test_matched_update_resets_time_since_update() {
    // Scenario: confirmed track, nearby detection with a matching embedding
    let mut tracker = DeepSortTracker::new(quick_confirm_config(30));
    let embedding = arr1(&[1.0_f32, 0.0, 0.0]);

    tracker.update(vec![
        det(50.0, 50.0, 30.0, 40.0, 0.9).with_embedding(embedding.clone()),
    ]);
    let t2 = tracker.update(vec![
        det(50.0, 50.0, 30.0, 40.0, 0.9).with_embedding(embedding.clone()),
    ]);
    assert_eq!(t2[0].state, TrackState::Confirmed);
    let hits_before = tracker.tracks()[0].hits();

    let t3 = tracker.update(vec![
        det(52.0, 51.0, 30.0, 41.0, 0.9).with_embedding(arr1(&[0.99, 0.05, 0.0])),
    ]);
    assert_eq!(t3.len(), 1);
    assert_eq!(t3[0].track_id, t2[0].track_id);
    assert_eq!(tracker.tracks()[0].hits(), hits_before + 1);
    assert_eq!(tracker.tracks()[0].time_since_update, 0);
}

#[test]
fn test_confirmed_track_deleted_after_max_age_misses() {
    // Scenario: deletion exactly on miss max_age + 1, not before
    let max_age = 3;
    let mut tracker = DeepSortTracker::new(quick_confirm_config(max_age));

    tracker.update(vec![det(10.0, 10.0, 20.0, 40.0, 0.9)]);
    let tracks = tracker.update(vec![det(10.0, 10.0, 20.0, 40.0, 0.9)]);
    assert_eq!(tracks[0].state, TrackState::Confirmed);

    for miss in 1..=max_age {
        let tracks = tracker.update(vec![]);
        assert_eq!(tracks.len(), 1, "still alive after miss {miss}");
        assert_eq!(tracks[0].state, TrackState::Confirmed);
    }

    let tracks = tracker.update(vec![]);
    assert!(tracks.is_empty(), "deleted on miss {}", max_age + 1);
}

#[test]
fn test_appearance_resolves_motion_ambiguity() {
    // Scenario: two heavily overlapping tracks with distinct embeddings;
    // detections cross positions but keep their appearance. Pure IoU would
    // keep each track at its old position; appearance must swap them.
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    let emb_a = arr1(&[1.0_f32, 0.0]);
    let emb_b = arr1(&[0.0_f32, 1.0]);

    for _ in 0..3 {
        tracker.update(vec![
            det(100.0, 100.0, 40.0, 40.0, 0.9).with_embedding(emb_a.clone()),
            det(106.0, 100.0, 40.0, 40.0, 0.9).with_embedding(emb_b.clone()),
        ]);
    }
    let tracks = tracker.tracks();
    assert_eq!(tracks.len(), 2);
    assert!(tracks.iter().all(|t| t.is_confirmed()));
    let id_a = tracks[0].track_id;
    let id_b = tracks[1].track_id;

    // positions swapped, embeddings (and distinct confidences) kept
    tracker.update(vec![
        det(106.0, 100.0, 40.0, 40.0, 0.77).with_embedding(emb_a.clone()),
        det(100.0, 100.0, 40.0, 40.0, 0.88).with_embedding(emb_b.clone()),
    ]);

    let track_a = tracker.tracks().iter().find(|t| t.track_id == id_a).unwrap();
    let track_b = tracker.tracks().iter().find(|t| t.track_id == id_b).unwrap();
    assert_eq!(track_a.confidence(), 0.77);
    assert_eq!(track_b.confidence(), 0.88);
    assert_eq!(track_a.time_since_update, 0);
    assert_eq!(track_b.time_since_update, 0);
}

#[test]
fn test_distant_detection_is_not_stolen() {
    let mut tracker = DeepSortTracker::new(quick_confirm_config(30));
    tracker.update(vec![det(10.0, 10.0, 20.0, 40.0, 0.9)]);
    let t2 = tracker.update(vec![det(10.0, 10.0, 20.0, 40.0, 0.9)]);
    let confirmed_id = t2[0].track_id;

    // far outside both the Mahalanobis gate and any IoU overlap
    let tracks = tracker.update(vec![det(500.0, 500.0, 20.0, 40.0, 0.9)]);

    assert_eq!(tracks.len(), 2);
    let old = tracks.iter().find(|t| t.track_id == confirmed_id).unwrap();
    assert_eq!(old.state, TrackState::Confirmed);
    let spawned = tracks.iter().find(|t| t.track_id != confirmed_id).unwrap();
    assert_eq!(spawned.state, TrackState::Tentative);
    assert_eq!(tracker.tracks().iter().find(|t| t.track_id == confirmed_id).unwrap().time_since_update, 1);
}

#[test]
fn test_conservation_of_tracks_and_detections() {
    let mut tracker = DeepSortTracker::new(quick_confirm_config(30));
    tracker.update(vec![
        det(10.0, 10.0, 20.0, 40.0, 0.9),
        det(200.0, 200.0, 20.0, 40.0, 0.9),
    ]);
    tracker.update(vec![
        det(10.0, 10.0, 20.0, 40.0, 0.9),
        det(200.0, 200.0, 20.0, 40.0, 0.9),
    ]);
    assert_eq!(tracker.tracks().len(), 2);

    // 2 live tracks, 3 detections: both tracks match, one detection spawns
    let tracks = tracker.update(vec![
        det(10.0, 10.0, 20.0, 40.0, 0.9),
        det(200.0, 200.0, 20.0, 40.0, 0.9),
        det(400.0, 50.0, 20.0, 40.0, 0.9),
    ]);
    assert_eq!(tracks.len(), 3);
    assert_eq!(
        tracks.iter().filter(|t| t.state == TrackState::Confirmed).count(),
        2
    );
    assert_eq!(
        tracks.iter().filter(|t| t.state == TrackState::Tentative).count(),
        1
    );
}

#[test]
fn test_empty_frames_and_empty_tracker_are_valid() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    assert!(tracker.update(vec![]).is_empty());
    assert!(tracker.update(vec![]).is_empty());

    let tracks = tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    assert_eq!(tracks.len(), 1);
}

#[test]
fn test_track_ids_are_unique_and_never_reused() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());

    let t1 = tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    let first_id = t1[0].track_id;

    // tentative track dies on its first miss
    tracker.update(vec![]);

    let t2 = tracker.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    assert_ne!(t2[0].track_id, first_id);
    assert!(t2[0].track_id > first_id);
}

#[test]
fn test_id_counters_are_per_instance() {
    let mut a = DeepSortTracker::new(TrackerConfig::default());
    let mut b = DeepSortTracker::new(TrackerConfig::default());

    let ta = a.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    let tb = b.update(vec![det(10.0, 10.0, 20.0, 20.0, 0.9)]);
    assert_eq!(ta[0].track_id, tb[0].track_id);
}

#[test]
fn test_degenerate_detections_are_dropped() {
    let mut tracker = DeepSortTracker::new(TrackerConfig::default());
    let tracks = tracker.update(vec![
        det(10.0, 10.0, 0.0, 20.0, 0.9),
        det(10.0, 10.0, 20.0, -5.0, 0.9),
        det(f32::NAN, 10.0, 20.0, 20.0, 0.9),
    ]);
    assert!(tracks.is_empty());
}

#[test]
fn test_mismatched_embedding_dimension_is_discarded() {
    let mut tracker = DeepSortTracker::new(quick_confirm_config(30));
    tracker.update(vec![
        det(10.0, 10.0, 20.0, 40.0, 0.9).with_embedding(arr1(&[1.0, 0.0])),
    ]);

    // wrong dimension: embedding is dropped, the detection still matches
    // through motion and IoU
    let tracks = tracker.update(vec![
        det(10.0, 10.0, 20.0, 40.0, 0.9).with_embedding(arr1(&[1.0, 0.0, 0.0])),
    ]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].state, TrackState::Confirmed);
    assert_eq!(tracker.tracks()[0].gallery().len(), 1);
}

#[test]
fn test_mixed_embedding_availability() {
    // A detection without an embedding still matches a gallery-backed track
    // through the motion gate alone.
    let mut tracker = DeepSortTracker::new(quick_confirm_config(30));
    tracker.update(vec![
        det(50.0, 50.0, 30.0, 40.0, 0.9).with_embedding(arr1(&[1.0, 0.0])),
    ]);
    let t2 = tracker.update(vec![
        det(50.0, 50.0, 30.0, 40.0, 0.9).with_embedding(arr1(&[1.0, 0.0])),
    ]);
    let id = t2[0].track_id;

    let tracks = tracker.update(vec![det(51.0, 50.0, 30.0, 40.0, 0.9)]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, id);
    assert_eq!(tracker.tracks()[0].time_since_update, 0);
}

#[test]
fn test_track_recovered_within_max_age_keeps_identity() {
    let mut tracker = DeepSortTracker::new(quick_confirm_config(10));
    let embedding = arr1(&[0.5_f32, 0.5]);

    tracker.update(vec![
        det(100.0, 100.0, 30.0, 40.0, 0.9).with_embedding(embedding.clone()),
    ]);
    let t2 = tracker.update(vec![
        det(100.0, 100.0, 30.0, 40.0, 0.9).with_embedding(embedding.clone()),
    ]);
    let id = t2[0].track_id;

    // three missed frames, then the object reappears nearby with the same
    // appearance: the cascade reaches tracks at deeper levels
    for _ in 0..3 {
        tracker.update(vec![]);
    }
    let tracks = tracker.update(vec![
        det(102.0, 101.0, 30.0, 40.0, 0.9).with_embedding(embedding.clone()),
    ]);
    assert_eq!(tracks.len(), 1);
    assert_eq!(tracks[0].track_id, id);
    assert_eq!(tracks[0].state, TrackState::Confirmed);
}
