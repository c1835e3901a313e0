//! Bounded per-track appearance memory.

use std::collections::VecDeque;

use ndarray::Array1;

/// Bounded FIFO gallery of a track's recent appearance embeddings.
///
/// Eviction is strictly oldest-first (ring-buffer semantics, not
/// similarity-based), which keeps per-track memory constant and lets the
/// gallery follow gradual appearance drift.
#[derive(Debug, Clone)]
pub struct AppearanceGallery {
    embeddings: VecDeque<Array1<f32>>,
    capacity: usize,
}

impl AppearanceGallery {
    pub fn new(capacity: usize) -> Self {
        Self {
            embeddings: VecDeque::with_capacity(capacity.min(128)),
            capacity,
        }
    }

    /// Append an embedding, evicting the oldest when full.
    pub fn push(&mut self, embedding: Array1<f32>) {
        if self.capacity == 0 {
            return;
        }
        if self.embeddings.len() == self.capacity {
            self.embeddings.pop_front();
        }
        self.embeddings.push_back(embedding);
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.embeddings.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.embeddings.is_empty()
    }

    /// Nearest-neighbor cosine distance between the query and the stored
    /// embeddings: `min over gallery of 1 - cos(stored, query)`. Returns
    /// `None` when the gallery is empty.
    pub fn min_cosine_distance(&self, query: &Array1<f32>) -> Option<f32> {
        let query_norm = norm(query);
        if query_norm == 0.0 {
            return None;
        }

        self.embeddings
            .iter()
            .filter_map(|stored| {
                let stored_norm = norm(stored);
                if stored_norm == 0.0 || stored.len() != query.len() {
                    return None;
                }
                let cos = stored.dot(query) / (stored_norm * query_norm);
                Some(1.0 - cos)
            })
            .min_by(|a, b| a.total_cmp(b))
    }
}

#[inline]
fn norm(v: &Array1<f32>) -> f32 {
    v.dot(v).sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::arr1;

    #[test]
    fn test_push_evicts_oldest() {
        let mut gallery = AppearanceGallery::new(3);
        for i in 0..5 {
            gallery.push(arr1(&[i as f32, 1.0]));
        }
        assert_eq!(gallery.len(), 3);
        // the two oldest embeddings are gone; nearest match for [2, 1]
        // is exact
        let d = gallery.min_cosine_distance(&arr1(&[2.0, 1.0])).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_min_cosine_distance_picks_closest() {
        let mut gallery = AppearanceGallery::new(10);
        gallery.push(arr1(&[1.0, 0.0]));
        gallery.push(arr1(&[0.0, 1.0]));

        let d = gallery.min_cosine_distance(&arr1(&[1.0, 0.1])).unwrap();
        // near-parallel to the first embedding
        assert!(d < 0.01);

        let d = gallery.min_cosine_distance(&arr1(&[-1.0, -1.0])).unwrap();
        // opposed to both stored embeddings
        assert!(d > 1.0);
    }

    #[test]
    fn test_scale_invariance() {
        let mut gallery = AppearanceGallery::new(10);
        gallery.push(arr1(&[2.0, 0.0, 0.0]));
        let d = gallery.min_cosine_distance(&arr1(&[0.5, 0.0, 0.0])).unwrap();
        assert!(d.abs() < 1e-6);
    }

    #[test]
    fn test_empty_gallery() {
        let gallery = AppearanceGallery::new(10);
        assert!(gallery.is_empty());
        assert!(gallery.min_cosine_distance(&arr1(&[1.0, 0.0])).is_none());
    }

    #[test]
    fn test_zero_query_is_no_evidence() {
        let mut gallery = AppearanceGallery::new(10);
        gallery.push(arr1(&[1.0, 0.0]));
        assert!(gallery.min_cosine_distance(&arr1(&[0.0, 0.0])).is_none());
    }
}
