//! Feature ranking by topic relevance.
//!
//! Each feature is scored by its maximum φ over all labels and the features
//! are ordered by that score, highest first. Ties keep ascending feature
//! index order, so the ranking is deterministic for a fixed φ.

use ndarray::ArrayView2;

/// Features ordered by decreasing max-over-labels relevance.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRanking {
    order: Vec<u32>,
    scores: Vec<f64>,
}

impl FeatureRanking {
    /// Rank the columns of `phi` (`[n_labels, n_features]`).
    pub fn from_phi(phi: ArrayView2<'_, f64>) -> Self {
        let scores: Vec<f64> = phi
            .columns()
            .into_iter()
            .map(|col| col.iter().copied().fold(f64::NEG_INFINITY, f64::max))
            .collect();

        let mut order: Vec<u32> = (0..scores.len() as u32).collect();
        // stable: equal scores stay in index order
        order.sort_by(|&a, &b| scores[b as usize].total_cmp(&scores[a as usize]));

        Self { order, scores }
    }

    /// Feature indices, best first. A permutation of `0..n_features`.
    #[inline]
    pub fn order(&self) -> &[u32] {
        &self.order
    }

    /// Max-over-labels relevance of feature `f` (indexed by feature, not rank).
    #[inline]
    pub fn score(&self, feature: usize) -> f64 {
        self.scores[feature]
    }

    /// Feature at rank `rank`.
    #[inline]
    pub fn get(&self, rank: usize) -> u32 {
        self.order[rank]
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
