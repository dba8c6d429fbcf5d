//! Rotating candidate pool.
//!
//! The pool holds a fixed number of features seeded with the top of the
//! ranking, in FIFO order. After each round the pivot is removed and the next
//! ranked feature is appended at the back, so the survivors keep their
//! relative order. The cursor into the ranking wraps around once the whole
//! ranking has been consumed, so after enough rounds a feature can re-enter
//! the pool (and may then appear twice).

use crate::ranking::FeatureRanking;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidatePool {
    slots: Vec<u32>,
    /// Rank of the next feature to insert.
    cursor: usize,
}

impl CandidatePool {
    /// Fill `size` slots from the front of `ranking`.
    ///
    /// `size` must be in `1..=ranking.len()`.
    pub fn new(ranking: &FeatureRanking, size: usize) -> Self {
        debug_assert!(size >= 1 && size <= ranking.len());
        let slots = ranking.order()[..size].to_vec();
        Self {
            slots,
            cursor: size % ranking.len(),
        }
    }

    #[inline]
    pub fn slots(&self) -> &[u32] {
        &self.slots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Rank of the feature the next [`replace`](Self::replace) inserts.
    #[inline]
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Remove the feature at position `slot` and append the next ranked
    /// feature at the back.
    ///
    /// Returns the evicted feature.
    pub fn replace(&mut self, slot: usize, ranking: &FeatureRanking) -> u32 {
        let evicted = self.slots.remove(slot);
        self.slots.push(ranking.get(self.cursor));
        self.cursor = (self.cursor + 1) % ranking.len();
        evicted
    }
}
