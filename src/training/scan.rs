//! Candidate evaluation for one boosting round.
//!
//! For a candidate feature every (example, label) weight falls into one of
//! four buckets: feature absent/present × label negative/positive. From the
//! bucket masses we get
//!
//! ```text
//! h[b][l] = ½ · ln((W_b+[l] + ε) / (W_b−[l] + ε))      b ∈ {absent, present}
//! z       = 2 · Σ_l (√(W_0−[l]·W_0+[l]) + √(W_1−[l]·W_1+[l]))
//! ```
//!
//! The candidate with the smallest `z` becomes the round's pivot.

use fixedbitset::FixedBitSet;
use ndarray::{Array2, ArrayView2};

/// Row of the hypothesis table used when the pivot feature is absent.
pub const ABSENT: usize = 0;
/// Row of the hypothesis table used when the pivot feature is present.
pub const PRESENT: usize = 1;

/// Numerical floor `1 / (n_labels · n_samples)`.
#[inline]
pub fn smoothing_epsilon(n_labels: usize, n_samples: usize) -> f64 {
    1.0 / (n_labels * n_samples) as f64
}

/// `+1` for a true label or a positive hypothesis value, `-1` otherwise.
#[inline]
pub fn sign(positive: bool) -> f64 {
    if positive {
        1.0
    } else {
        -1.0
    }
}

/// Weight mass per bucket, each `[2, n_labels]` indexed by
/// [`ABSENT`]/[`PRESENT`].
#[derive(Debug, Clone, PartialEq)]
pub struct BucketMasses {
    pub positive: Array2<f64>,
    pub negative: Array2<f64>,
}

impl BucketMasses {
    /// Accumulate `weights` (`[n_samples, n_labels]`) split by `present`
    /// (examples having the feature) and `labels`.
    pub fn accumulate(
        weights: ArrayView2<'_, f64>,
        labels: ArrayView2<'_, bool>,
        present: &FixedBitSet,
    ) -> Self {
        let n_labels = weights.ncols();
        let mut positive = Array2::zeros((2, n_labels));
        let mut negative = Array2::zeros((2, n_labels));

        for (i, (w_row, y_row)) in weights.rows().into_iter().zip(labels.rows()).enumerate() {
            let branch = if present.contains(i) { PRESENT } else { ABSENT };
            for (l, (&w, &y)) in w_row.iter().zip(y_row.iter()).enumerate() {
                if y {
                    positive[[branch, l]] += w;
                } else {
                    negative[[branch, l]] += w;
                }
            }
        }

        Self { positive, negative }
    }

    /// Smoothed log-odds table, `[2, n_labels]`.
    pub fn hypothesis(&self, epsilon: f64) -> Array2<f64> {
        let mut h = Array2::zeros(self.positive.raw_dim());
        ndarray::Zip::from(&mut h)
            .and(&self.positive)
            .and(&self.negative)
            .for_each(|h, &pos, &neg| *h = 0.5 * ((pos + epsilon) / (neg + epsilon)).ln());
        h
    }

    /// Normalisation score `z`. Lower is better.
    pub fn normalizer(&self) -> f64 {
        let sum: f64 = self
            .positive
            .iter()
            .zip(self.negative.iter())
            .map(|(&pos, &neg)| (pos * neg).sqrt())
            .sum();
        2.0 * sum
    }
}

/// A scored pool entry.
#[derive(Debug, Clone, PartialEq)]
pub struct CandidateScore {
    /// Position of the candidate in the pool.
    pub slot: usize,
    pub feature: u32,
    pub score: f64,
    /// `[2, n_labels]`, see [`BucketMasses::hypothesis`].
    pub hypothesis: Array2<f64>,
}

/// Score one candidate feature against the current weights.
pub fn evaluate_candidate(
    weights: ArrayView2<'_, f64>,
    labels: ArrayView2<'_, bool>,
    present: &FixedBitSet,
    slot: usize,
    feature: u32,
    epsilon: f64,
) -> CandidateScore {
    let masses = BucketMasses::accumulate(weights, labels, present);
    CandidateScore {
        slot,
        feature,
        score: masses.normalizer(),
        hypothesis: masses.hypothesis(epsilon),
    }
}

/// First candidate with the strictly smallest score, in pool order.
pub fn select_pivot(candidates: Vec<CandidateScore>) -> Option<CandidateScore> {
    let mut iter = candidates.into_iter();
    let mut best = iter.next()?;
    for candidate in iter {
        if candidate.score < best.score {
            best = candidate;
        }
    }
    Some(best)
}
