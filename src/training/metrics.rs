//! Multi-label evaluation metrics.
//!
//! All metrics compare a predicted label matrix against the true one, both
//! `[n_samples, n_labels]`.
//!
//! - [`HammingLoss`]: fraction of wrong (example, label) cells
//! - [`SubsetAccuracy`]: fraction of examples with every label right
//! - [`MicroF1`]: F1 over all (example, label) cells pooled

use ndarray::{ArrayView2, Zip};

/// A multi-label quality measure.
pub trait MultiLabelMetric {
    /// Compute the metric. Shapes must match.
    fn compute(&self, predicted: ArrayView2<'_, bool>, truth: ArrayView2<'_, bool>) -> f64;

    fn higher_is_better(&self) -> bool;

    fn name(&self) -> &'static str;
}

// =============================================================================
// HammingLoss
// =============================================================================

/// Lower is better. Zero for an empty matrix.
#[derive(Debug, Clone, Copy, Default)]
pub struct HammingLoss;

impl MultiLabelMetric for HammingLoss {
    fn compute(&self, predicted: ArrayView2<'_, bool>, truth: ArrayView2<'_, bool>) -> f64 {
        debug_assert_eq!(predicted.dim(), truth.dim());
        let n = predicted.len();
        if n == 0 {
            return 0.0;
        }
        let wrong = Zip::from(&predicted)
            .and(&truth)
            .fold(0usize, |acc, &p, &t| acc + usize::from(p != t));
        wrong as f64 / n as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "hamming"
    }
}

// =============================================================================
// SubsetAccuracy
// =============================================================================

/// Exact-match ratio. Higher is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubsetAccuracy;

impl MultiLabelMetric for SubsetAccuracy {
    fn compute(&self, predicted: ArrayView2<'_, bool>, truth: ArrayView2<'_, bool>) -> f64 {
        debug_assert_eq!(predicted.dim(), truth.dim());
        let n_rows = predicted.nrows();
        if n_rows == 0 {
            return 0.0;
        }
        let exact = predicted
            .rows()
            .into_iter()
            .zip(truth.rows())
            .filter(|(p, t)| p == t)
            .count();
        exact as f64 / n_rows as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "subset-accuracy"
    }
}

// =============================================================================
// MicroF1
// =============================================================================

/// `2·TP / (2·TP + FP + FN)` over all cells. Higher is better.
///
/// Defined as 1 when there are no positives at all, predicted or true.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicroF1;

impl MultiLabelMetric for MicroF1 {
    fn compute(&self, predicted: ArrayView2<'_, bool>, truth: ArrayView2<'_, bool>) -> f64 {
        debug_assert_eq!(predicted.dim(), truth.dim());
        let (tp, fp, fn_) = Zip::from(&predicted).and(&truth).fold(
            (0usize, 0usize, 0usize),
            |(tp, fp, fn_), &p, &t| match (p, t) {
                (true, true) => (tp + 1, fp, fn_),
                (true, false) => (tp, fp + 1, fn_),
                (false, true) => (tp, fp, fn_ + 1),
                (false, false) => (tp, fp, fn_),
            },
        );
        let denom = 2 * tp + fp + fn_;
        if denom == 0 {
            return 1.0;
        }
        (2 * tp) as f64 / denom as f64
    }

    fn higher_is_better(&self) -> bool {
        true
    }

    fn name(&self) -> &'static str {
        "micro-f1"
    }
}

// =============================================================================
// Metric
// =============================================================================

/// Runtime-selectable metric.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Metric {
    #[default]
    HammingLoss,
    SubsetAccuracy,
    MicroF1,
}

impl MultiLabelMetric for Metric {
    fn compute(&self, predicted: ArrayView2<'_, bool>, truth: ArrayView2<'_, bool>) -> f64 {
        match self {
            Self::HammingLoss => HammingLoss.compute(predicted, truth),
            Self::SubsetAccuracy => SubsetAccuracy.compute(predicted, truth),
            Self::MicroF1 => MicroF1.compute(predicted, truth),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Self::HammingLoss => HammingLoss.higher_is_better(),
            Self::SubsetAccuracy => SubsetAccuracy.higher_is_better(),
            Self::MicroF1 => MicroF1.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::HammingLoss => HammingLoss.name(),
            Self::SubsetAccuracy => SubsetAccuracy.name(),
            Self::MicroF1 => MicroF1.name(),
        }
    }
}
