//! RFBoost model implementation.
//!
//! Ordered list of boosting rounds with training and prediction. Access
//! components via [`rounds()`](RfBoostModel::rounds),
//! [`meta()`](RfBoostModel::meta) and [`config()`](RfBoostModel::config).

use ndarray::{Array2, ArrayView2};
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::{ModelMeta, PredictionRule, RfBoostConfig};
use crate::data::{Corpus, MultiLabelDataset};
use crate::ranking::FeatureRanking;
use crate::topic::LabeledLda;
use crate::training::{MultiLabelMetric, RfBoostTrainer, TrainError, ABSENT, PRESENT};
use crate::utils::{run_with_threads, Parallelism};

/// One boosting round: the pivot feature and its weak hypothesis.
#[derive(Debug, Clone, PartialEq)]
pub struct BoostRound {
    /// Pivot feature index (0-based within the feature columns).
    pub feature: u32,
    /// Normalisation score `z` that selected the pivot.
    pub score: f64,
    /// `[2, n_labels]`: row 0 when the feature is absent, row 1 when present.
    pub hypothesis: Array2<f64>,
}

impl BoostRound {
    /// Per-label contribution for an example with/without the pivot feature.
    #[inline]
    pub fn contribution(&self, present: bool) -> ndarray::ArrayView1<'_, f64> {
        self.hypothesis.row(if present { PRESENT } else { ABSENT })
    }
}

/// Errors at prediction time.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PredictError {
    #[error("row has {got} columns, model expects {expected} (labels then features)")]
    RowWidth { expected: usize, got: usize },

    #[error("dataset has {got_labels} labels and {got_features} features, model expects {expected_labels} and {expected_features}")]
    ShapeMismatch {
        expected_labels: usize,
        expected_features: usize,
        got_labels: usize,
        got_features: usize,
    },
}

/// Trained RFBoost model.
#[derive(Debug, Clone)]
pub struct RfBoostModel {
    rounds: Vec<BoostRound>,
    meta: ModelMeta,
    config: RfBoostConfig,
}

impl RfBoostModel {
    /// Create a model from rounds and metadata, with a default config.
    pub fn from_rounds(rounds: Vec<BoostRound>, meta: ModelMeta) -> Self {
        Self {
            rounds,
            meta,
            config: RfBoostConfig::default(),
        }
    }

    /// Create a model from all its parts.
    pub fn from_parts(rounds: Vec<BoostRound>, meta: ModelMeta, config: RfBoostConfig) -> Self {
        Self {
            rounds,
            meta,
            config,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn rounds(&self) -> &[BoostRound] {
        &self.rounds
    }

    pub fn meta(&self) -> &ModelMeta {
        &self.meta
    }

    pub fn config(&self) -> &RfBoostConfig {
        &self.config
    }

    #[inline]
    pub fn n_rounds(&self) -> usize {
        self.rounds.len()
    }

    #[inline]
    pub fn n_labels(&self) -> usize {
        self.meta.n_labels
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.meta.n_features
    }

    pub fn prediction_rule(&self) -> PredictionRule {
        self.config.prediction_rule
    }

    /// Switch the rule used by the `predict*` methods.
    pub fn with_prediction_rule(mut self, rule: PredictionRule) -> Self {
        self.config.prediction_rule = rule;
        self
    }

    // =========================================================================
    // Training
    // =========================================================================

    /// Train a model: Labeled-LDA on the dataset, rank features by φ, then
    /// boost over θ.
    ///
    /// All configuration and data checks run before the first Gibbs sweep.
    pub fn train(dataset: &MultiLabelDataset, config: RfBoostConfig) -> Result<Self, TrainError> {
        run_with_threads(config.thread_count(), |parallelism| {
            Self::train_inner(dataset, config, parallelism)
        })
    }

    /// Internal training implementation (no thread pool management).
    fn train_inner(
        dataset: &MultiLabelDataset,
        config: RfBoostConfig,
        parallelism: Parallelism,
    ) -> Result<Self, TrainError> {
        config.validate_for(dataset.n_features())?;
        if dataset.n_samples() == 0 {
            return Err(TrainError::EmptyDataset);
        }
        let corpus = Corpus::from_dataset(dataset)?;

        let mut rng = Xoshiro256PlusPlus::seed_from_u64(config.seed);
        let topics = LabeledLda::new(config.to_lda_params()).fit(&corpus, &mut rng);
        let ranking = FeatureRanking::from_phi(topics.phi());

        let trainer = RfBoostTrainer::new(config.to_boost_params(parallelism));
        let rounds = trainer.train(dataset, topics.theta(), &ranking)?;

        let meta = ModelMeta {
            n_labels: dataset.n_labels(),
            n_features: dataset.n_features(),
        };
        Ok(Self {
            rounds,
            meta,
            config,
        })
    }

    // =========================================================================
    // Prediction
    // =========================================================================

    /// Summed hypothesis per label for an example described by `has_feature`.
    fn accumulate<F: Fn(usize) -> bool>(&self, has_feature: F, out: &mut [f64]) {
        out.iter_mut().for_each(|s| *s = 0.0);
        for round in &self.rounds {
            let contribution = round.contribution(has_feature(round.feature as usize));
            for (s, &h) in out.iter_mut().zip(contribution.iter()) {
                *s += h;
            }
        }
    }

    fn check_row(&self, row: &[f32]) -> Result<(), PredictError> {
        if row.len() != self.meta.n_columns() {
            return Err(PredictError::RowWidth {
                expected: self.meta.n_columns(),
                got: row.len(),
            });
        }
        Ok(())
    }

    fn check_dataset(&self, dataset: &MultiLabelDataset) -> Result<(), PredictError> {
        if dataset.n_labels() != self.meta.n_labels || dataset.n_features() != self.meta.n_features {
            return Err(PredictError::ShapeMismatch {
                expected_labels: self.meta.n_labels,
                expected_features: self.meta.n_features,
                got_labels: dataset.n_labels(),
                got_features: dataset.n_features(),
            });
        }
        Ok(())
    }

    /// Raw per-label scores for one dense row.
    ///
    /// The row holds the label columns followed by the feature columns; the
    /// label prefix is ignored and a nonzero feature value counts as present.
    pub fn predict_scores_row(&self, row: &[f32]) -> Result<Vec<f64>, PredictError> {
        self.check_row(row)?;
        let features = &row[self.meta.n_labels..];
        let mut scores = vec![0.0; self.meta.n_labels];
        self.accumulate(|f| features[f] != 0.0, &mut scores);
        Ok(scores)
    }

    /// Label vector for one dense row. See [`predict_scores_row`](Self::predict_scores_row).
    pub fn predict_row(&self, row: &[f32]) -> Result<Vec<bool>, PredictError> {
        let scores = self.predict_scores_row(row)?;
        let mut labels = vec![false; scores.len()];
        apply_rule(self.config.prediction_rule, &scores, &mut labels);
        Ok(labels)
    }

    /// Raw scores for every row of `dataset`, `[n_samples, n_labels]`.
    pub fn predict_raw(&self, dataset: &MultiLabelDataset) -> Result<Array2<f64>, PredictError> {
        self.check_dataset(dataset)?;
        let mut output = Array2::zeros((dataset.n_samples(), self.meta.n_labels));
        for (i, mut row) in output.rows_mut().into_iter().enumerate() {
            if let Some(out) = row.as_slice_mut() {
                self.accumulate(|f| dataset.has_feature(i, f), out);
            }
        }
        Ok(output)
    }

    /// Label matrix for every row of `dataset`, `[n_samples, n_labels]`.
    pub fn predict(&self, dataset: &MultiLabelDataset) -> Result<Array2<bool>, PredictError> {
        let scores = self.predict_raw(dataset)?;
        Ok(self.labels_from_scores(scores.view()))
    }

    /// Apply the prediction rule to a score matrix.
    pub fn labels_from_scores(&self, scores: ArrayView2<'_, f64>) -> Array2<bool> {
        let mut labels = Array2::from_elem(scores.raw_dim(), false);
        for (s_row, mut l_row) in scores.rows().into_iter().zip(labels.rows_mut()) {
            let s: Vec<f64> = s_row.to_vec();
            if let Some(out) = l_row.as_slice_mut() {
                apply_rule(self.config.prediction_rule, &s, out);
            }
        }
        labels
    }

    /// Evaluate predictions on `dataset` against its own labels.
    pub fn evaluate<M: MultiLabelMetric>(
        &self,
        dataset: &MultiLabelDataset,
        metric: &M,
    ) -> Result<f64, PredictError> {
        let predicted = self.predict(dataset)?;
        Ok(metric.compute(predicted.view(), dataset.labels()))
    }
}

/// Write labels for `scores` under `rule` into `out`.
fn apply_rule(rule: PredictionRule, scores: &[f64], out: &mut [bool]) {
    for (o, &s) in out.iter_mut().zip(scores) {
        *o = s >= 0.0;
    }
    if rule == PredictionRule::AtLeastOne && !out.iter().any(|&o| o) {
        let best = scores
            .iter()
            .enumerate()
            .fold(None, |best: Option<(usize, f64)>, (l, &s)| match best {
                Some((_, b)) if b >= s => best,
                _ => Some((l, s)),
            });
        if let Some((l, _)) = best {
            out[l] = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn model() -> RfBoostModel {
        // label 0 follows feature 1, label 1 is always negative-leaning
        let rounds = vec![
            BoostRound {
                feature: 1,
                score: 0.3,
                hypothesis: array![[-0.8, -0.2], [0.9, -0.1]],
            },
            BoostRound {
                feature: 0,
                score: 0.4,
                hypothesis: array![[0.0, -0.1], [0.1, 0.05]],
            },
        ];
        RfBoostModel::from_rounds(rounds, ModelMeta { n_labels: 2, n_features: 2 })
    }

    #[test]
    fn scores_sum_selected_branches() {
        let m = model();
        // labels (ignored), f0 = 1, f1 = 0
        let scores = m.predict_scores_row(&[1.0, 1.0, 1.0, 0.0]).unwrap();
        assert!((scores[0] - (-0.8 + 0.1)).abs() < 1e-12);
        assert!((scores[1] - (-0.2 + 0.05)).abs() < 1e-12);
    }

    #[test]
    fn threshold_rule() {
        let m = model();
        assert_eq!(m.predict_row(&[0.0, 0.0, 0.0, 1.0]).unwrap(), vec![true, false]);
        assert_eq!(m.predict_row(&[0.0, 0.0, 0.0, 0.0]).unwrap(), vec![false, false]);
    }

    #[test]
    fn zero_score_is_positive() {
        let rounds = vec![BoostRound {
            feature: 0,
            score: 1.0,
            hypothesis: array![[0.0], [0.0]],
        }];
        let m = RfBoostModel::from_rounds(rounds, ModelMeta { n_labels: 1, n_features: 1 });
        assert_eq!(m.predict_row(&[0.0, 0.0]).unwrap(), vec![true]);
    }

    #[test]
    fn at_least_one_switches_on_best_label() {
        let m = model().with_prediction_rule(PredictionRule::AtLeastOne);
        // scores: label 0 = -0.8, label 1 = -0.3
        assert_eq!(m.predict_row(&[0.0, 0.0, 0.0, 0.0]).unwrap(), vec![false, true]);
        // untouched when something is already positive
        assert_eq!(m.predict_row(&[0.0, 0.0, 0.0, 1.0]).unwrap(), vec![true, false]);
    }

    #[test]
    fn at_least_one_tie_takes_first_label() {
        let mut out = [false; 3];
        apply_rule(PredictionRule::AtLeastOne, &[-1.0, -0.5, -0.5], &mut out);
        assert_eq!(out, [false, true, false]);
    }

    #[test]
    fn wrong_row_width_is_rejected() {
        let m = model();
        assert_eq!(
            m.predict_row(&[0.0, 1.0]),
            Err(PredictError::RowWidth { expected: 4, got: 2 })
        );
    }

    #[test]
    fn prediction_is_idempotent() {
        let m = model();
        let row = [0.0, 1.0, 1.0, 1.0];
        assert_eq!(m.predict_scores_row(&row).unwrap(), m.predict_scores_row(&row).unwrap());
    }

    #[test]
    fn batch_matches_rows() {
        let m = model();
        let data = MultiLabelDataset::from_sparse(2, 2, [vec![0, 3], vec![1, 2], vec![0, 2, 3]]).unwrap();
        let raw = m.predict_raw(&data).unwrap();
        let rows = [[1.0, 0.0, 0.0, 1.0], [0.0, 1.0, 1.0, 0.0], [1.0, 0.0, 1.0, 1.0]];
        for (i, row) in rows.iter().enumerate() {
            let s = m.predict_scores_row(row).unwrap();
            assert_eq!(raw.row(i).to_vec(), s);
        }
        let labels = m.predict(&data).unwrap();
        assert_eq!(labels.row(0).to_vec(), vec![true, false]);
    }

    #[test]
    fn dataset_shape_mismatch_is_rejected() {
        let m = model();
        let data = MultiLabelDataset::from_sparse(1, 3, [vec![0, 1]]).unwrap();
        assert!(matches!(m.predict(&data), Err(PredictError::ShapeMismatch { .. })));
    }
}
