//! RFBoost trainer.
//!
//! Boosting over a rotating pool of ranked candidate features. Each round
//! scores every candidate, keeps the one with the smallest normalisation
//! score as the pivot together with its hypothesis table, reweights every
//! (example, label) pair, drops the pivot from the pool and appends the next
//! ranked feature.
//!
//! # Weight update
//!
//! ```text
//! W[i][l] ← W[i][l] · exp(−sign(y[i][l]) · sign(h[b(i)][l])) / Z
//! ```
//!
//! where `b(i)` is whether example `i` has the pivot feature and `Z` is the
//! total mass after reweighting. `W` starts as `θ / n_samples`, which sums to
//! 1, and stays a distribution, so bucket masses never exceed 1 and every
//! hypothesis is bounded by `½·ln((1 + ε) / ε)`. Weights are floored at the
//! smallest positive normal `f64`.

use ndarray::{Array2, ArrayView2};

use super::logger::{TrainingLogger, Verbosity};
use super::metrics::{HammingLoss, MultiLabelMetric};
use super::pool::CandidatePool;
use super::scan::{evaluate_candidate, select_pivot, sign, smoothing_epsilon, ABSENT, PRESENT};
use super::TrainError;
use crate::data::{DatasetError, MultiLabelDataset};
use crate::model::{BoostRound, ConfigError};
use crate::ranking::FeatureRanking;
use crate::utils::Parallelism;

// =============================================================================
// RfBoostParams
// =============================================================================

/// Parameters for the boosting stage.
#[derive(Debug, Clone)]
pub struct RfBoostParams {
    /// Number of boosting rounds.
    pub n_rounds: u32,
    /// Number of candidate features scanned per round.
    pub pool_size: usize,
    /// Whether the candidate scan may run in parallel.
    pub parallelism: Parallelism,
    pub verbosity: Verbosity,
}

impl Default for RfBoostParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            pool_size: 10,
            parallelism: Parallelism::Sequential,
            verbosity: Verbosity::default(),
        }
    }
}

// =============================================================================
// BoostSession
// =============================================================================

/// Round-by-round boosting state.
///
/// Owns the live weight matrix and candidate pool. [`step`](Self::step) runs
/// exactly one round, so a caller can stop between any two rounds.
pub struct BoostSession<'a> {
    dataset: &'a MultiLabelDataset,
    ranking: &'a FeatureRanking,
    params: RfBoostParams,
    /// `[n_samples, n_labels]`
    weights: Array2<f64>,
    /// Accumulated training scores, `[n_samples, n_labels]`.
    scores: Array2<f64>,
    pool: CandidatePool,
    epsilon: f64,
    rounds: Vec<BoostRound>,
    logger: TrainingLogger,
}

impl<'a> BoostSession<'a> {
    /// Set up the initial weights `θ / n_samples` and the candidate pool.
    ///
    /// # Errors
    ///
    /// - [`TrainError::EmptyDataset`] if the dataset has no examples
    /// - [`DatasetError::ShapeMismatch`] if `theta` is not `[n_samples, n_labels]`
    /// - [`TrainError::RankingMismatch`] if the ranking does not cover every feature
    /// - [`ConfigError`] for a zero round count or an invalid pool size
    pub fn new(
        dataset: &'a MultiLabelDataset,
        theta: ArrayView2<'_, f64>,
        ranking: &'a FeatureRanking,
        params: RfBoostParams,
    ) -> Result<Self, TrainError> {
        let n_samples = dataset.n_samples();
        let n_labels = dataset.n_labels();
        let n_features = dataset.n_features();

        if n_samples == 0 {
            return Err(TrainError::EmptyDataset);
        }
        if theta.dim() != (n_samples, n_labels) {
            return Err(DatasetError::ShapeMismatch {
                expected: (n_samples, n_labels),
                got: theta.dim(),
            }
            .into());
        }
        if ranking.len() != n_features {
            return Err(TrainError::RankingMismatch {
                expected: n_features,
                got: ranking.len(),
            });
        }
        if params.n_rounds == 0 {
            return Err(ConfigError::InvalidNRounds.into());
        }
        if params.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize.into());
        }
        if params.pool_size > n_features {
            return Err(ConfigError::PoolSizeExceedsFeatures {
                pool_size: params.pool_size,
                n_features,
            }
            .into());
        }

        let weights = theta.mapv(|t| t / n_samples as f64);
        let pool = CandidatePool::new(ranking, params.pool_size);
        let mut logger = TrainingLogger::new(params.verbosity);
        logger.start_training("rfboost", params.n_rounds as usize);

        Ok(Self {
            dataset,
            ranking,
            weights,
            scores: Array2::zeros((n_samples, n_labels)),
            pool,
            epsilon: smoothing_epsilon(n_labels, n_samples),
            rounds: Vec::with_capacity(params.n_rounds as usize),
            params,
            logger,
        })
    }

    /// Run one boosting round. Returns `None` once all rounds are done.
    pub fn step(&mut self) -> Option<&BoostRound> {
        if self.is_finished() {
            return None;
        }

        let dataset = self.dataset;
        let weights = self.weights.view();
        let labels = dataset.labels();
        let epsilon = self.epsilon;
        let slots: Vec<(usize, u32)> = self.pool.slots().iter().copied().enumerate().collect();

        let candidates = self.params.parallelism.maybe_par_map(slots, |(slot, feature)| {
            evaluate_candidate(
                weights,
                labels,
                dataset.feature_rows(feature as usize),
                slot,
                feature,
                epsilon,
            )
        });
        let pivot = select_pivot(candidates)?;

        self.update_weights(pivot.feature, pivot.hypothesis.view());
        self.pool.replace(pivot.slot, self.ranking);

        let round = self.rounds.len();
        let train_hamming = self
            .logger
            .enabled(Verbosity::Info)
            .then(|| self.training_hamming_loss());
        self.logger
            .log_round(round, pivot.feature, pivot.score, train_hamming);

        self.rounds.push(BoostRound {
            feature: pivot.feature,
            score: pivot.score,
            hypothesis: pivot.hypothesis,
        });
        if self.is_finished() {
            self.logger.finish_training("rfboost");
        }
        self.rounds.last()
    }

    /// Reweight every (example, label) pair after choosing `feature`.
    fn update_weights(&mut self, feature: u32, hypothesis: ArrayView2<'_, f64>) {
        let present = self.dataset.feature_rows(feature as usize);
        let labels = self.dataset.labels();
        let mut mass = 0.0;

        for (i, (mut w_row, mut s_row)) in self
            .weights
            .rows_mut()
            .into_iter()
            .zip(self.scores.rows_mut())
            .enumerate()
        {
            let branch = if present.contains(i) { PRESENT } else { ABSENT };
            let h_row = hypothesis.row(branch);
            for l in 0..w_row.len() {
                let h = h_row[l];
                let agreement = sign(labels[[i, l]]) * sign(h > 0.0);
                w_row[l] *= (-agreement).exp();
                mass += w_row[l];
                s_row[l] += h;
            }
        }

        // mass > 0: every weight was positive before the update
        self.weights.mapv_inplace(|w| (w / mass).max(f64::MIN_POSITIVE));
    }

    fn training_hamming_loss(&self) -> f64 {
        let predicted = self.scores.mapv(|s| s >= 0.0);
        HammingLoss.compute(predicted.view(), self.dataset.labels())
    }

    /// Current weight matrix, `[n_samples, n_labels]`.
    #[inline]
    pub fn weights(&self) -> ArrayView2<'_, f64> {
        self.weights.view()
    }

    #[inline]
    pub fn pool(&self) -> &CandidatePool {
        &self.pool
    }

    #[inline]
    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    #[inline]
    pub fn rounds(&self) -> &[BoostRound] {
        &self.rounds
    }

    #[inline]
    pub fn is_finished(&self) -> bool {
        self.rounds.len() >= self.params.n_rounds as usize
    }

    pub fn into_rounds(self) -> Vec<BoostRound> {
        self.rounds
    }
}

// =============================================================================
// RfBoostTrainer
// =============================================================================

/// Runs a [`BoostSession`] to completion.
#[derive(Debug, Clone, Default)]
pub struct RfBoostTrainer {
    params: RfBoostParams,
}

impl RfBoostTrainer {
    pub fn new(params: RfBoostParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &RfBoostParams {
        &self.params
    }

    /// Train all rounds.
    ///
    /// `theta` is the document×label matrix from the topic model, aligned
    /// with the dataset's rows.
    pub fn train(
        &self,
        dataset: &MultiLabelDataset,
        theta: ArrayView2<'_, f64>,
        ranking: &FeatureRanking,
    ) -> Result<Vec<BoostRound>, TrainError> {
        let mut session = BoostSession::new(dataset, theta, ranking, self.params.clone())?;
        while session.step().is_some() {}
        Ok(session.into_rounds())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    /// Label 0 follows feature 0; label 1 follows feature 2.
    fn dataset() -> MultiLabelDataset {
        MultiLabelDataset::from_sparse(
            2,
            4,
            [
                vec![0, 2, 5],
                vec![0, 2, 3],
                vec![1, 4, 5],
                vec![1, 3, 4],
            ],
        )
        .unwrap()
    }

    fn uniform_theta(n_samples: usize, n_labels: usize) -> Array2<f64> {
        Array2::from_elem((n_samples, n_labels), 1.0 / n_labels as f64)
    }

    fn ranking(n_features: usize) -> FeatureRanking {
        FeatureRanking::from_phi(Array2::from_elem((1, n_features), 1.0).view())
    }

    fn params(n_rounds: u32, pool_size: usize) -> RfBoostParams {
        RfBoostParams {
            n_rounds,
            pool_size,
            ..Default::default()
        }
    }

    #[test]
    fn initial_weights_are_theta_over_n() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let session = BoostSession::new(&data, theta.view(), &ranking, params(1, 2)).unwrap();

        assert!(session.weights().iter().all(|&w| (w - 0.125).abs() < 1e-12));
        assert_eq!(session.epsilon(), 1.0 / 8.0);
    }

    #[test]
    fn separating_feature_is_chosen() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let rounds = RfBoostTrainer::new(params(1, 4))
            .train(&data, theta.view(), &ranking)
            .unwrap();

        assert_eq!(rounds.len(), 1);
        // features 0 and 2 each separate one label; 0 is first in pool order
        assert_eq!(rounds[0].feature, 0);
        assert!(rounds[0].hypothesis[[PRESENT, 0]] > 0.0);
        assert!(rounds[0].hypothesis[[ABSENT, 0]] < 0.0);
    }

    #[test]
    fn weights_stay_positive_and_finite() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(12, 2)).unwrap();

        while session.step().is_some() {
            assert!(session.weights().iter().all(|&w| w > 0.0 && w.is_finite()));
        }
        assert_eq!(session.rounds().len(), 12);
        for round in session.rounds() {
            assert!(round.hypothesis.iter().all(|h| h.is_finite()));
        }
    }

    #[test]
    fn step_after_finish_returns_none() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(1, 1)).unwrap();

        assert!(session.step().is_some());
        assert!(session.is_finished());
        assert!(session.step().is_none());
    }

    #[test]
    fn pivot_leaves_pool_and_next_feature_is_appended() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(1, 2)).unwrap();

        let feature = session.step().map(|r| r.feature).unwrap();
        assert_eq!(feature, 0);
        assert_eq!(session.pool().slots(), &[1, 2]);
    }

    #[test]
    fn tied_scores_follow_pool_order() {
        // one label on every row: each candidate separates it (z = 0)
        let data = MultiLabelDataset::from_sparse(
            1,
            4,
            [vec![0, 1], vec![0, 2], vec![0, 3], vec![0, 4]],
        )
        .unwrap();
        let theta = Array2::from_elem((4, 1), 1.0);
        let ranking = ranking(4);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(2, 3)).unwrap();

        assert_eq!(session.step().map(|r| r.feature), Some(0));
        assert_eq!(session.pool().slots(), &[1, 2, 3]);
        assert_eq!(session.step().map(|r| r.feature), Some(1));
        assert_eq!(session.pool().slots(), &[2, 3, 0]);
    }

    #[test]
    fn weights_remain_a_distribution() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(20, 2)).unwrap();

        while session.step().is_some() {
            assert!((session.weights().sum() - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn separated_single_label_stays_bounded() {
        let rows: Vec<Vec<usize>> = (0..200).map(|i| vec![0, 1 + i % 2]).collect();
        let data = MultiLabelDataset::from_sparse(1, 2, rows).unwrap();
        let theta = Array2::from_elem((200, 1), 1.0);
        let ranking = ranking(2);
        let mut session = BoostSession::new(&data, theta.view(), &ranking, params(300, 2)).unwrap();

        let eps = session.epsilon();
        let bound = 0.5 * ((1.0 + eps) / eps).ln();
        while let Some(round) = session.step() {
            assert_eq!(round.score, 0.0);
            assert!(round
                .hypothesis
                .iter()
                .all(|h| h.is_finite() && h.abs() <= bound + 1e-12));
        }
        assert!(session.weights().iter().all(|&w| w > 0.0 && w.is_finite()));
    }

    #[test]
    fn parallel_scan_matches_sequential() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let seq = RfBoostTrainer::new(params(6, 3))
            .train(&data, theta.view(), &ranking)
            .unwrap();
        let par = RfBoostTrainer::new(RfBoostParams {
            parallelism: Parallelism::Parallel,
            ..params(6, 3)
        })
        .train(&data, theta.view(), &ranking)
        .unwrap();
        assert_eq!(seq, par);
    }

    #[test]
    fn rejects_oversized_pool() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let err = BoostSession::new(&data, theta.view(), &ranking, params(1, 5)).err();
        assert!(matches!(
            err,
            Some(TrainError::Config(ConfigError::PoolSizeExceedsFeatures {
                pool_size: 5,
                n_features: 4
            }))
        ));
    }

    #[test]
    fn rejects_theta_shape_mismatch() {
        let data = dataset();
        let theta = uniform_theta(3, 2);
        let ranking = ranking(4);
        let err = BoostSession::new(&data, theta.view(), &ranking, params(1, 1)).err();
        assert!(matches!(
            err,
            Some(TrainError::Dataset(DatasetError::ShapeMismatch { .. }))
        ));
    }

    #[test]
    fn rejects_zero_rounds() {
        let data = dataset();
        let theta = uniform_theta(4, 2);
        let ranking = ranking(4);
        let err = BoostSession::new(&data, theta.view(), &ranking, params(0, 1)).err();
        assert!(matches!(err, Some(TrainError::Config(ConfigError::InvalidNRounds))));
    }
}
