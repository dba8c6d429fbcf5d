//! Training infrastructure for RFBoost.
//!
//! - [`RfBoostTrainer`], [`BoostSession`]: the boosting loop
//! - [`CandidatePool`]: rotating window over the feature ranking
//! - [`BucketMasses`], [`evaluate_candidate`]: per-candidate scoring
//! - [`MultiLabelMetric`]: evaluation metrics
//! - [`TrainingLogger`], [`Verbosity`]: structured logging
//!
//! The topic-model stage lives in [`crate::topic`]; this module consumes its θ
//! and the [`FeatureRanking`](crate::ranking::FeatureRanking) built from φ.

mod logger;
mod metrics;
mod pool;
mod scan;
mod trainer;

pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{HammingLoss, Metric, MicroF1, MultiLabelMetric, SubsetAccuracy};
pub use pool::CandidatePool;
pub use scan::{
    evaluate_candidate, select_pivot, smoothing_epsilon, BucketMasses, CandidateScore, ABSENT,
    PRESENT,
};
pub use trainer::{BoostSession, RfBoostParams, RfBoostTrainer};

use crate::data::DatasetError;
use crate::model::ConfigError;

/// Errors that stop training before any round is produced.
#[derive(Debug, thiserror::Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("training dataset has no samples")]
    EmptyDataset,

    #[error("feature ranking covers {got} features, dataset has {expected}")]
    RankingMismatch { expected: usize, got: usize },
}
