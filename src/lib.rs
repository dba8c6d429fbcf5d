//! rfboost: multi-label boosting over Labeled-LDA feature rankings.
//!
//! Training runs in two stages:
//!
//! 1. A Labeled-LDA Gibbs sampler turns the labeled corpus into θ
//!    (document×label weights) and φ (label×feature relevance).
//! 2. RFBoost ranks features by φ and boosts over a rotating pool of the top
//!    candidates, starting from θ as example weights. Each round keeps one
//!    pivot feature and a per-label log-odds pair.
//!
//! # Key Types
//!
//! - [`RfBoostModel`] - High-level model with train/predict/persist
//! - [`RfBoostConfig`] - Configuration builder
//! - [`MultiLabelDataset`] - Binary labels followed by binary features
//! - [`LabeledLda`] / [`RfBoostTrainer`] - The two stages on their own
//!
//! # Training
//!
//! Use `RfBoostConfig::builder()` to configure, then `RfBoostModel::train()`.
//! See the [`model`] module for details.

// Re-export approx traits for users who want to compare predictions
pub use approx;

pub mod data;
pub mod model;
pub mod persist;
pub mod ranking;
pub mod testing;
pub mod topic;
pub mod training;
pub mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

// High-level model types
pub use model::{BoostRound, ModelMeta, PredictError, PredictionRule, RfBoostModel};

// Configuration types
pub use model::{ConfigError, RfBoostConfig};

// Data types
pub use data::{Corpus, DatasetError, MultiLabelDataset};

// Stages
pub use ranking::FeatureRanking;
pub use topic::{LabeledLda, LdaParams, SampleAveraging, TopicDistributions};
pub use training::{
    BoostSession, HammingLoss, Metric, MicroF1, MultiLabelMetric, RfBoostParams, RfBoostTrainer,
    SubsetAccuracy, TrainError, Verbosity,
};

// Persistence errors
pub use persist::{ReadError, WriteError};

// Shared utilities
pub use utils::{run_with_threads, Parallelism};
