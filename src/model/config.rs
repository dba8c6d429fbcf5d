//! High-level RFBoost configuration with builder pattern.
//!
//! [`RfBoostConfig`] covers both stages: the Labeled-LDA sampler that
//! produces θ/φ and the boosting loop that consumes them. It uses the `bon`
//! crate for builder generation with validation at build time.
//!
//! # Example
//!
//! ```
//! use rfboost::model::RfBoostConfig;
//!
//! // All defaults
//! let config = RfBoostConfig::builder().build().unwrap();
//!
//! // Symmetric small priors, more rounds
//! let config = RfBoostConfig::builder()
//!     .alpha(0.01)
//!     .beta(0.01)
//!     .n_rounds(300)
//!     .pool_size(50)
//!     .build()
//!     .unwrap();
//! ```

use std::num::NonZeroUsize;

use bon::Builder;

use crate::topic::{LdaParams, SampleAveraging};
use crate::training::{RfBoostParams, Verbosity};
use crate::utils::Parallelism;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Dirichlet priors must be positive and finite.
    InvalidPrior { field: &'static str, value: f64 },
    /// Number of Gibbs sweeps must be at least 1.
    InvalidNSweeps,
    /// Number of boosting rounds must be at least 1.
    InvalidNRounds,
    /// Candidate pool must hold at least one feature.
    InvalidPoolSize,
    /// Candidate pool larger than the feature space of the training data.
    PoolSizeExceedsFeatures { pool_size: usize, n_features: usize },
    /// Sample averaging lag must be at least 1.
    InvalidSampleLag,
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPrior { field, value } => {
                write!(f, "{} must be positive and finite, got {}", field, value)
            }
            Self::InvalidNSweeps => write!(f, "n_sweeps must be at least 1"),
            Self::InvalidNRounds => write!(f, "n_rounds must be at least 1"),
            Self::InvalidPoolSize => write!(f, "pool_size must be at least 1"),
            Self::PoolSizeExceedsFeatures { pool_size, n_features } => write!(
                f,
                "pool_size {} exceeds the number of features ({})",
                pool_size, n_features
            ),
            Self::InvalidSampleLag => write!(f, "sample averaging lag must be at least 1"),
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// PredictionRule
// =============================================================================

/// How accumulated per-label scores become a label vector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PredictionRule {
    /// Each label is positive iff its score is `>= 0`.
    #[default]
    Threshold,
    /// As `Threshold`, but if no label is positive the highest-scoring label
    /// is switched on.
    AtLeastOne,
}

// =============================================================================
// RfBoostConfig
// =============================================================================

/// High-level configuration for RFBoost training.
///
/// # Structure
///
/// - **Topic model**: `alpha`, `beta`, `n_sweeps`, `sample_averaging`
/// - **Boosting**: `n_rounds`, `pool_size`
/// - **Prediction**: `prediction_rule`
/// - **Resources / reproducibility / logging**: `n_threads`, `seed`, `verbosity`
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct RfBoostConfig {
    // === Topic model ===
    /// Document-topic Dirichlet prior. Default: 0.5.
    #[builder(default = 0.5)]
    pub alpha: f64,

    /// Topic-word Dirichlet prior. Default: 0.1.
    #[builder(default = 0.1)]
    pub beta: f64,

    /// Number of Gibbs sweeps. Default: 50.
    #[builder(default = 50)]
    pub n_sweeps: u32,

    /// Average θ/φ over several Gibbs states. `None` uses the final state.
    pub sample_averaging: Option<SampleAveraging>,

    // === Boosting ===
    /// Number of boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub n_rounds: u32,

    /// Candidate features scanned per round. Default: 10.
    ///
    /// Must not exceed the number of features of the training data; that
    /// check happens in [`RfBoostModel::train`](super::RfBoostModel::train).
    #[builder(default = 10)]
    pub pool_size: usize,

    // === Prediction ===
    #[builder(default)]
    pub prediction_rule: PredictionRule,

    // === Resource control ===
    /// Number of threads for the candidate scan. `None` uses all available cores.
    pub n_threads: Option<NonZeroUsize>,

    // === Reproducibility ===
    /// Random seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    // === Logging ===
    /// Verbosity level. Default: `Silent`.
    #[builder(default)]
    pub verbosity: Verbosity,
}

/// Custom finishing function that validates the config.
impl<S: rf_boost_config_builder::IsComplete> RfBoostConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if any parameter is invalid:
    /// - `alpha` or `beta` not positive and finite
    /// - `n_sweeps == 0`, `n_rounds == 0` or `pool_size == 0`
    /// - sample averaging with `lag == 0`
    pub fn build(self) -> Result<RfBoostConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl RfBoostConfig {
    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (field, value) in [("alpha", self.alpha), ("beta", self.beta)] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(ConfigError::InvalidPrior { field, value });
            }
        }
        if self.n_sweeps == 0 {
            return Err(ConfigError::InvalidNSweeps);
        }
        if self.n_rounds == 0 {
            return Err(ConfigError::InvalidNRounds);
        }
        if self.pool_size == 0 {
            return Err(ConfigError::InvalidPoolSize);
        }
        if matches!(self.sample_averaging, Some(SampleAveraging { lag: 0, .. })) {
            return Err(ConfigError::InvalidSampleLag);
        }
        Ok(())
    }

    /// Check the pool size against the training data's feature count.
    pub fn validate_for(&self, n_features: usize) -> Result<(), ConfigError> {
        self.validate()?;
        if self.pool_size > n_features {
            return Err(ConfigError::PoolSizeExceedsFeatures {
                pool_size: self.pool_size,
                n_features,
            });
        }
        Ok(())
    }

    /// Thread count in `run_with_threads` semantics (0 = auto).
    pub fn thread_count(&self) -> usize {
        self.n_threads.map_or(0, NonZeroUsize::get)
    }

    pub fn to_lda_params(&self) -> LdaParams {
        LdaParams {
            alpha: self.alpha,
            beta: self.beta,
            n_sweeps: self.n_sweeps,
            sample_averaging: self.sample_averaging,
            verbosity: self.verbosity,
        }
    }

    pub fn to_boost_params(&self, parallelism: Parallelism) -> RfBoostParams {
        RfBoostParams {
            n_rounds: self.n_rounds,
            pool_size: self.pool_size,
            parallelism,
            verbosity: self.verbosity,
        }
    }
}

impl Default for RfBoostConfig {
    fn default() -> Self {
        Self::builder().__build_internal()
    }
}

// =============================================================================
// Tests
// =============================================================================
