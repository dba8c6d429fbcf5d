//! Schema types for model serialization.
//!
//! These types are the stable on-disk format, kept separate from the runtime
//! types so the format can evolve and be validated independently.

use serde::{Deserialize, Serialize};

/// Current schema version written by this crate.
pub const SCHEMA_VERSION: u32 = 1;

/// Model metadata schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetaSchema {
    pub n_labels: usize,
    pub n_features: usize,
}

/// One boosting round.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoostRoundSchema {
    /// Pivot feature index.
    pub feature: u32,
    /// Normalisation score that selected the pivot.
    pub score: f64,
    /// Per-label contribution when the feature is absent.
    pub absent: Vec<f64>,
    /// Per-label contribution when the feature is present.
    pub present: Vec<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PredictionRuleSchema {
    Threshold,
    AtLeastOne,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerbositySchema {
    Silent,
    Warning,
    Info,
    Debug,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleAveragingSchema {
    pub burn_in: u32,
    pub lag: u32,
}

/// Training configuration, kept for reproducibility.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfBoostConfigSchema {
    pub alpha: f64,
    pub beta: f64,
    pub n_sweeps: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_averaging: Option<SampleAveragingSchema>,
    pub n_rounds: u32,
    pub pool_size: usize,
    pub prediction_rule: PredictionRuleSchema,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub n_threads: Option<usize>,
    pub seed: u64,
    pub verbosity: VerbositySchema,
}

/// Top-level document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RfBoostModelSchema {
    pub version: u32,
    pub meta: ModelMetaSchema,
    pub config: RfBoostConfigSchema,
    pub rounds: Vec<BoostRoundSchema>,
}
