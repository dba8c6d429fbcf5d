//! Conversion between runtime types and schema types.
//!
//! Runtime → schema is infallible (`From`). Schema → runtime validates the
//! document (`TryFrom`, error [`ReadError`]): table widths, feature range,
//! finite values and a valid configuration.

use std::num::NonZeroUsize;

use ndarray::Array2;

use super::error::ReadError;
use super::schema::{
    BoostRoundSchema, ModelMetaSchema, PredictionRuleSchema, RfBoostConfigSchema,
    RfBoostModelSchema, SampleAveragingSchema, VerbositySchema, SCHEMA_VERSION,
};
use crate::model::{BoostRound, ModelMeta, PredictionRule, RfBoostConfig, RfBoostModel};
use crate::topic::SampleAveraging;
use crate::training::{Verbosity, ABSENT, PRESENT};

// =============================================================================
// Enums
// =============================================================================

impl From<PredictionRule> for PredictionRuleSchema {
    fn from(rule: PredictionRule) -> Self {
        match rule {
            PredictionRule::Threshold => Self::Threshold,
            PredictionRule::AtLeastOne => Self::AtLeastOne,
        }
    }
}

impl From<PredictionRuleSchema> for PredictionRule {
    fn from(schema: PredictionRuleSchema) -> Self {
        match schema {
            PredictionRuleSchema::Threshold => Self::Threshold,
            PredictionRuleSchema::AtLeastOne => Self::AtLeastOne,
        }
    }
}

impl From<Verbosity> for VerbositySchema {
    fn from(v: Verbosity) -> Self {
        match v {
            Verbosity::Silent => Self::Silent,
            Verbosity::Warning => Self::Warning,
            Verbosity::Info => Self::Info,
            Verbosity::Debug => Self::Debug,
        }
    }
}

impl From<VerbositySchema> for Verbosity {
    fn from(schema: VerbositySchema) -> Self {
        match schema {
            VerbositySchema::Silent => Self::Silent,
            VerbositySchema::Warning => Self::Warning,
            VerbositySchema::Info => Self::Info,
            VerbositySchema::Debug => Self::Debug,
        }
    }
}

// =============================================================================
// Config
// =============================================================================

impl From<&RfBoostConfig> for RfBoostConfigSchema {
    fn from(config: &RfBoostConfig) -> Self {
        Self {
            alpha: config.alpha,
            beta: config.beta,
            n_sweeps: config.n_sweeps,
            sample_averaging: config.sample_averaging.map(|s| SampleAveragingSchema {
                burn_in: s.burn_in,
                lag: s.lag,
            }),
            n_rounds: config.n_rounds,
            pool_size: config.pool_size,
            prediction_rule: config.prediction_rule.into(),
            n_threads: config.n_threads.map(NonZeroUsize::get),
            seed: config.seed,
            verbosity: config.verbosity.into(),
        }
    }
}

impl TryFrom<RfBoostConfigSchema> for RfBoostConfig {
    type Error = ReadError;

    fn try_from(schema: RfBoostConfigSchema) -> Result<Self, Self::Error> {
        let config = RfBoostConfig {
            alpha: schema.alpha,
            beta: schema.beta,
            n_sweeps: schema.n_sweeps,
            sample_averaging: schema.sample_averaging.map(|s| SampleAveraging {
                burn_in: s.burn_in,
                lag: s.lag,
            }),
            n_rounds: schema.n_rounds,
            pool_size: schema.pool_size,
            prediction_rule: schema.prediction_rule.into(),
            n_threads: schema.n_threads.and_then(NonZeroUsize::new),
            seed: schema.seed,
            verbosity: schema.verbosity.into(),
        };
        config
            .validate()
            .map_err(|e| ReadError::Validation(format!("config: {e}")))?;
        Ok(config)
    }
}

// =============================================================================
// Rounds
// =============================================================================

impl From<&BoostRound> for BoostRoundSchema {
    fn from(round: &BoostRound) -> Self {
        Self {
            feature: round.feature,
            score: round.score,
            absent: round.hypothesis.row(ABSENT).to_vec(),
            present: round.hypothesis.row(PRESENT).to_vec(),
        }
    }
}

/// Validate and convert one round of a model with `meta`'s layout.
fn round_from_schema(
    index: usize,
    schema: BoostRoundSchema,
    meta: &ModelMeta,
) -> Result<BoostRound, ReadError> {
    if schema.feature as usize >= meta.n_features {
        return Err(ReadError::Validation(format!(
            "round {index}: feature {} out of range (n_features = {})",
            schema.feature, meta.n_features
        )));
    }
    for (name, table) in [("absent", &schema.absent), ("present", &schema.present)] {
        if table.len() != meta.n_labels {
            return Err(ReadError::Validation(format!(
                "round {index}: {name} table has {} entries, expected {}",
                table.len(),
                meta.n_labels
            )));
        }
        if table.iter().any(|v| !v.is_finite()) {
            return Err(ReadError::Validation(format!(
                "round {index}: {name} table has a non-finite value"
            )));
        }
    }
    if !schema.score.is_finite() {
        return Err(ReadError::Validation(format!(
            "round {index}: non-finite score"
        )));
    }

    let mut values = schema.absent;
    values.extend_from_slice(&schema.present);
    let hypothesis = Array2::from_shape_vec((2, meta.n_labels), values)
        .map_err(|e| ReadError::Validation(format!("round {index}: {e}")))?;

    Ok(BoostRound {
        feature: schema.feature,
        score: schema.score,
        hypothesis,
    })
}

// =============================================================================
// Model
// =============================================================================

impl From<&RfBoostModel> for RfBoostModelSchema {
    fn from(model: &RfBoostModel) -> Self {
        Self {
            version: SCHEMA_VERSION,
            meta: ModelMetaSchema {
                n_labels: model.meta().n_labels,
                n_features: model.meta().n_features,
            },
            config: model.config().into(),
            rounds: model.rounds().iter().map(BoostRoundSchema::from).collect(),
        }
    }
}

impl TryFrom<RfBoostModelSchema> for RfBoostModel {
    type Error = ReadError;

    fn try_from(schema: RfBoostModelSchema) -> Result<Self, Self::Error> {
        if schema.version != SCHEMA_VERSION {
            return Err(ReadError::UnsupportedVersion {
                found: schema.version,
                expected: SCHEMA_VERSION,
            });
        }
        if schema.meta.n_labels == 0 {
            return Err(ReadError::Validation("model has no labels".into()));
        }
        let meta = ModelMeta {
            n_labels: schema.meta.n_labels,
            n_features: schema.meta.n_features,
        };
        let config = RfBoostConfig::try_from(schema.config)?;
        let rounds = schema
            .rounds
            .into_iter()
            .enumerate()
            .map(|(i, round)| round_from_schema(i, round, &meta))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RfBoostModel::from_parts(rounds, meta, config))
    }
}
