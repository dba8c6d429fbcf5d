//! High-level model wrapper.
//!
//! Combines training, prediction and serialization into one type.
//!
//! # Overview
//!
//! - [`RfBoostModel`]: ordered boosting rounds plus metadata and config
//! - [`RfBoostConfig`]: validated builder-style configuration
//! - [`ModelMeta`]: label/feature layout the model expects
//!
//! # Example
//!
//! ```ignore
//! use rfboost::model::{RfBoostConfig, RfBoostModel};
//!
//! let config = RfBoostConfig::builder().n_rounds(50).pool_size(20).build()?;
//! let model = RfBoostModel::train(&dataset, config)?;
//!
//! let labels = model.predict(&test)?;
//!
//! model.save_json("model.rfb.json")?;
//! let loaded = RfBoostModel::load_json("model.rfb.json")?;
//! ```

mod config;
mod meta;
mod rfboost;

pub use config::{ConfigError, PredictionRule, RfBoostConfig, RfBoostConfigBuilder};
pub use meta::ModelMeta;
pub use rfboost::{BoostRound, PredictError, RfBoostModel};
