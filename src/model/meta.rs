//! Model metadata.

use serde::{Deserialize, Serialize};

/// Shape of the data a model was trained on.
///
/// Examples passed to prediction must have the same label/feature layout:
/// `n_labels` label columns followed by `n_features` feature columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelMeta {
    /// Number of labels.
    pub n_labels: usize,
    /// Number of features.
    pub n_features: usize,
}

impl ModelMeta {
    /// Width of a full row (labels then features).
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_labels + self.n_features
    }
}
