//! User-facing multi-label dataset.
//!
//! This is the canonical entry point for training and prediction APIs.

use fixedbitset::FixedBitSet;
use ndarray::{Array2, ArrayView1, ArrayView2};

/// Dataset conversion/validation errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DatasetError {
    #[error("number of labels must be at least 1")]
    NoLabels,

    #[error("dense data has {n_columns} columns, fewer than the {n_labels} label columns")]
    TooFewColumns { n_labels: usize, n_columns: usize },

    #[error("row {row}: attribute index {index} out of range (n_columns = {n_columns})")]
    IndexOutOfRange {
        row: usize,
        index: usize,
        n_columns: usize,
    },

    #[error("row {row} has an empty label set")]
    EmptyLabelSet { row: usize },

    #[error("document {doc}: label {index} out of range (n_labels = {n_labels})")]
    LabelOutOfRange {
        doc: usize,
        index: usize,
        n_labels: usize,
    },

    #[error("document {doc}: word {index} out of range (n_words = {n_words})")]
    WordOutOfRange {
        doc: usize,
        index: usize,
        n_words: usize,
    },

    #[error("matrix shape {got:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
}

/// A binary multi-label dataset.
///
/// Attribute columns `[0, n_labels)` are label indicators and columns
/// `[n_labels, n_labels + n_features)` are feature indicators. Features are
/// addressed by their shifted index `column - n_labels` everywhere outside
/// this type.
///
/// Rows are stored sparsely (present attribute indices, ascending). A
/// column-oriented bitset per feature gives O(1) presence lookups for the
/// boosting scan.
#[derive(Debug, Clone)]
pub struct MultiLabelDataset {
    n_labels: usize,
    n_features: usize,
    /// Label indicators, shape `[n_samples, n_labels]`.
    labels: Array2<bool>,
    row_offsets: Vec<usize>,
    attributes: Vec<u32>,
    /// `feature_rows[f]` holds the rows where feature `f` is present.
    feature_rows: Vec<FixedBitSet>,
}

impl MultiLabelDataset {
    /// Create a dataset from sparse rows of present attribute indices.
    ///
    /// Indices may appear in any order and may repeat; each row is sorted and
    /// deduplicated since presence is binary.
    pub fn from_sparse<I, R>(n_labels: usize, n_features: usize, rows: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = R>,
        R: AsRef<[usize]>,
    {
        if n_labels == 0 {
            return Err(DatasetError::NoLabels);
        }
        let n_columns = n_labels + n_features;

        let mut row_offsets = vec![0];
        let mut attributes = Vec::new();
        let mut scratch: Vec<usize> = Vec::new();

        for (row, indices) in rows.into_iter().enumerate() {
            scratch.clear();
            scratch.extend_from_slice(indices.as_ref());
            scratch.sort_unstable();
            scratch.dedup();

            if let Some(&index) = scratch.last() {
                if index >= n_columns {
                    return Err(DatasetError::IndexOutOfRange {
                        row,
                        index,
                        n_columns,
                    });
                }
            }

            attributes.extend(scratch.iter().map(|&i| i as u32));
            row_offsets.push(attributes.len());
        }

        Ok(Self::assemble(n_labels, n_features, row_offsets, attributes))
    }

    /// Create a dataset from a dense row-major matrix `[n_samples, n_columns]`.
    ///
    /// Any non-zero value counts as present.
    pub fn from_dense(n_labels: usize, data: ArrayView2<f32>) -> Result<Self, DatasetError> {
        if n_labels == 0 {
            return Err(DatasetError::NoLabels);
        }
        let (_, n_columns) = data.dim();
        if n_columns < n_labels {
            return Err(DatasetError::TooFewColumns { n_labels, n_columns });
        }

        let mut row_offsets = vec![0];
        let mut attributes = Vec::new();
        for row in data.rows() {
            attributes.extend(
                row.iter()
                    .enumerate()
                    .filter(|(_, v)| **v != 0.0)
                    .map(|(i, _)| i as u32),
            );
            row_offsets.push(attributes.len());
        }

        Ok(Self::assemble(n_labels, n_columns - n_labels, row_offsets, attributes))
    }

    fn assemble(
        n_labels: usize,
        n_features: usize,
        row_offsets: Vec<usize>,
        attributes: Vec<u32>,
    ) -> Self {
        let n_samples = row_offsets.len() - 1;
        let mut labels = Array2::from_elem((n_samples, n_labels), false);
        let mut feature_rows = vec![FixedBitSet::with_capacity(n_samples); n_features];

        for row in 0..n_samples {
            for &attr in &attributes[row_offsets[row]..row_offsets[row + 1]] {
                let attr = attr as usize;
                if attr < n_labels {
                    labels[[row, attr]] = true;
                } else {
                    feature_rows[attr - n_labels].insert(row);
                }
            }
        }

        Self {
            n_labels,
            n_features,
            labels,
            row_offsets,
            attributes,
            feature_rows,
        }
    }

    /// Number of rows.
    #[inline]
    pub fn n_samples(&self) -> usize {
        self.row_offsets.len() - 1
    }

    /// Number of label columns (L).
    #[inline]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Number of feature columns (V).
    #[inline]
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Total attribute columns, `n_labels + n_features`.
    #[inline]
    pub fn n_columns(&self) -> usize {
        self.n_labels + self.n_features
    }

    /// Present attribute indices of a row, ascending.
    #[inline]
    pub fn row_attributes(&self, row: usize) -> &[u32] {
        &self.attributes[self.row_offsets[row]..self.row_offsets[row + 1]]
    }

    #[inline]
    pub fn has_label(&self, row: usize, label: usize) -> bool {
        self.labels[[row, label]]
    }

    #[inline]
    pub fn has_feature(&self, row: usize, feature: usize) -> bool {
        self.feature_rows[feature].contains(row)
    }

    /// Label indicators, shape `[n_samples, n_labels]`.
    pub fn labels(&self) -> ArrayView2<'_, bool> {
        self.labels.view()
    }

    /// Label indicators of a single row.
    pub fn label_row(&self, row: usize) -> ArrayView1<'_, bool> {
        self.labels.row(row)
    }

    /// Rows in which `feature` is present.
    #[inline]
    pub fn feature_rows(&self, feature: usize) -> &FixedBitSet {
        &self.feature_rows[feature]
    }

    /// Number of rows in which `feature` is present.
    pub fn feature_count(&self, feature: usize) -> usize {
        self.feature_rows[feature].count_ones(..)
    }
}
