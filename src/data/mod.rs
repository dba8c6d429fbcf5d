//! Data input abstractions for multi-label training.
//!
//! # Overview
//!
//! [`MultiLabelDataset`] is the tabular input: binary rows whose first
//! `n_labels` columns are label indicators and whose remaining `n_features`
//! columns are feature indicators. The boundary between the two blocks is
//! fixed for the lifetime of a dataset.
//!
//! [`Corpus`] is the topic-model view of the same rows: each row becomes a
//! document with a label set and a sequence of word tokens. Documents are
//! stored in flat arenas indexed through per-document offsets.

mod corpus;
mod dataset;

pub use corpus::{extract_row, Corpus, DocumentView};
pub use dataset::{DatasetError, MultiLabelDataset};
