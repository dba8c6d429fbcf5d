//! Labeled corpus extracted from a multi-label dataset.
//!
//! Each dataset row becomes a document: attribute indices below `n_labels`
//! form the document's label set, the remaining indices (shifted down by
//! `n_labels`) form its word tokens in their original order.
//!
//! Documents live in two flat arenas (labels and tokens) addressed through
//! offset tables, so per-token state such as topic assignments can be kept in
//! a single array indexed by `token_range(doc)`.

use std::ops::Range;

use super::{DatasetError, MultiLabelDataset};

/// Partition one row's sparse indices into `(labels, words)`.
///
/// Indices `< n_labels` are labels; the others are words, shifted by
/// `-n_labels`. Order and multiplicity are preserved in both outputs.
pub fn extract_row(indices: &[u32], n_labels: usize) -> (Vec<u32>, Vec<u32>) {
    let mut labels = Vec::new();
    let mut words = Vec::new();
    partition_into(indices, n_labels as u32, &mut labels, &mut words);
    (labels, words)
}

#[inline]
fn partition_into(indices: &[u32], n_labels: u32, labels: &mut Vec<u32>, words: &mut Vec<u32>) {
    for &index in indices {
        if index < n_labels {
            labels.push(index);
        } else {
            words.push(index - n_labels);
        }
    }
}

/// Borrowed view of a single document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DocumentView<'a> {
    /// Label set, non-empty.
    pub labels: &'a [u32],
    /// Word tokens in order, possibly repeating.
    pub tokens: &'a [u32],
}

impl DocumentView<'_> {
    /// Number of word tokens.
    #[inline]
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// An immutable labeled corpus.
///
/// Label count `L` and vocabulary size `V` are fixed at construction. Every
/// document has at least one label.
#[derive(Debug, Clone)]
pub struct Corpus {
    n_labels: usize,
    n_words: usize,
    label_offsets: Vec<usize>,
    labels: Vec<u32>,
    token_offsets: Vec<usize>,
    tokens: Vec<u32>,
}

impl Corpus {
    /// Extract a corpus from a dataset, one document per row.
    ///
    /// # Errors
    ///
    /// [`DatasetError::EmptyLabelSet`] if any row has no label.
    pub fn from_dataset(dataset: &MultiLabelDataset) -> Result<Self, DatasetError> {
        let n_labels = dataset.n_labels();
        let mut corpus = Self::with_capacity(n_labels, dataset.n_features(), dataset.n_samples());

        for row in 0..dataset.n_samples() {
            partition_into(
                dataset.row_attributes(row),
                n_labels as u32,
                &mut corpus.labels,
                &mut corpus.tokens,
            );
            corpus.close_document(row)?;
        }

        Ok(corpus)
    }

    /// Build a corpus directly from `(labels, words)` pairs.
    ///
    /// Label sets are sorted and deduplicated; word sequences are kept as
    /// given, repetitions included.
    pub fn from_documents<I, L, W>(n_labels: usize, n_words: usize, docs: I) -> Result<Self, DatasetError>
    where
        I: IntoIterator<Item = (L, W)>,
        L: AsRef<[usize]>,
        W: AsRef<[usize]>,
    {
        if n_labels == 0 {
            return Err(DatasetError::NoLabels);
        }
        let mut corpus = Self::with_capacity(n_labels, n_words, 0);
        let mut label_set: Vec<usize> = Vec::new();

        for (doc, (labels, words)) in docs.into_iter().enumerate() {
            label_set.clear();
            label_set.extend_from_slice(labels.as_ref());
            label_set.sort_unstable();
            label_set.dedup();

            if let Some(&index) = label_set.last() {
                if index >= n_labels {
                    return Err(DatasetError::LabelOutOfRange { doc, index, n_labels });
                }
            }
            if let Some(&index) = words.as_ref().iter().find(|&&w| w >= n_words) {
                return Err(DatasetError::WordOutOfRange { doc, index, n_words });
            }

            corpus.labels.extend(label_set.iter().map(|&l| l as u32));
            corpus.tokens.extend(words.as_ref().iter().map(|&w| w as u32));
            corpus.close_document(doc)?;
        }

        Ok(corpus)
    }

    fn with_capacity(n_labels: usize, n_words: usize, n_docs: usize) -> Self {
        let mut label_offsets = Vec::with_capacity(n_docs + 1);
        let mut token_offsets = Vec::with_capacity(n_docs + 1);
        label_offsets.push(0);
        token_offsets.push(0);
        Self {
            n_labels,
            n_words,
            label_offsets,
            labels: Vec::new(),
            token_offsets,
            tokens: Vec::new(),
        }
    }

    /// Seal the document whose labels and tokens were just appended.
    fn close_document(&mut self, doc: usize) -> Result<(), DatasetError> {
        let start = self.label_offsets[self.label_offsets.len() - 1];
        if self.labels.len() == start {
            return Err(DatasetError::EmptyLabelSet { row: doc });
        }
        self.label_offsets.push(self.labels.len());
        self.token_offsets.push(self.tokens.len());
        Ok(())
    }

    /// Number of documents (M).
    #[inline]
    pub fn n_docs(&self) -> usize {
        self.label_offsets.len() - 1
    }

    /// Number of labels, which is also the number of topics (K = L).
    #[inline]
    pub fn n_labels(&self) -> usize {
        self.n_labels
    }

    /// Vocabulary size (V).
    #[inline]
    pub fn n_words(&self) -> usize {
        self.n_words
    }

    /// Total number of word tokens over all documents.
    #[inline]
    pub fn n_tokens(&self) -> usize {
        self.tokens.len()
    }

    #[inline]
    pub fn document(&self, doc: usize) -> DocumentView<'_> {
        DocumentView {
            labels: &self.labels[self.label_offsets[doc]..self.label_offsets[doc + 1]],
            tokens: &self.tokens[self.token_range(doc)],
        }
    }

    /// Position of a document's tokens in the flat token arena.
    #[inline]
    pub fn token_range(&self, doc: usize) -> Range<usize> {
        self.token_offsets[doc]..self.token_offsets[doc + 1]
    }

    /// All tokens, document after document.
    #[inline]
    pub fn tokens(&self) -> &[u32] {
        &self.tokens
    }

    pub fn documents(&self) -> impl Iterator<Item = DocumentView<'_>> + '_ {
        (0..self.n_docs()).map(move |doc| self.document(doc))
    }
}
