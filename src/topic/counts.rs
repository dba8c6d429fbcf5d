//! Count tables for collapsed Gibbs sampling.
//!
//! All tables are flat `u32` buffers. The word×topic and doc×topic tables are
//! row-major with `n_topics` columns.

/// Sufficient statistics of the current topic assignment.
///
/// At every point the tables equal the sums over the current assignment;
/// [`decrement`](Self::decrement) and [`increment`](Self::increment) are the
/// only mutators and always touch all four tables together.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountTables {
    n_topics: usize,
    n_words: usize,
    n_docs: usize,
    /// `[word * n_topics + topic]`
    word_topic: Vec<u32>,
    /// `[doc * n_topics + topic]`
    doc_topic: Vec<u32>,
    topic_totals: Vec<u32>,
    doc_totals: Vec<u32>,
}

impl CountTables {
    /// Create all-zero tables.
    pub fn zeros(n_docs: usize, n_topics: usize, n_words: usize) -> Self {
        Self {
            n_topics,
            n_words,
            n_docs,
            word_topic: vec![0; n_words * n_topics],
            doc_topic: vec![0; n_docs * n_topics],
            topic_totals: vec![0; n_topics],
            doc_totals: vec![0; n_docs],
        }
    }

    #[inline]
    pub fn n_topics(&self) -> usize {
        self.n_topics
    }

    #[inline]
    pub fn n_words(&self) -> usize {
        self.n_words
    }

    #[inline]
    pub fn n_docs(&self) -> usize {
        self.n_docs
    }

    /// Add one token of `word` in `doc` under `topic`.
    #[inline]
    pub fn increment(&mut self, doc: usize, word: usize, topic: usize) {
        self.word_topic[word * self.n_topics + topic] += 1;
        self.doc_topic[doc * self.n_topics + topic] += 1;
        self.topic_totals[topic] += 1;
        self.doc_totals[doc] += 1;
    }

    /// Remove one token of `word` in `doc` from `topic`.
    ///
    /// The token must currently be counted under `topic`.
    #[inline]
    pub fn decrement(&mut self, doc: usize, word: usize, topic: usize) {
        debug_assert!(self.word_topic[word * self.n_topics + topic] > 0);
        debug_assert!(self.doc_topic[doc * self.n_topics + topic] > 0);
        self.word_topic[word * self.n_topics + topic] -= 1;
        self.doc_topic[doc * self.n_topics + topic] -= 1;
        self.topic_totals[topic] -= 1;
        self.doc_totals[doc] -= 1;
    }

    #[inline]
    pub fn word_topic(&self, word: usize, topic: usize) -> u32 {
        self.word_topic[word * self.n_topics + topic]
    }

    #[inline]
    pub fn doc_topic(&self, doc: usize, topic: usize) -> u32 {
        self.doc_topic[doc * self.n_topics + topic]
    }

    /// Topic counts of one document.
    #[inline]
    pub fn doc_row(&self, doc: usize) -> &[u32] {
        &self.doc_topic[doc * self.n_topics..(doc + 1) * self.n_topics]
    }

    /// Topic counts of one word.
    #[inline]
    pub fn word_row(&self, word: usize) -> &[u32] {
        &self.word_topic[word * self.n_topics..(word + 1) * self.n_topics]
    }

    #[inline]
    pub fn topic_total(&self, topic: usize) -> u32 {
        self.topic_totals[topic]
    }

    #[inline]
    pub fn doc_total(&self, doc: usize) -> u32 {
        self.doc_totals[doc]
    }

    /// Per-table grand totals, in the order
    /// `(word_topic, doc_topic, topic_totals, doc_totals)`.
    pub fn table_sums(&self) -> (u64, u64, u64, u64) {
        fn sum(table: &[u32]) -> u64 {
            table.iter().map(|&c| c as u64).sum()
        }
        (
            sum(&self.word_topic),
            sum(&self.doc_topic),
            sum(&self.topic_totals),
            sum(&self.doc_totals),
        )
    }

    /// Whether every table sums to `n_tokens`.
    pub fn is_conserved(&self, n_tokens: usize) -> bool {
        let n = n_tokens as u64;
        let (a, b, c, d) = self.table_sums();
        a == n && b == n && c == n && d == n
    }
}
