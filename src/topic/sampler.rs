//! Collapsed Gibbs sampler for Labeled-LDA.
//!
//! Topics are identified with labels, and every token of a document may only
//! be assigned to one of that document's own labels. The conditional for a
//! token of word `w` in document `d` is
//!
//! ```text
//! p(z = k) ∝ (n_dk + α) · (n_wk + β) / (n_k + V·β),   k ∈ labels(d)
//! ```
//!
//! computed after the token's own contribution has been removed from the
//! counts.

use rand::Rng;

use super::counts::CountTables;
use crate::data::Corpus;

/// Gibbs sampling state over a borrowed corpus.
///
/// Topic assignments are stored in one flat array aligned with the corpus
/// token arena (`assignments[corpus.token_range(d)]` belongs to document `d`).
pub struct GibbsSampler<'c> {
    corpus: &'c Corpus,
    alpha: f64,
    beta: f64,
    v_beta: f64,
    counts: CountTables,
    assignments: Vec<u32>,
    /// Cumulative conditional mass over the current document's labels.
    cumulative: Vec<f64>,
    sweeps_done: u32,
}

impl<'c> GibbsSampler<'c> {
    /// Create a sampler and draw the initial assignment.
    ///
    /// Each token starts on a label chosen uniformly from its document's
    /// label set.
    pub fn new<R: Rng + ?Sized>(corpus: &'c Corpus, alpha: f64, beta: f64, rng: &mut R) -> Self {
        let n_topics = corpus.n_labels();
        let mut counts = CountTables::zeros(corpus.n_docs(), n_topics, corpus.n_words());
        let mut assignments = Vec::with_capacity(corpus.n_tokens());

        for (doc, view) in corpus.documents().enumerate() {
            for &word in view.tokens {
                let topic = view.labels[rng.gen_range(0..view.labels.len())];
                counts.increment(doc, word as usize, topic as usize);
                assignments.push(topic);
            }
        }

        let max_labels = corpus.documents().map(|d| d.labels.len()).max().unwrap_or(0);

        Self {
            corpus,
            alpha,
            beta,
            v_beta: corpus.n_words() as f64 * beta,
            counts,
            assignments,
            cumulative: Vec::with_capacity(max_labels),
            sweeps_done: 0,
        }
    }

    /// Run one full sweep over every token of every document.
    pub fn sweep<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        for doc in 0..self.corpus.n_docs() {
            self.resample_document(doc, rng);
        }
        self.sweeps_done += 1;
    }

    /// Resample every token of a single document, in order.
    pub fn resample_document<R: Rng + ?Sized>(&mut self, doc: usize, rng: &mut R) {
        let corpus = self.corpus;
        let view = corpus.document(doc);
        let offset = corpus.token_range(doc).start;

        for (pos, &word) in view.tokens.iter().enumerate() {
            let word = word as usize;
            let old_topic = self.assignments[offset + pos] as usize;
            self.counts.decrement(doc, word, old_topic);

            let pick = self.draw(doc, word, view.labels, rng);
            let new_topic = view.labels[pick];

            self.counts.increment(doc, word, new_topic as usize);
            self.assignments[offset + pos] = new_topic;
        }
    }

    /// Draw an index into `labels` from the token's conditional.
    ///
    /// The first cumulative bucket that meets or exceeds the uniform draw wins.
    fn draw<R: Rng + ?Sized>(&mut self, doc: usize, word: usize, labels: &[u32], rng: &mut R) -> usize {
        if labels.len() == 1 {
            return 0;
        }

        self.cumulative.clear();
        let mut total = 0.0;
        for &label in labels {
            let k = label as usize;
            let doc_part = self.counts.doc_topic(doc, k) as f64 + self.alpha;
            let word_part = (self.counts.word_topic(word, k) as f64 + self.beta)
                / (self.counts.topic_total(k) as f64 + self.v_beta);
            total += doc_part * word_part;
            self.cumulative.push(total);
        }

        let u = rng.gen::<f64>() * total;
        self.cumulative
            .iter()
            .position(|&c| c >= u)
            .unwrap_or(labels.len() - 1)
    }

    #[inline]
    pub fn counts(&self) -> &CountTables {
        &self.counts
    }

    /// Current topic of every token, in corpus token order.
    #[inline]
    pub fn assignments(&self) -> &[u32] {
        &self.assignments
    }

    /// Current topics of one document's tokens.
    #[inline]
    pub fn doc_assignments(&self, doc: usize) -> &[u32] {
        &self.assignments[self.corpus.token_range(doc)]
    }

    #[inline]
    pub fn sweeps_done(&self) -> u32 {
        self.sweeps_done
    }

    /// Drop the assignment and keep only the final counts.
    pub fn into_counts(self) -> CountTables {
        self.counts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_xoshiro::Xoshiro256PlusPlus;

    fn corpus() -> Corpus {
        Corpus::from_documents(
            3,
            5,
            [
                (vec![0], vec![0, 1, 1]),
                (vec![0, 1], vec![1, 2, 3, 3]),
                (vec![1, 2], vec![4, 4, 0]),
                (vec![2], vec![2]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn initial_assignment_respects_label_sets() {
        let corpus = corpus();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(7);
        let sampler = GibbsSampler::new(&corpus, 0.5, 0.1, &mut rng);

        for (doc, view) in corpus.documents().enumerate() {
            for topic in sampler.doc_assignments(doc) {
                assert!(view.labels.contains(topic));
            }
        }
        assert!(sampler.counts().is_conserved(corpus.n_tokens()));
    }

    #[test]
    fn counts_conserved_after_every_document() {
        let corpus = corpus();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(11);
        let mut sampler = GibbsSampler::new(&corpus, 0.5, 0.1, &mut rng);

        for _ in 0..5 {
            for doc in 0..corpus.n_docs() {
                sampler.resample_document(doc, &mut rng);
                assert!(sampler.counts().is_conserved(corpus.n_tokens()));
            }
        }
    }

    #[test]
    fn sweeps_keep_topics_inside_label_sets() {
        let corpus = corpus();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(3);
        let mut sampler = GibbsSampler::new(&corpus, 0.01, 0.01, &mut rng);

        for _ in 0..20 {
            sampler.sweep(&mut rng);
        }
        assert_eq!(sampler.sweeps_done(), 20);

        for (doc, view) in corpus.documents().enumerate() {
            for topic in sampler.doc_assignments(doc) {
                assert!(view.labels.contains(topic));
            }
        }
    }

    #[test]
    fn singleton_label_set_is_deterministic() {
        let corpus = Corpus::from_documents(2, 3, [(vec![1], vec![0, 1, 2, 2])]).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let mut sampler = GibbsSampler::new(&corpus, 0.5, 0.1, &mut rng);
        sampler.sweep(&mut rng);

        assert_eq!(sampler.assignments(), &[1, 1, 1, 1]);
        assert_eq!(sampler.counts().topic_total(1), 4);
        assert_eq!(sampler.counts().topic_total(0), 0);
    }

    #[test]
    fn same_seed_same_assignment() {
        let corpus = corpus();
        let run = |seed| {
            let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
            let mut sampler = GibbsSampler::new(&corpus, 0.5, 0.1, &mut rng);
            for _ in 0..10 {
                sampler.sweep(&mut rng);
            }
            sampler.assignments().to_vec()
        };
        assert_eq!(run(42), run(42));
    }

    #[test]
    fn empty_document_is_skipped() {
        let corpus = Corpus::from_documents(2, 2, [(vec![0], vec![]), (vec![1], vec![1])]).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(1);
        let mut sampler = GibbsSampler::new(&corpus, 0.5, 0.1, &mut rng);
        sampler.sweep(&mut rng);

        assert!(sampler.doc_assignments(0).is_empty());
        assert_eq!(sampler.doc_assignments(1), &[1]);
    }
}
