//! Distribution estimates from Gibbs counts.
//!
//! ```text
//! θ[d][k] = (n_dk + α) / (n_d + K·α)
//! φ[k][w] = (n_wk + β) / (n_k + V·β)
//! ```
//!
//! Both estimates are row-stochastic by construction.

use ndarray::{Array2, ArrayView2};

use super::counts::CountTables;
use crate::data::Corpus;

/// Document×label weights, shape `[n_docs, n_topics]`.
pub fn estimate_theta(counts: &CountTables, alpha: f64) -> Array2<f64> {
    let n_topics = counts.n_topics();
    let k_alpha = n_topics as f64 * alpha;

    Array2::from_shape_fn((counts.n_docs(), n_topics), |(d, k)| {
        (counts.doc_topic(d, k) as f64 + alpha) / (counts.doc_total(d) as f64 + k_alpha)
    })
}

/// Label×feature relevance, shape `[n_topics, n_words]`.
pub fn estimate_phi(counts: &CountTables, beta: f64) -> Array2<f64> {
    let v_beta = counts.n_words() as f64 * beta;

    Array2::from_shape_fn((counts.n_topics(), counts.n_words()), |(k, w)| {
        (counts.word_topic(w, k) as f64 + beta) / (counts.topic_total(k) as f64 + v_beta)
    })
}

/// Output of a Labeled-LDA fit.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicDistributions {
    theta: Array2<f64>,
    phi: Array2<f64>,
    n_samples: usize,
}

impl TopicDistributions {
    /// Single-sample estimate from final counts.
    pub fn from_counts(counts: &CountTables, alpha: f64, beta: f64) -> Self {
        Self {
            theta: estimate_theta(counts, alpha),
            phi: estimate_phi(counts, beta),
            n_samples: 1,
        }
    }

    /// Document×label weights, `[n_docs, n_labels]`.
    pub fn theta(&self) -> ArrayView2<'_, f64> {
        self.theta.view()
    }

    /// Label×feature relevance, `[n_labels, n_features]`.
    pub fn phi(&self) -> ArrayView2<'_, f64> {
        self.phi.view()
    }

    /// Number of Gibbs states averaged into these estimates.
    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn into_parts(self) -> (Array2<f64>, Array2<f64>) {
        (self.theta, self.phi)
    }

    /// Per-token perplexity of `corpus` under these estimates.
    ///
    /// `exp(-Σ ln Σ_k θ[d][k]·φ[k][w] / N)`. Returns `f64::NAN` for a corpus
    /// without tokens.
    pub fn perplexity(&self, corpus: &Corpus) -> f64 {
        let n_tokens = corpus.n_tokens();
        if n_tokens == 0 {
            return f64::NAN;
        }

        let mut log_likelihood = 0.0;
        for (d, doc) in corpus.documents().enumerate() {
            let theta_d = self.theta.row(d);
            for &w in doc.tokens {
                let p: f64 = theta_d
                    .iter()
                    .zip(self.phi.column(w as usize))
                    .map(|(t, p)| t * p)
                    .sum();
                log_likelihood += p.ln();
            }
        }
        (-log_likelihood / n_tokens as f64).exp()
    }
}

/// Running mean of θ/φ over several Gibbs states.
#[derive(Debug)]
pub(crate) struct SampleAccumulator {
    theta_sum: Array2<f64>,
    phi_sum: Array2<f64>,
    n_samples: usize,
}

impl SampleAccumulator {
    pub fn new(n_docs: usize, n_topics: usize, n_words: usize) -> Self {
        Self {
            theta_sum: Array2::zeros((n_docs, n_topics)),
            phi_sum: Array2::zeros((n_topics, n_words)),
            n_samples: 0,
        }
    }

    pub fn add(&mut self, counts: &CountTables, alpha: f64, beta: f64) {
        self.theta_sum += &estimate_theta(counts, alpha);
        self.phi_sum += &estimate_phi(counts, beta);
        self.n_samples += 1;
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    /// Mean of the collected samples, `None` if nothing was collected.
    pub fn finish(self) -> Option<TopicDistributions> {
        if self.n_samples == 0 {
            return None;
        }
        let n = self.n_samples as f64;
        Some(TopicDistributions {
            theta: self.theta_sum / n,
            phi: self.phi_sum / n,
            n_samples: self.n_samples,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn counts() -> CountTables {
        // doc 0: words 0,0 on topic 0; doc 1: word 1 on topic 1, word 2 on topic 0
        let mut c = CountTables::zeros(2, 2, 3);
        c.increment(0, 0, 0);
        c.increment(0, 0, 0);
        c.increment(1, 1, 1);
        c.increment(1, 2, 0);
        c
    }

    #[test]
    fn theta_matches_formula() {
        let theta = estimate_theta(&counts(), 0.5);
        assert_eq!(theta.dim(), (2, 2));
        // (2 + 0.5) / (2 + 2*0.5)
        assert_abs_diff_eq!(theta[[0, 0]], 2.5 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(theta[[0, 1]], 0.5 / 3.0, epsilon = 1e-12);
        assert_abs_diff_eq!(theta[[1, 1]], 1.5 / 3.0, epsilon = 1e-12);
    }

    #[test]
    fn phi_matches_formula() {
        let phi = estimate_phi(&counts(), 0.1);
        assert_eq!(phi.dim(), (2, 3));
        // topic 0 has 3 tokens: word 0 twice, word 2 once
        assert_abs_diff_eq!(phi[[0, 0]], 2.1 / 3.3, epsilon = 1e-12);
        assert_abs_diff_eq!(phi[[0, 1]], 0.1 / 3.3, epsilon = 1e-12);
        assert_abs_diff_eq!(phi[[1, 1]], 1.1 / 1.3, epsilon = 1e-12);
    }

    #[test]
    fn rows_sum_to_one() {
        let dist = TopicDistributions::from_counts(&counts(), 0.01, 0.01);
        for row in dist.theta().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        for row in dist.phi().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn accumulator_averages_samples() {
        let c1 = counts();
        let mut c2 = c1.clone();
        c2.decrement(1, 2, 0);
        c2.increment(1, 2, 1);

        let mut acc = SampleAccumulator::new(2, 2, 3);
        acc.add(&c1, 0.5, 0.1);
        acc.add(&c2, 0.5, 0.1);
        assert_eq!(acc.n_samples(), 2);
        let mean = acc.finish().unwrap();

        let expected = (estimate_theta(&c1, 0.5) + estimate_theta(&c2, 0.5)) / 2.0;
        assert_abs_diff_eq!(mean.theta()[[1, 0]], expected[[1, 0]], epsilon = 1e-12);
        for row in mean.theta().rows() {
            assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-12);
        }
        assert_eq!(mean.n_samples(), 2);
    }

    #[test]
    fn empty_accumulator_yields_none() {
        assert!(SampleAccumulator::new(1, 1, 1).finish().is_none());
    }

    #[test]
    fn perplexity_is_finite_and_at_least_one() {
        let corpus = Corpus::from_documents(2, 3, [(vec![0], vec![0, 0]), (vec![0, 1], vec![1, 2])])
            .unwrap();
        let dist = TopicDistributions::from_counts(&counts(), 0.5, 0.1);
        let pp = dist.perplexity(&corpus);
        assert!(pp.is_finite());
        assert!(pp >= 1.0);
    }
}
