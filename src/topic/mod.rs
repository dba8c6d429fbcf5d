//! Labeled-LDA topic model.
//!
//! Turns a labeled [`Corpus`] into two distributions:
//!
//! - θ (`[n_docs, n_labels]`): how much of each document belongs to each label
//! - φ (`[n_labels, n_features]`): how relevant each feature is to each label
//!
//! Topics are tied 1:1 to labels and each document is restricted to its own
//! label set, which is what distinguishes Labeled-LDA from plain LDA.
//!
//! # Example
//!
//! ```ignore
//! use rand::SeedableRng;
//! use rand_xoshiro::Xoshiro256PlusPlus;
//! use rfboost::topic::{LabeledLda, LdaParams};
//!
//! let mut rng = Xoshiro256PlusPlus::seed_from_u64(42);
//! let dist = LabeledLda::new(LdaParams::default()).fit(&corpus, &mut rng);
//! let theta = dist.theta();
//! ```

mod counts;
mod estimate;
mod sampler;

pub use counts::CountTables;
pub use estimate::{estimate_phi, estimate_theta, TopicDistributions};
pub use sampler::GibbsSampler;

use rand::Rng;

use crate::data::Corpus;
use crate::training::{TrainingLogger, Verbosity};
use estimate::SampleAccumulator;

/// Average θ/φ over several Gibbs states instead of using only the last one.
///
/// After `burn_in` sweeps, the state is collected every `lag` sweeps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SampleAveraging {
    pub burn_in: u32,
    pub lag: u32,
}

impl SampleAveraging {
    /// Whether the state after `completed` sweeps is collected: strictly after
    /// the burn-in, then every `lag` sweeps.
    #[inline]
    pub fn collects(&self, completed: u32) -> bool {
        self.lag > 0 && completed > self.burn_in && (completed - self.burn_in) % self.lag == 0
    }
}

/// Parameters for Labeled-LDA fitting.
#[derive(Debug, Clone)]
pub struct LdaParams {
    /// Document-topic Dirichlet prior.
    pub alpha: f64,
    /// Topic-word Dirichlet prior.
    pub beta: f64,
    /// Number of Gibbs sweeps. There is no convergence check.
    pub n_sweeps: u32,
    /// Optional averaging over several states.
    pub sample_averaging: Option<SampleAveraging>,
    pub verbosity: Verbosity,
}

impl Default for LdaParams {
    fn default() -> Self {
        Self {
            alpha: 0.5,
            beta: 0.1,
            n_sweeps: 50,
            sample_averaging: None,
            verbosity: Verbosity::default(),
        }
    }
}

/// Labeled-LDA estimator.
#[derive(Debug, Clone)]
pub struct LabeledLda {
    params: LdaParams,
}

impl LabeledLda {
    pub fn new(params: LdaParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &LdaParams {
        &self.params
    }

    /// Run the sampler for `n_sweeps` sweeps and estimate θ and φ.
    ///
    /// All randomness (initial assignment and every draw) comes from `rng`.
    pub fn fit<R: Rng + ?Sized>(&self, corpus: &Corpus, rng: &mut R) -> TopicDistributions {
        let LdaParams {
            alpha,
            beta,
            n_sweeps,
            sample_averaging,
            verbosity,
        } = self.params;

        let mut logger = TrainingLogger::new(verbosity);
        logger.info(&format!(
            "labeled-lda: alpha={alpha} beta={beta} sweeps={n_sweeps} K={} V={} M={} tokens={}",
            corpus.n_labels(),
            corpus.n_words(),
            corpus.n_docs(),
            corpus.n_tokens()
        ));
        if corpus.n_tokens() == 0 {
            logger.warn("labeled-lda: corpus has no word tokens, estimates are the priors");
        }

        let mut sampler = GibbsSampler::new(corpus, alpha, beta, rng);
        let mut accumulator = sample_averaging
            .map(|_| SampleAccumulator::new(corpus.n_docs(), corpus.n_labels(), corpus.n_words()));

        logger.start_training("labeled-lda", n_sweeps as usize);
        for sweep in 0..n_sweeps {
            sampler.sweep(rng);
            logger.log_sweep(sweep as usize);

            if let (Some(schedule), Some(acc)) = (sample_averaging, accumulator.as_mut()) {
                if schedule.collects(sweep + 1) {
                    acc.add(sampler.counts(), alpha, beta);
                }
            }
        }
        logger.finish_training("labeled-lda");

        let distributions = accumulator
            .and_then(SampleAccumulator::finish)
            .unwrap_or_else(|| TopicDistributions::from_counts(sampler.counts(), alpha, beta));

        if logger.enabled(Verbosity::Debug) {
            logger.debug(&format!(
                "labeled-lda: {} sample(s), perplexity={:.4}",
                distributions.n_samples(),
                distributions.perplexity(corpus)
            ));
        }

        distributions
    }
}
