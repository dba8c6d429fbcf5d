//! Verbosity-gated training logs.
//!
//! Records go through the `log` facade; the library never installs a logger
//! itself. [`Verbosity`] filters on top of whatever level the application's
//! logger enables.

use std::time::Instant;

/// Verbosity level for training output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
pub enum Verbosity {
    /// No output.
    #[default]
    Silent,
    /// Only warnings about degenerate inputs.
    Warning,
    /// Setup summary and one line per boosting round.
    Info,
    /// Everything, including per-sweep progress and perplexity.
    Debug,
}

/// Logger shared by the topic-model and boosting stages.
#[derive(Debug, Clone)]
pub struct TrainingLogger {
    verbosity: Verbosity,
    n_rounds: usize,
    started: Option<Instant>,
}

impl TrainingLogger {
    pub fn new(verbosity: Verbosity) -> Self {
        Self {
            verbosity,
            n_rounds: 0,
            started: None,
        }
    }

    #[inline]
    pub fn enabled(&self, level: Verbosity) -> bool {
        level != Verbosity::Silent && self.verbosity >= level
    }

    pub fn warn(&self, msg: &str) {
        if self.enabled(Verbosity::Warning) {
            log::warn!(target: "rfboost", "{msg}");
        }
    }

    pub fn info(&self, msg: &str) {
        if self.enabled(Verbosity::Info) {
            log::info!(target: "rfboost", "{msg}");
        }
    }

    pub fn debug(&self, msg: &str) {
        if self.enabled(Verbosity::Debug) {
            log::debug!(target: "rfboost", "{msg}");
        }
    }

    /// Mark the start of a stage with `n_rounds` iterations.
    pub fn start_training(&mut self, stage: &str, n_rounds: usize) {
        self.n_rounds = n_rounds;
        self.started = Some(Instant::now());
        self.info(&format!("{stage}: starting {n_rounds} iterations"));
    }

    /// Gibbs sweep progress, every tenth sweep and the last one.
    pub fn log_sweep(&self, sweep: usize) {
        if (sweep + 1) % 10 == 0 || sweep + 1 == self.n_rounds {
            self.debug(&format!("sweep {}/{}", sweep + 1, self.n_rounds));
        }
    }

    /// One boosting round.
    pub fn log_round(&self, round: usize, pivot: u32, score: f64, train_hamming: Option<f64>) {
        if !self.enabled(Verbosity::Info) {
            return;
        }
        match train_hamming {
            Some(h) => self.info(&format!(
                "[{}/{}] pivot={pivot} z={score:.6} train-hamming={h:.4}",
                round + 1,
                self.n_rounds
            )),
            None => self.info(&format!(
                "[{}/{}] pivot={pivot} z={score:.6}",
                round + 1,
                self.n_rounds
            )),
        }
    }

    pub fn finish_training(&self, stage: &str) {
        if let Some(started) = self.started {
            self.info(&format!(
                "{stage}: finished in {:.3}s",
                started.elapsed().as_secs_f64()
            ));
        }
    }
}
