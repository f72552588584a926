//! The per-seed experiment loop.
//!
//! For each configured seed the runner reseeds every RNG, builds a fresh
//! trainer through the caller-supplied factory, decides fresh-vs-resume
//! from the interruption sentinel, drives the tuner through the iteration
//! budget, and appends the seed's best checkpoint to the results file.
//! Trainer construction goes through an explicit factory closure; which
//! trainer a run uses is decided by the call site, not looked up by name.

use std::fmt;
use std::io;
use std::path::PathBuf;

use burn::tensor::backend::Backend;

use crate::engine::{ConfigError, EngineError, RunOutcome, Trainable, TuneConfig, Tuner};
use crate::metrics::IterationMetrics;
use crate::schedule::LinearDecay;

use super::resume::RunMode;
use super::results::{ResultsFile, SeedResult};
use super::seeding::reseed_all;

// ============================================================================
// Errors
// ============================================================================

/// Errors from the experiment harness.
#[derive(Debug)]
pub enum HarnessError {
    /// Configuration rejected before any seed ran.
    Config(ConfigError),
    /// The engine or a trainer failed mid-run.
    Engine(EngineError),
    /// Sentinel or results-file I/O failed.
    Io(io::Error),
}

impl fmt::Display for HarnessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(e) => write!(f, "invalid experiment config: {}", e),
            Self::Engine(e) => write!(f, "engine error: {}", e),
            Self::Io(e) => write!(f, "harness I/O error: {}", e),
        }
    }
}

impl std::error::Error for HarnessError {}

impl From<ConfigError> for HarnessError {
    fn from(e: ConfigError) -> Self {
        Self::Config(e)
    }
}

impl From<EngineError> for HarnessError {
    fn from(e: EngineError) -> Self {
        Self::Engine(e)
    }
}

impl From<io::Error> for HarnessError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for a multi-seed experiment.
#[derive(Debug, Clone)]
pub struct ExperimentConfig {
    /// Experiment name; per-seed runs are named `<name>_seed<seed>`.
    pub experiment_name: String,
    /// Root under which run directories are created.
    pub storage_path: PathBuf,
    /// Results file path.
    pub results_path: PathBuf,
    /// Interruption sentinel path.
    pub sentinel_path: PathBuf,
    /// Iteration budget per seed.
    pub training_iterations: usize,
    /// Checkpoint cadence in iterations.
    pub checkpoint_frequency: usize,
    /// Whether each seed ends with a final checkpoint.
    pub checkpoint_at_end: bool,
    /// Checkpoint retention per seed.
    pub keep_last_n: usize,
    /// Seeds to run, in order.
    pub seeds: Vec<u64>,
    /// Learning-rate decay start.
    pub lr_start: f64,
    /// Learning-rate decay floor.
    pub lr_end: f64,
    /// Decay horizon in environment steps.
    pub lr_horizon: usize,
}

impl ExperimentConfig {
    /// Defaults: checkpoint every 50 iterations plus at the end, keep 3,
    /// learning rate 2.5e-4 decaying to 2.5e-5 over 50M steps.
    pub fn new(
        experiment_name: impl Into<String>,
        storage_path: impl Into<PathBuf>,
        training_iterations: usize,
        seeds: Vec<u64>,
    ) -> Self {
        let storage_path = storage_path.into();
        Self {
            experiment_name: experiment_name.into(),
            results_path: storage_path.join("results.json"),
            sentinel_path: storage_path.join("experiment_state"),
            storage_path,
            training_iterations,
            checkpoint_frequency: 50,
            checkpoint_at_end: true,
            keep_last_n: 3,
            seeds,
            lr_start: 2.5e-4,
            lr_end: 2.5e-5,
            lr_horizon: 50_000_000,
        }
    }

    /// Set the results file path.
    pub fn with_results_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.results_path = path.into();
        self
    }

    /// Set the sentinel path.
    pub fn with_sentinel_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.sentinel_path = path.into();
        self
    }

    /// Set the checkpoint cadence.
    pub fn with_checkpoint_frequency(mut self, frequency: usize) -> Self {
        self.checkpoint_frequency = frequency;
        self
    }

    /// Set whether each seed ends with a final checkpoint.
    pub fn with_checkpoint_at_end(mut self, at_end: bool) -> Self {
        self.checkpoint_at_end = at_end;
        self
    }

    /// Set the learning-rate decay.
    pub fn with_lr_decay(mut self, start: f64, end: f64, horizon: usize) -> Self {
        self.lr_start = start;
        self.lr_end = end;
        self.lr_horizon = horizon;
        self
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.training_iterations == 0 {
            return Err(ConfigError::InvalidCount {
                field: "training_iterations",
                value: 0,
            });
        }
        if self.seeds.is_empty() {
            return Err(ConfigError::InvalidCount {
                field: "seeds",
                value: 0,
            });
        }
        Ok(())
    }

    /// The tuner configuration for one seed's run.
    pub fn tune_config(&self, seed: u64) -> TuneConfig {
        TuneConfig::new(
            format!("{}_seed{}", self.experiment_name, seed),
            &self.storage_path,
            self.training_iterations,
        )
        .with_checkpoint_frequency(self.checkpoint_frequency)
        .with_checkpoint_at_end(self.checkpoint_at_end)
        .with_keep_last_n(self.keep_last_n)
    }

    /// The learning-rate schedule every seed trains with.
    pub fn lr_schedule(&self) -> LinearDecay {
        LinearDecay::new(self.lr_start, self.lr_end, self.lr_horizon)
    }
}

// ============================================================================
// Runner
// ============================================================================

/// One seed's completed run.
#[derive(Debug, Clone)]
pub struct SeedOutcome {
    /// The seed that ran.
    pub seed: u64,
    /// What the tuner reported.
    pub outcome: RunOutcome,
}

/// Runs every configured seed to completion.
pub struct ExperimentRunner<B: Backend> {
    config: ExperimentConfig,
    device: B::Device,
}

impl<B: Backend> ExperimentRunner<B> {
    /// Validate the configuration and create a runner on the given device.
    pub fn new(config: ExperimentConfig, device: B::Device) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self { config, device })
    }

    /// The validated configuration.
    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Run every seed, appending each result as it completes.
    ///
    /// `build_trainable` constructs a trainer for a seed; it runs after the
    /// RNGs are reseeded so construction-time randomness is reproducible.
    /// `on_iteration` sees every iteration of every seed.
    pub fn run<T, F, L>(
        &self,
        mut build_trainable: F,
        mut on_iteration: L,
    ) -> Result<Vec<SeedOutcome>, HarnessError>
    where
        T: Trainable,
        F: FnMut(u64, &ExperimentConfig) -> Result<T, EngineError>,
        L: FnMut(u64, &IterationMetrics),
    {
        std::fs::create_dir_all(&self.config.storage_path).map_err(HarnessError::Io)?;
        let results = ResultsFile::new(&self.config.results_path);
        let mut outcomes = Vec::with_capacity(self.config.seeds.len());

        for &seed in &self.config.seeds {
            reseed_all::<B>(&self.device, seed);
            let mut trainable = build_trainable(seed, &self.config)?;

            let tune_config = self.config.tune_config(seed);
            let mut tuner = match RunMode::consume(&self.config.sentinel_path)? {
                RunMode::Fresh => Tuner::new(tune_config)?,
                RunMode::Resuming => Tuner::restore(tune_config, &mut trainable)?,
            };

            println!(
                "=== seed {} (starting at iteration {}) ===",
                seed,
                tuner.start_iteration()
            );
            let outcome = tuner.fit(&mut trainable, |m| on_iteration(seed, m))?;

            results.append(&SeedResult {
                seed,
                best_checkpoint: outcome.best_checkpoint.clone(),
            })?;
            println!(
                "seed {} done: best reward mean {:.3}, best checkpoint {:?}",
                seed, outcome.best_reward_mean, outcome.best_checkpoint
            );

            outcomes.push(SeedOutcome { seed, outcome });
        }

        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_validate_rejects_empty_seeds() {
        let tmp = TempDir::new().unwrap();
        let config = ExperimentConfig::new("exp", tmp.path(), 10, vec![]);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_tune_config_names_run_by_seed() {
        let tmp = TempDir::new().unwrap();
        let config = ExperimentConfig::new("exp", tmp.path(), 10, vec![3]);
        let tune = config.tune_config(3);
        assert_eq!(tune.experiment_name, "exp_seed3");
        assert_eq!(tune.training_iterations, 10);
        assert_eq!(tune.checkpoint_frequency, 50);
    }

    #[test]
    fn test_lr_schedule_defaults() {
        let tmp = TempDir::new().unwrap();
        let config = ExperimentConfig::new("exp", tmp.path(), 10, vec![1]);
        let sched = config.lr_schedule();

        use crate::schedule::LRScheduler;
        assert_eq!(sched.lr_at(0), 2.5e-4);
        assert_eq!(sched.lr_at(50_000_000), 2.5e-5);
    }
}
