//! The tuner: drives a [`Trainable`] through an iteration budget.
//!
//! The tuner owns the outer training loop. It calls
//! [`Trainable::train_iteration`] until the budget is exhausted, saves
//! checkpoints on the configured cadence (plus a final one), tracks the best
//! mean episode reward seen, and reports a [`RunOutcome`] naming the best
//! checkpoint. Resumption reuses the same loop: [`Tuner::restore`] points
//! the trainer at the latest checkpoint and the loop continues from the
//! iteration it recorded.

use std::fmt;
use std::path::PathBuf;

use crate::checkpoint::{Checkpointer, CheckpointerConfig};
use crate::metrics::IterationMetrics;

use super::{EngineError, Trainable};

// ============================================================================
// Configuration
// ============================================================================

/// Errors from tuner configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// A count field that must be positive was zero.
    InvalidCount {
        field: &'static str,
        value: usize,
    },
    /// A field fell outside its allowed range.
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidCount { field, value } => {
                write!(f, "{} must be positive, got {}", field, value)
            }
            Self::OutOfRange {
                field,
                value,
                min,
                max,
            } => write!(
                f,
                "{} must be in [{}, {}], got {}",
                field, min, max, value
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration for a single tuning run.
#[derive(Debug, Clone)]
pub struct TuneConfig {
    /// Name of the experiment; becomes the run directory name.
    pub experiment_name: String,
    /// Root under which run directories are created.
    pub storage_path: PathBuf,
    /// Iteration budget for the run.
    pub training_iterations: usize,
    /// Save a checkpoint every N iterations (0 disables periodic saves).
    pub checkpoint_frequency: usize,
    /// Save a final checkpoint when the budget is reached.
    pub checkpoint_at_end: bool,
    /// How many recent checkpoints to keep.
    pub keep_last_n: usize,
}

impl TuneConfig {
    /// Default cadence: checkpoint every 50 iterations, once more at the
    /// end, keep the last 3.
    pub fn new(
        experiment_name: impl Into<String>,
        storage_path: impl Into<PathBuf>,
        training_iterations: usize,
    ) -> Self {
        Self {
            experiment_name: experiment_name.into(),
            storage_path: storage_path.into(),
            training_iterations,
            checkpoint_frequency: 50,
            checkpoint_at_end: true,
            keep_last_n: 3,
        }
    }

    /// Set the periodic checkpoint frequency.
    pub fn with_checkpoint_frequency(mut self, frequency: usize) -> Self {
        self.checkpoint_frequency = frequency;
        self
    }

    /// Set whether a final checkpoint is written.
    pub fn with_checkpoint_at_end(mut self, at_end: bool) -> Self {
        self.checkpoint_at_end = at_end;
        self
    }

    /// Set the checkpoint retention count.
    pub fn with_keep_last_n(mut self, keep_last_n: usize) -> Self {
        self.keep_last_n = keep_last_n;
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
        Ok(())
    }

    /// Directory this run's checkpoints live in.
    pub fn experiment_path(&self) -> PathBuf {
        self.storage_path.join(&self.experiment_name)
    }
}

// ============================================================================
// Outcome
// ============================================================================

/// What a finished run reports.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    /// Iterations actually executed in this process (excludes iterations
    /// replayed from a checkpoint on resume).
    pub iterations: usize,
    /// Best mean episode reward over the run's iterations.
    pub best_reward_mean: f32,
    /// Best single-episode reward over the run's iterations.
    pub reward_max: f32,
    /// Checkpoint holding the best mean reward, if any was saved.
    pub best_checkpoint: Option<PathBuf>,
}

// ============================================================================
// Tuner
// ============================================================================

/// Drives one trainer through one run.
pub struct Tuner {
    config: TuneConfig,
    checkpointer: Checkpointer,
    start_iteration: usize,
}

impl Tuner {
    /// Start a fresh run.
    pub fn new(config: TuneConfig) -> Result<Self, EngineError> {
        let checkpointer = Checkpointer::new(
            CheckpointerConfig::new(config.experiment_path())
                .with_frequency(config.checkpoint_frequency)
                .with_at_end(config.checkpoint_at_end)
                .with_keep_last_n(config.keep_last_n),
        )?;
        Ok(Self {
            config,
            checkpointer,
            start_iteration: 0,
        })
    }

    /// Resume an interrupted run from its latest checkpoint.
    ///
    /// Restores the trainer's state and positions the iteration counter so
    /// [`fit`](Self::fit) continues where the previous process stopped.
    /// Fails if the run directory holds no checkpoint.
    pub fn restore<T: Trainable>(
        config: TuneConfig,
        trainable: &mut T,
    ) -> Result<Self, EngineError> {
        let mut tuner = Self::new(config)?;
        let latest = tuner
            .checkpointer
            .find_latest()
            .ok_or(EngineError::Checkpoint(
                crate::checkpoint::CheckpointError::NoCheckpoints,
            ))?
            .clone();

        trainable.restore(&latest.path)?;
        tuner.start_iteration = latest.iteration;
        Ok(tuner)
    }

    /// Iteration the next [`fit`](Self::fit) call starts from.
    pub fn start_iteration(&self) -> usize {
        self.start_iteration
    }

    /// Run the trainer until the iteration budget is reached.
    ///
    /// `on_iteration` sees every iteration's metrics; loggers hang off it.
    pub fn fit<T: Trainable, F: FnMut(&IterationMetrics)>(
        &mut self,
        trainable: &mut T,
        mut on_iteration: F,
    ) -> Result<RunOutcome, EngineError> {
        let mut best_reward_mean = f32::NEG_INFINITY;
        let mut reward_max = f32::NEG_INFINITY;
        let mut executed = 0usize;
        let mut last_saved_iteration = None;

        for i in self.start_iteration..self.config.training_iterations {
            let iteration = i + 1;
            let metrics = trainable.train_iteration()?.with_iteration(iteration);
            executed += 1;

            best_reward_mean = best_reward_mean.max(metrics.episode_reward_mean);
            reward_max = reward_max.max(metrics.episode_reward_max);
            on_iteration(&metrics);

            if self.checkpointer.should_save(iteration) {
                self.checkpointer
                    .save_with(iteration, metrics.episode_reward_mean, |path| {
                        trainable
                            .save_checkpoint(path)
                            .map_err(|e| to_checkpoint_error(e))
                    })?;
                last_saved_iteration = Some(iteration);
            }

            if iteration == self.config.training_iterations
                && self.checkpointer.save_at_end()
                && last_saved_iteration != Some(iteration)
            {
                self.checkpointer
                    .save_with(iteration, metrics.episode_reward_mean, |path| {
                        trainable
                            .save_checkpoint(path)
                            .map_err(|e| to_checkpoint_error(e))
                    })?;
            }
        }

        if executed == 0 {
            best_reward_mean = 0.0;
            reward_max = 0.0;
        }

        Ok(RunOutcome {
            iterations: executed,
            best_reward_mean,
            reward_max,
            best_checkpoint: self.checkpointer.best().map(|c| c.path.clone()),
        })
    }
}

fn to_checkpoint_error(e: EngineError) -> crate::checkpoint::CheckpointError {
    match e {
        EngineError::Checkpoint(inner) => inner,
        other => crate::checkpoint::CheckpointError::Record(other.to_string()),
    }
}

// ============================================================================
// Tests
// ============================================================================
