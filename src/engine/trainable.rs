//! The trainer-side contract of the tuning engine.

use std::fmt;
use std::path::Path;

use crate::checkpoint::CheckpointError;
use crate::metrics::IterationMetrics;

/// Errors surfaced by the engine or by a trainer it drives.
#[derive(Debug)]
pub enum EngineError {
    /// A training iteration failed inside the trainer.
    Trial(String),
    /// Checkpoint save or restore failed.
    Checkpoint(CheckpointError),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trial(msg) => write!(f, "training iteration failed: {}", msg),
            Self::Checkpoint(e) => write!(f, "checkpoint error: {}", e),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<CheckpointError> for EngineError {
    fn from(e: CheckpointError) -> Self {
        Self::Checkpoint(e)
    }
}

/// A trainer the [`Tuner`](super::Tuner) can drive iteration by iteration.
///
/// One `train_iteration` call is one unit of work: collect experience,
/// update the model, report metrics. The trainer owns its model, optimizer
/// and environments; the engine owns the iteration budget and the
/// checkpoint cadence.
pub trait Trainable {
    /// Run one training iteration and report its metrics.
    fn train_iteration(&mut self) -> Result<IterationMetrics, EngineError>;

    /// Write all state needed to resume into `path` (an existing directory).
    fn save_checkpoint(&mut self, path: &Path) -> Result<(), EngineError>;

    /// Restore all state from a checkpoint directory.
    fn restore(&mut self, path: &Path) -> Result<(), EngineError>;
}
