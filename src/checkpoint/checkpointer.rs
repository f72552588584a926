//! Numbered checkpoints with retention and best-by-metric tracking.
//!
//! Each checkpoint is a directory `checkpoint_{iteration:06}` under the
//! configured root. The checkpointer is model-agnostic: callers pass a
//! closure that writes whatever state they need into the checkpoint
//! directory ([`save_module`] covers the common Burn-module case). Retention
//! caps history at `keep_last_n` checkpoints but never deletes the one
//! holding the best metric seen: when the best is not among the most recent,
//! it occupies one of the retained slots, so it survives cleanup even when
//! training later regresses.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use burn::module::Module;
use burn::record::{BinFileRecorder, FullPrecisionSettings};
use burn::tensor::backend::Backend;

const CHECKPOINT_PREFIX: &str = "checkpoint_";

// ============================================================================
// Errors
// ============================================================================

/// Errors from checkpoint operations.
#[derive(Debug)]
pub enum CheckpointError {
    /// Filesystem failure.
    Io(io::Error),
    /// Serialization or deserialization failure.
    Record(String),
    /// No checkpoint exists where one was required.
    NoCheckpoints,
}

impl fmt::Display for CheckpointError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "checkpoint I/O error: {}", e),
            Self::Record(msg) => write!(f, "checkpoint record error: {}", msg),
            Self::NoCheckpoints => write!(f, "no checkpoints found"),
        }
    }
}

impl std::error::Error for CheckpointError {}

impl From<io::Error> for CheckpointError {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`Checkpointer`].
#[derive(Debug, Clone)]
pub struct CheckpointerConfig {
    /// Root directory for checkpoint subdirectories.
    pub checkpoint_dir: PathBuf,
    /// Save every N iterations (0 disables periodic saves).
    pub frequency: usize,
    /// Always save once more when training finishes.
    pub at_end: bool,
    /// How many recent checkpoints to keep (0 keeps everything).
    pub keep_last_n: usize,
}

impl CheckpointerConfig {
    /// Create a configuration with the default cadence: every 50
    /// iterations, a final save, keep the last 3.
    pub fn new(checkpoint_dir: impl Into<PathBuf>) -> Self {
        Self {
            checkpoint_dir: checkpoint_dir.into(),
            frequency: 50,
            at_end: true,
            keep_last_n: 3,
        }
    }

    /// Set the periodic save frequency.
    pub fn with_frequency(mut self, frequency: usize) -> Self {
        self.frequency = frequency;
        self
    }

    /// Set whether a final checkpoint is written at the end of training.
    pub fn with_at_end(mut self, at_end: bool) -> Self {
        self.at_end = at_end;
        self
    }

    /// Set the retention count.
    pub fn with_keep_last_n(mut self, keep_last_n: usize) -> Self {
        self.keep_last_n = keep_last_n;
        self
    }
}

// ============================================================================
// Checkpointer
// ============================================================================

/// One saved checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointInfo {
    /// Checkpoint directory.
    pub path: PathBuf,
    /// Training iteration it was saved at.
    pub iteration: usize,
    /// Tracked metric (episode reward mean) at save time.
    pub metric: f32,
}

/// Manages a directory of numbered checkpoints.
pub struct Checkpointer {
    config: CheckpointerConfig,
    history: Vec<CheckpointInfo>,
    best: Option<CheckpointInfo>,
}

impl Checkpointer {
    /// Create a checkpointer, creating the root directory if needed and
    /// adopting any checkpoints already present (metrics of adopted
    /// checkpoints are unknown and do not compete for "best").
    pub fn new(config: CheckpointerConfig) -> Result<Self, CheckpointError> {
        fs::create_dir_all(&config.checkpoint_dir)?;
        let history = scan_dir(&config.checkpoint_dir)?;
        Ok(Self {
            config,
            history,
            best: None,
        })
    }

    /// Whether the periodic cadence calls for a save at this iteration.
    pub fn should_save(&self, iteration: usize) -> bool {
        self.config.frequency > 0 && iteration > 0 && iteration % self.config.frequency == 0
    }

    /// Whether a final save is wanted when training finishes.
    pub fn save_at_end(&self) -> bool {
        self.config.at_end
    }

    /// Save a checkpoint at `iteration` with the given tracked metric.
    ///
    /// `write` receives the (created) checkpoint directory and writes the
    /// actual state into it. On success the retention policy is applied.
    pub fn save_with<F>(
        &mut self,
        iteration: usize,
        metric: f32,
        write: F,
    ) -> Result<PathBuf, CheckpointError>
    where
        F: FnOnce(&Path) -> Result<(), CheckpointError>,
    {
        let path = self
            .config
            .checkpoint_dir
            .join(format!("{}{:06}", CHECKPOINT_PREFIX, iteration));
        fs::create_dir_all(&path)?;
        write(&path)?;

        let info = CheckpointInfo {
            path: path.clone(),
            iteration,
            metric,
        };

        let is_best = match &self.best {
            None => true,
            Some(best) => metric > best.metric,
        };
        if is_best {
            self.best = Some(info.clone());
        }

        // Re-saving the same iteration replaces its history entry.
        self.history.retain(|c| c.iteration != iteration);
        self.history.push(info);
        self.history.sort_by_key(|c| c.iteration);

        self.cleanup()?;
        Ok(path)
    }

    /// Most recent checkpoint, if any.
    pub fn find_latest(&self) -> Option<&CheckpointInfo> {
        self.history.last()
    }

    /// Best checkpoint by tracked metric among those saved this run.
    pub fn best(&self) -> Option<&CheckpointInfo> {
        self.best.as_ref()
    }

    /// All known checkpoints, oldest first.
    pub fn list(&self) -> &[CheckpointInfo] {
        &self.history
    }

    fn cleanup(&mut self) -> Result<(), CheckpointError> {
        if self.config.keep_last_n == 0 {
            return Ok(());
        }
        while self.history.len() > self.config.keep_last_n {
            // Oldest first, but never delete the best checkpoint.
            let best_path = self.best.as_ref().map(|b| b.path.clone());
            let victim_idx = self
                .history
                .iter()
                .position(|c| Some(&c.path) != best_path.as_ref());
            match victim_idx {
                Some(idx) => {
                    let victim = self.history.remove(idx);
                    if victim.path.exists() {
                        fs::remove_dir_all(&victim.path)?;
                    }
                }
                // Only the best checkpoint remains protected.
                None => break,
            }
        }
        Ok(())
    }
}

/// Adopt existing `checkpoint_NNNNNN` directories, oldest first.
fn scan_dir(dir: &Path) -> Result<Vec<CheckpointInfo>, CheckpointError> {
    let mut found = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let name = entry.file_name();
        let name = name.to_string_lossy();
        if let Some(digits) = name.strip_prefix(CHECKPOINT_PREFIX) {
            if let Ok(iteration) = digits.parse::<usize>() {
                found.push(CheckpointInfo {
                    path: entry.path(),
                    iteration,
                    metric: f32::NEG_INFINITY,
                });
            }
        }
    }
    found.sort_by_key(|c| c.iteration);
    Ok(found)
}

// ============================================================================
// Burn module helpers
// ============================================================================

/// Save a Burn module's weights into a checkpoint directory.
pub fn save_module<B: Backend, M: Module<B>>(
    module: M,
    checkpoint_dir: &Path,
    name: &str,
) -> Result<(), CheckpointError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    module
        .save_file(checkpoint_dir.join(name), &recorder)
        .map_err(|e| CheckpointError::Record(e.to_string()))
}

/// Load a Burn module's weights from a checkpoint directory.
pub fn load_module<B: Backend, M: Module<B>>(
    module: M,
    checkpoint_dir: &Path,
    name: &str,
    device: &B::Device,
) -> Result<M, CheckpointError> {
    let recorder = BinFileRecorder::<FullPrecisionSettings>::new();
    module
        .load_file(checkpoint_dir.join(name), &recorder, device)
        .map_err(|e| CheckpointError::Record(e.to_string()))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::AutoregressiveModelConfig;
    use crate::spaces::ActionSlots;
    use burn::backend::NdArray;
    use burn::tensor::Tensor;
    use tempfile::TempDir;

    type B = NdArray<f32>;

    fn touch_marker(dir: &Path) -> Result<(), CheckpointError> {
        fs::write(dir.join("state.json"), b"{}")?;
        Ok(())
    }

    #[test]
    fn test_should_save_follows_frequency() {
        let tmp = TempDir::new().unwrap();
        let ckpt =
            Checkpointer::new(CheckpointerConfig::new(tmp.path()).with_frequency(50)).unwrap();

        assert!(!ckpt.should_save(0));
        assert!(!ckpt.should_save(49));
        assert!(ckpt.should_save(50));
        assert!(ckpt.should_save(100));

        let never =
            Checkpointer::new(CheckpointerConfig::new(tmp.path()).with_frequency(0)).unwrap();
        assert!(!never.should_save(50));
    }

    #[test]
    fn test_save_creates_numbered_directory() {
        let tmp = TempDir::new().unwrap();
        let mut ckpt = Checkpointer::new(CheckpointerConfig::new(tmp.path())).unwrap();

        let path = ckpt.save_with(50, 1.5, touch_marker).unwrap();
        assert!(path.ends_with("checkpoint_000050"));
        assert!(path.join("state.json").exists());
        assert_eq!(ckpt.find_latest().unwrap().iteration, 50);
    }

    #[test]
    fn test_retention_keeps_last_n() {
        let tmp = TempDir::new().unwrap();
        let mut ckpt =
            Checkpointer::new(CheckpointerConfig::new(tmp.path()).with_keep_last_n(2)).unwrap();

        for (it, metric) in [(10, 0.1), (20, 0.2), (30, 0.3), (40, 0.4)] {
            ckpt.save_with(it, metric, touch_marker).unwrap();
        }

        let iterations: Vec<usize> = ckpt.list().iter().map(|c| c.iteration).collect();
        assert_eq!(iterations, vec![30, 40]);
        assert!(!tmp.path().join("checkpoint_000010").exists());
        assert!(tmp.path().join("checkpoint_000040").exists());
    }

    #[test]
    fn test_best_checkpoint_survives_cleanup() {
        let tmp = TempDir::new().unwrap();
        let mut ckpt =
            Checkpointer::new(CheckpointerConfig::new(tmp.path()).with_keep_last_n(2)).unwrap();

        // The peak comes early; later checkpoints regress.
        for (it, metric) in [(10, 5.0), (20, 1.0), (30, 1.1), (40, 1.2)] {
            ckpt.save_with(it, metric, touch_marker).unwrap();
        }

        let best = ckpt.best().unwrap();
        assert_eq!(best.iteration, 10);
        assert!(best.path.exists(), "best checkpoint must not be deleted");

        // The best occupies one of the retained slots: total history stays
        // capped at keep_last_n.
        let iterations: Vec<usize> = ckpt.list().iter().map(|c| c.iteration).collect();
        assert_eq!(iterations, vec![10, 40]);
    }

    #[test]
    fn test_adopts_existing_checkpoints() {
        let tmp = TempDir::new().unwrap();
        {
            let mut ckpt = Checkpointer::new(CheckpointerConfig::new(tmp.path())).unwrap();
            ckpt.save_with(50, 1.0, touch_marker).unwrap();
            ckpt.save_with(100, 2.0, touch_marker).unwrap();
        }

        let reopened = Checkpointer::new(CheckpointerConfig::new(tmp.path())).unwrap();
        assert_eq!(reopened.find_latest().unwrap().iteration, 100);
        assert_eq!(reopened.list().len(), 2);
        // Adopted checkpoints carry no metric and are not "best".
        assert!(reopened.best().is_none());
    }

    #[test]
    fn test_module_save_load_round_trip() {
        let tmp = TempDir::new().unwrap();
        let device = Default::default();
        let config = AutoregressiveModelConfig::new(4, 8, ActionSlots::new(3, 3));
        let model = config.init::<B>(&device);

        let obs: Tensor<B, 2> = Tensor::from_floats([[0.1, 0.2, 0.3, 0.4]], &device);
        let before = model
            .action1_logits(model.encode(obs.clone()), None)
            .into_data();

        save_module::<B, _>(model, tmp.path(), "model").unwrap();

        let restored = load_module::<B, _>(config.init::<B>(&device), tmp.path(), "model", &device)
            .unwrap();
        let after = restored.action1_logits(restored.encode(obs), None).into_data();

        assert_eq!(
            before.as_slice::<f32>().unwrap(),
            after.as_slice::<f32>().unwrap()
        );
    }
}
