//! Vectorized environment interface.
//!
//! The trainer drives `n_envs` environment copies in lockstep: one
//! [`VectorizedEnv::step`] call advances every copy by one decision step with
//! its own action pair. Observations are written into a caller-provided flat
//! buffer to avoid per-step allocation.

use crate::model::StepMasks;
use crate::spaces::ActionPair;

/// Result of stepping every environment copy once.
#[derive(Debug, Clone)]
pub struct StepResult {
    /// Per-env reward for this step.
    pub rewards: Vec<f32>,
    /// Per-env episode-over flag (terminal or truncated).
    pub dones: Vec<bool>,
    /// Per-env true-terminal flag (subset of `dones`; excludes truncation).
    pub terminals: Vec<bool>,
}

/// A batch of environment copies stepped in lockstep.
pub trait VectorizedEnv: Send {
    /// Number of environment copies.
    fn n_envs(&self) -> usize;

    /// Length of one observation vector.
    fn obs_size(&self) -> usize;

    /// Write current observations into `buffer`, row-major
    /// `[n_envs * obs_size]`.
    fn write_observations(&self, buffer: &mut [f32]);

    /// Per-slot action validity masks for the current step, or `None` when
    /// every action is legal.
    ///
    /// The masking path is fully supported end to end, but no environment in
    /// this crate currently restricts actions, so the default of `None` is
    /// what runs in practice.
    fn action_masks(&self) -> Option<StepMasks> {
        None
    }

    /// Advance every copy by one step with its action pair.
    ///
    /// `actions.len()` must equal `n_envs()`.
    fn step(&mut self, actions: &[ActionPair]) -> StepResult;

    /// Reset the listed environment copies (after their episodes end).
    fn reset_envs(&mut self, env_indices: &[usize]);
}
