//! Per-iteration training metrics.

use serde::{Deserialize, Serialize};

/// Everything reported after one training iteration.
///
/// Reward statistics are over episodes completed during the iteration;
/// loss fields are `None` until a trainer fills them in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IterationMetrics {
    /// 1-based training iteration.
    pub iteration: usize,
    /// Cumulative environment steps since training began.
    pub env_steps: usize,
    /// Episodes completed this iteration.
    pub episodes: usize,
    /// Mean episode reward this iteration.
    pub episode_reward_mean: f32,
    /// Best episode reward this iteration.
    pub episode_reward_max: f32,
    /// Policy loss, if the trainer reports one.
    pub policy_loss: Option<f32>,
    /// Value-function loss, if the trainer reports one.
    pub value_loss: Option<f32>,
    /// Mean policy entropy, if the trainer reports one.
    pub entropy: Option<f32>,
    /// Learning rate in effect this iteration.
    pub learning_rate: Option<f64>,
}

impl IterationMetrics {
    /// Metrics with the reward statistics filled in.
    pub fn new(
        env_steps: usize,
        episodes: usize,
        episode_reward_mean: f32,
        episode_reward_max: f32,
    ) -> Self {
        Self {
            env_steps,
            episodes,
            episode_reward_mean,
            episode_reward_max,
            ..Default::default()
        }
    }

    /// Attach loss statistics.
    pub fn with_losses(mut self, policy_loss: f32, value_loss: f32, entropy: f32) -> Self {
        self.policy_loss = Some(policy_loss);
        self.value_loss = Some(value_loss);
        self.entropy = Some(entropy);
        self
    }

    /// Attach the learning rate in effect.
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = Some(lr);
        self
    }

    /// Stamp the iteration number.
    pub fn with_iteration(mut self, iteration: usize) -> Self {
        self.iteration = iteration;
        self
    }
}
