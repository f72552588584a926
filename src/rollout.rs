//! Policy evaluation rollouts.
//!
//! [`evaluate`] runs a trained model against a vectorized environment until a
//! target number of episodes has completed (or a step cap is hit) and reports
//! aggregate reward statistics. It honors whatever validity masks the
//! environment exposes, so masked and unmasked environments evaluate through
//! the same path.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

use crate::environment::VectorizedEnv;
use crate::model::{AutoregressiveActionModel, StepMasks};
use crate::policy::{select_actions, ActionSelection};

/// Aggregate statistics from one evaluation run.
#[derive(Debug, Clone)]
pub struct EvalReport {
    /// Number of completed episodes.
    pub episodes: usize,
    /// Mean total reward over completed episodes.
    pub mean_reward: f32,
    /// Best completed episode's total reward.
    pub max_reward: f32,
    /// Worst completed episode's total reward.
    pub min_reward: f32,
    /// Total environment steps executed (across all copies).
    pub env_steps: usize,
}

/// Roll out the model until `target_episodes` complete.
///
/// `max_env_steps` bounds the total work for environments that may never
/// terminate; the report then covers whatever episodes did complete.
pub fn evaluate<B: Backend, E: VectorizedEnv>(
    model: &AutoregressiveActionModel<B>,
    env: &mut E,
    target_episodes: usize,
    max_env_steps: usize,
    selection: ActionSelection,
    device: &B::Device,
) -> EvalReport {
    let n_envs = env.n_envs();
    let obs_size = env.obs_size();
    let mut obs_buffer = vec![0.0f32; n_envs * obs_size];

    let mut episode_returns = vec![0.0f32; n_envs];
    let mut completed: Vec<f32> = Vec::with_capacity(target_episodes);
    let mut env_steps = 0usize;

    while completed.len() < target_episodes && env_steps < max_env_steps {
        env.write_observations(&mut obs_buffer);
        let obs = Tensor::<B, 1>::from_floats(obs_buffer.as_slice(), device)
            .reshape([n_envs, obs_size]);

        let masks = env.action_masks().unwrap_or_else(StepMasks::none);
        let (actions, _) = select_actions(model, obs, &masks, selection, device);

        let result = env.step(&actions);
        env_steps += n_envs;

        let mut to_reset = Vec::new();
        for i in 0..n_envs {
            episode_returns[i] += result.rewards[i];
            if result.dones[i] {
                completed.push(episode_returns[i]);
                episode_returns[i] = 0.0;
                to_reset.push(i);
            }
        }
        if !to_reset.is_empty() {
            env.reset_envs(&to_reset);
        }
    }

    let episodes = completed.len();
    let (mean, max, min) = if episodes == 0 {
        (0.0, 0.0, 0.0)
    } else {
        let sum: f32 = completed.iter().sum();
        let max = completed.iter().cloned().fold(f32::NEG_INFINITY, f32::max);
        let min = completed.iter().cloned().fold(f32::INFINITY, f32::min);
        (sum / episodes as f32, max, min)
    };

    EvalReport {
        episodes,
        mean_reward: mean,
        max_reward: max,
        min_reward: min,
        env_steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::StepResult;
    use crate::model::AutoregressiveModelConfig;
    use crate::spaces::{ActionPair, ActionSlots};
    use burn::backend::NdArray;

    type B = NdArray<f32>;

    /// Deterministic environment: every episode lasts 4 steps and pays
    /// +1 per step regardless of actions.
    struct FixedEpisodeEnv {
        n_envs: usize,
        step_counts: Vec<usize>,
    }

    impl FixedEpisodeEnv {
        fn new(n_envs: usize) -> Self {
            Self {
                n_envs,
                step_counts: vec![0; n_envs],
            }
        }
    }

    impl VectorizedEnv for FixedEpisodeEnv {
        fn n_envs(&self) -> usize {
            self.n_envs
        }

        fn obs_size(&self) -> usize {
            3
        }

        fn write_observations(&self, buffer: &mut [f32]) {
            for (i, slot) in buffer.iter_mut().enumerate() {
                *slot = (i % 3) as f32 * 0.1;
            }
        }

        fn step(&mut self, actions: &[ActionPair]) -> StepResult {
            assert_eq!(actions.len(), self.n_envs);
            let mut dones = vec![false; self.n_envs];
            for i in 0..self.n_envs {
                self.step_counts[i] += 1;
                if self.step_counts[i] >= 4 {
                    dones[i] = true;
                }
            }
            StepResult {
                rewards: vec![1.0; self.n_envs],
                terminals: dones.clone(),
                dones,
            }
        }

        fn reset_envs(&mut self, env_indices: &[usize]) {
            for &i in env_indices {
                self.step_counts[i] = 0;
            }
        }
    }

    #[test]
    fn test_evaluate_counts_episodes_and_rewards() {
        fastrand::seed(5);
        let device = Default::default();
        let model =
            AutoregressiveModelConfig::new(3, 8, ActionSlots::new(2, 2)).init::<B>(&device);
        let mut env = FixedEpisodeEnv::new(2);

        let report = evaluate(&model, &mut env, 4, 1_000, ActionSelection::Greedy, &device);

        assert_eq!(report.episodes, 4);
        // Every episode is exactly 4 steps of +1.
        assert!((report.mean_reward - 4.0).abs() < 1e-6);
        assert!((report.max_reward - 4.0).abs() < 1e-6);
        assert!((report.min_reward - 4.0).abs() < 1e-6);
        assert_eq!(report.env_steps, 16);
    }

    #[test]
    fn test_evaluate_respects_step_cap() {
        fastrand::seed(5);
        let device = Default::default();
        let model =
            AutoregressiveModelConfig::new(3, 8, ActionSlots::new(2, 2)).init::<B>(&device);
        let mut env = FixedEpisodeEnv::new(2);

        // Cap well below what 10 episodes would need.
        let report = evaluate(&model, &mut env, 10, 6, ActionSelection::Stochastic, &device);
        assert!(report.env_steps <= 8);
        assert!(report.episodes < 10);
    }

    #[test]
    fn test_evaluate_no_completed_episodes() {
        fastrand::seed(5);
        let device = Default::default();
        let model =
            AutoregressiveModelConfig::new(3, 8, ActionSlots::new(2, 2)).init::<B>(&device);
        let mut env = FixedEpisodeEnv::new(1);

        let report = evaluate(&model, &mut env, 5, 2, ActionSelection::Greedy, &device);
        assert_eq!(report.episodes, 0);
        assert_eq!(report.mean_reward, 0.0);
    }
}
