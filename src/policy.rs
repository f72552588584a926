//! Action selection for the autoregressive model.
//!
//! [`CategoricalLogits`] wraps one slot's logits batch and provides sampling,
//! greedy selection, log-probabilities and entropy. [`select_actions`] runs
//! the full two-stage selection the training engine performs once per
//! decision step: encode the observations once, realize a1 from its (masked)
//! distribution, feed the realized a1 into the conditioning branch, realize
//! a2 from its (masked) distribution.

use burn::tensor::activation::softmax;
use burn::tensor::backend::Backend;
use burn::tensor::{Int, Tensor};

use crate::model::masking::{mask_tensor, StepMasks};
use crate::model::AutoregressiveActionModel;
use crate::spaces::ActionPair;

/// Stabilizer added to probabilities before taking logs.
const LOG_EPS: f32 = 1e-8;

/// How realized actions are chosen from a distribution.
///
/// Stochastic sampling is used during training rollouts; greedy
/// (max-likelihood) selection at evaluation. The choice belongs to the
/// caller, never to the model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSelection {
    /// Sample from the categorical distribution.
    Stochastic,
    /// Take the highest-probability action.
    Greedy,
}

// ============================================================================
// CategoricalLogits
// ============================================================================

/// Categorical distribution over one action slot, parameterized by logits.
#[derive(Clone)]
pub struct CategoricalLogits<B: Backend> {
    /// Unnormalized log probabilities: [batch, n_actions].
    pub logits: Tensor<B, 2>,
}

impl<B: Backend> CategoricalLogits<B> {
    /// Wrap a logits tensor.
    pub fn new(logits: Tensor<B, 2>) -> Self {
        Self { logits }
    }

    /// Probabilities (softmax of logits).
    pub fn probs(&self) -> Tensor<B, 2> {
        softmax(self.logits.clone(), 1)
    }

    /// Number of actions in this slot.
    pub fn n_actions(&self) -> usize {
        self.logits.dims()[1]
    }

    /// Batch size.
    pub fn batch_size(&self) -> usize {
        self.logits.dims()[0]
    }

    /// Realize one action per batch row.
    ///
    /// Returns `(actions, log_probs)` of the realized actions.
    pub fn select(&self, selection: ActionSelection) -> (Vec<u32>, Vec<f32>) {
        match selection {
            ActionSelection::Stochastic => self.sample(),
            ActionSelection::Greedy => self.greedy(),
        }
    }

    /// Sample actions from the distribution (rollout collection).
    pub fn sample(&self) -> (Vec<u32>, Vec<f32>) {
        let probs = self.probs();
        let probs_data = probs.to_data();
        let probs_slice: &[f32] = probs_data.as_slice().expect("probs slice");

        let batch_size = self.batch_size();
        let n_actions = self.n_actions();

        let mut actions = Vec::with_capacity(batch_size);
        let mut log_probs = Vec::with_capacity(batch_size);

        for i in 0..batch_size {
            // Categorical sampling via cumulative sum. The last action is a
            // fallback for float error where probs don't sum to exactly 1.
            let rand_val = fastrand::f32();
            let mut cumsum = 0.0;
            let mut selected = (n_actions - 1) as u32;

            for a in 0..n_actions {
                cumsum += probs_slice[i * n_actions + a];
                if rand_val < cumsum || a == n_actions - 1 {
                    selected = a as u32;
                    break;
                }
            }

            let prob = probs_slice[i * n_actions + selected as usize];
            actions.push(selected);
            log_probs.push((prob + LOG_EPS).ln());
        }

        (actions, log_probs)
    }

    /// Greedy (max-likelihood) selection for evaluation.
    pub fn greedy(&self) -> (Vec<u32>, Vec<f32>) {
        let probs = self.probs();
        let probs_data = probs.to_data();
        let probs_slice: &[f32] = probs_data.as_slice().expect("probs slice");

        let batch_size = self.batch_size();
        let n_actions = self.n_actions();

        let mut actions = Vec::with_capacity(batch_size);
        let mut log_probs = Vec::with_capacity(batch_size);

        for i in 0..batch_size {
            let row = &probs_slice[i * n_actions..(i + 1) * n_actions];
            let mut best = 0usize;
            for (a, &p) in row.iter().enumerate() {
                if p > row[best] {
                    best = a;
                }
            }
            actions.push(best as u32);
            log_probs.push((row[best] + LOG_EPS).ln());
        }

        (actions, log_probs)
    }

    /// Log probabilities for given actions (with gradient flow).
    pub fn log_prob(&self, actions: &[u32], device: &B::Device) -> Tensor<B, 1> {
        let batch_size = actions.len();
        let probs = self.probs();

        let action_indices: Vec<i32> = actions.iter().map(|&a| a as i32).collect();
        let actions_tensor: Tensor<B, 1, Int> =
            Tensor::from_ints(action_indices.as_slice(), device);
        let actions_2d: Tensor<B, 2, Int> = actions_tensor.reshape([batch_size, 1]);

        let selected = probs.gather(1, actions_2d);
        let selected_1d: Tensor<B, 1> = selected.flatten(0, 1);

        (selected_1d + LOG_EPS).log()
    }

    /// Entropy of each row's distribution (with gradient flow).
    pub fn entropy(&self) -> Tensor<B, 1> {
        let probs = self.probs();
        let log_probs = (probs.clone() + LOG_EPS).log();
        let neg_entropy: Tensor<B, 2> = (probs * log_probs).sum_dim(1);
        -neg_entropy.flatten(0, 1)
    }
}

// ============================================================================
// Two-stage selection
// ============================================================================

/// Run the full autoregressive selection for one batch of observations.
///
/// The context is encoded exactly once and shared between the a1 head and
/// nothing else here; callers needing values should call
/// [`AutoregressiveActionModel::value`] on the same context.
///
/// Returns one `(ActionPair, joint log-prob)` per batch row, where the joint
/// log-prob is `log p(a1) + log p(a2 | a1)`.
pub fn select_actions<B: Backend>(
    model: &AutoregressiveActionModel<B>,
    obs: Tensor<B, 2>,
    masks: &StepMasks,
    selection: ActionSelection,
    device: &B::Device,
) -> (Vec<ActionPair>, Vec<f32>) {
    let n_envs = obs.dims()[0];
    let slots = model.slots();

    let context = model.encode(obs);

    let mask_a1 = masks
        .a1
        .as_ref()
        .map(|m| mask_tensor::<B>(m, n_envs, slots.a1, device));
    let a1_logits = model.action1_logits(context, mask_a1.as_ref());
    let (a1, lp1) = CategoricalLogits::new(a1_logits).select(selection);

    // Condition the second slot on the realized first action.
    let a1_floats: Vec<f32> = a1.iter().map(|&a| a as f32).collect();
    let a1_input = Tensor::<B, 1>::from_floats(a1_floats.as_slice(), device)
        .reshape([n_envs, 1]);

    let mask_a2 = masks
        .a2
        .as_ref()
        .map(|m| mask_tensor::<B>(m, n_envs, slots.a2, device));
    let a2_logits = model.action2_logits(a1_input, mask_a2.as_ref());
    let (a2, lp2) = CategoricalLogits::new(a2_logits).select(selection);

    let pairs = a1
        .into_iter()
        .zip(a2)
        .map(|(a1, a2)| ActionPair::new(a1, a2))
        .collect();
    let log_probs = lp1.into_iter().zip(lp2).map(|(l1, l2)| l1 + l2).collect();

    (pairs, log_probs)
}

// ============================================================================
// Tests
// ============================================================================
