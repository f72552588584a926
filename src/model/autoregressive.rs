//! Autoregressive two-stage action model with optional validity masks.
//!
//! The model maps an observation to two sequentially-dependent discrete
//! action distributions plus a scalar value estimate:
//!
//! ```text
//! observation ──► context (tanh dense)
//!                   │
//!                   ├──► a1 logits (linear, + mask_a1)
//!                   │         │ realized a1 (sampled or greedy, caller's choice)
//!                   │         ▼
//!                   │    a2 hidden (ReLU dense) ──► a2 logits (linear, + mask_a2)
//!                   │
//!                   └──► value (linear, scalar)
//! ```
//!
//! Every entry point is a pure function of its explicit inputs and the fixed
//! learned weights: the model holds no cached context and no notion of which
//! decision step it is on. `action2_logits` must be invoked after a1 has been
//! realized for the step, since its input *is* the realized a1.
//!
//! Masks default to "no restriction" (`None`) and the masking step is skipped
//! entirely in that case.

use burn::module::Module;
use burn::prelude::*;
use burn::tensor::activation::{relu, tanh};

use crate::model::masking::apply_action_mask;
use crate::nn::{NormcLinear, NormcLinearConfig};
use crate::spaces::{ActionSlots, ActionSpace, SpaceError};

/// Initialization scale for hidden layers.
const HIDDEN_STD: f64 = 1.0;
/// Initialization scale for logit and value heads; keeps the initial policy
/// near uniform and the initial value near zero.
const HEAD_STD: f64 = 0.01;

// ============================================================================
// Configuration
// ============================================================================

/// Configuration for [`AutoregressiveActionModel`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoregressiveModelConfig {
    /// Length of the observation feature vector.
    pub obs_size: usize,
    /// Size of the context encoding.
    pub context_size: usize,
    /// Cardinalities of the two discrete action slots.
    pub slots: ActionSlots,
}

impl AutoregressiveModelConfig {
    /// Create a configuration from already-validated slots.
    pub fn new(obs_size: usize, context_size: usize, slots: ActionSlots) -> Self {
        Self {
            obs_size,
            context_size,
            slots,
        }
    }

    /// Create a configuration from an action-space description.
    ///
    /// Rejects anything other than a tuple of exactly two discrete slots.
    /// This is the fatal, no-retry configuration check.
    pub fn for_space(
        obs_size: usize,
        context_size: usize,
        space: &ActionSpace,
    ) -> Result<Self, SpaceError> {
        let slots = ActionSlots::from_space(space)?;
        Ok(Self::new(obs_size, context_size, slots))
    }

    /// Hidden size of the a2 conditioning branch.
    pub fn hidden_size(&self) -> usize {
        (self.context_size / 2).max(1)
    }

    /// Initialize the model.
    pub fn init<B: Backend>(&self, device: &B::Device) -> AutoregressiveActionModel<B> {
        AutoregressiveActionModel {
            context: NormcLinearConfig::new(self.obs_size, self.context_size)
                .with_std(HIDDEN_STD)
                .init(device),
            a1_head: NormcLinearConfig::new(self.context_size, self.slots.a1)
                .with_std(HEAD_STD)
                .init(device),
            a2_hidden: NormcLinearConfig::new(1, self.hidden_size())
                .with_std(HIDDEN_STD)
                .init(device),
            a2_head: NormcLinearConfig::new(self.hidden_size(), self.slots.a2)
                .with_std(HEAD_STD)
                .init(device),
            value_head: NormcLinearConfig::new(self.context_size, 1)
                .with_std(HEAD_STD)
                .init(device),
            slots_a1: self.slots.a1,
            slots_a2: self.slots.a2,
            obs_size: self.obs_size,
            context_size: self.context_size,
        }
    }
}

// ============================================================================
// Model
// ============================================================================

/// Feed-forward autoregressive action model.
///
/// See the module docs for the dataflow. The struct is a plain Burn module:
/// cloning is cheap (tensors are reference counted) and the model is safe to
/// treat as a pure function of its inputs.
#[derive(Module, Debug)]
pub struct AutoregressiveActionModel<B: Backend> {
    /// Observation → context encoder (tanh).
    context: NormcLinear<B>,
    /// Context → a1 logits.
    a1_head: NormcLinear<B>,
    /// Realized a1 → hidden representation (ReLU).
    a2_hidden: NormcLinear<B>,
    /// Hidden representation → a2 logits.
    a2_head: NormcLinear<B>,
    /// Context → scalar value estimate.
    value_head: NormcLinear<B>,
    #[module(skip)]
    slots_a1: usize,
    #[module(skip)]
    slots_a2: usize,
    #[module(skip)]
    obs_size: usize,
    #[module(skip)]
    context_size: usize,
}

impl<B: Backend> AutoregressiveActionModel<B> {
    /// Cardinalities of the two action slots.
    pub fn slots(&self) -> ActionSlots {
        ActionSlots::new(self.slots_a1, self.slots_a2)
    }

    /// Expected observation size.
    pub fn obs_size(&self) -> usize {
        self.obs_size
    }

    /// Size of the context encoding.
    pub fn context_size(&self) -> usize {
        self.context_size
    }

    /// Encode a batch of observations into context vectors.
    ///
    /// `obs` is `[batch, obs_size]`; the result is `[batch, context_size]`.
    /// Called once per decision step; both the a1 head and the value head
    /// consume the same context.
    pub fn encode(&self, obs: Tensor<B, 2>) -> Tensor<B, 2> {
        tanh(self.context.forward(obs))
    }

    /// Logits for the first action slot, `[batch, slots.a1]`.
    ///
    /// If a mask is supplied it is folded into the logits so that masked-out
    /// entries receive effectively zero probability under softmax.
    pub fn action1_logits(
        &self,
        context: Tensor<B, 2>,
        mask: Option<&Tensor<B, 2>>,
    ) -> Tensor<B, 2> {
        apply_action_mask(self.a1_head.forward(context), mask)
    }

    /// Logits for the second action slot, `[batch, slots.a2]`.
    ///
    /// `a1_input` is the realized first action as a `[batch, 1]` float
    /// tensor (sampled during training, max-likelihood at evaluation; that
    /// policy belongs to the caller). Must be invoked after a1 is realized
    /// for the step.
    pub fn action2_logits(
        &self,
        a1_input: Tensor<B, 2>,
        mask: Option<&Tensor<B, 2>>,
    ) -> Tensor<B, 2> {
        let hidden = relu(self.a2_hidden.forward(a1_input));
        apply_action_mask(self.a2_head.forward(hidden), mask)
    }

    /// Scalar value estimate from the context, `[batch, 1]`.
    pub fn value(&self, context: Tensor<B, 2>) -> Tensor<B, 2> {
        self.value_head.forward(context)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::activation::softmax;

    type B = NdArray<f32>;

    fn test_model(device: &<B as Backend>::Device) -> AutoregressiveActionModel<B> {
        AutoregressiveModelConfig::new(8, 32, ActionSlots::new(3, 3)).init(device)
    }

    #[test]
    fn test_rejects_malformed_space_at_construction() {
        let space = ActionSpace::Discrete { n: 4 };
        assert!(AutoregressiveModelConfig::for_space(8, 32, &space).is_err());

        let space = ActionSpace::pair(4);
        let config = AutoregressiveModelConfig::for_space(8, 32, &space).unwrap();
        assert_eq!(config.slots, ActionSlots::new(4, 4));
    }

    #[test]
    fn test_encode_dims_match_context_size() {
        let device = Default::default();
        let model = test_model(&device);

        let obs = Tensor::<B, 2>::zeros([5, 8], &device);
        let context = model.encode(obs);
        assert_eq!(context.dims(), [5, 32]);
    }

    #[test]
    fn test_value_is_scalar_per_row() {
        let device = Default::default();
        let model = test_model(&device);

        let obs = Tensor::<B, 2>::zeros([5, 8], &device);
        let values = model.value(model.encode(obs));
        assert_eq!(values.dims(), [5, 1]);
    }

    #[test]
    fn test_a2_dims_independent_of_a1_value() {
        let device = Default::default();
        let model =
            AutoregressiveModelConfig::new(8, 32, ActionSlots::new(3, 5)).init(&device);

        for a1 in [0.0f32, 1.0, 2.0] {
            let a1_input: Tensor<B, 2> = Tensor::from_floats([[a1], [a1]], &device);
            let logits = model.action2_logits(a1_input, None);
            assert_eq!(logits.dims(), [2, 5]);
        }
    }

    #[test]
    fn test_forward_is_deterministic() {
        let device = Default::default();
        let model = test_model(&device);

        let obs: Tensor<B, 2> =
            Tensor::from_floats([[0.1, -0.2, 0.3, 0.0, 1.0, -1.0, 0.5, 0.25]], &device);

        let ctx_a = model.encode(obs.clone());
        let ctx_b = model.encode(obs);
        let a1_a = model.action1_logits(ctx_a.clone(), None).into_data();
        let a1_b = model.action1_logits(ctx_b.clone(), None).into_data();
        let v_a = model.value(ctx_a).into_data();
        let v_b = model.value(ctx_b).into_data();

        assert_eq!(
            a1_a.as_slice::<f32>().unwrap(),
            a1_b.as_slice::<f32>().unwrap()
        );
        assert_eq!(
            v_a.as_slice::<f32>().unwrap(),
            v_b.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_masked_a1_end_to_end() {
        let device = Default::default();
        let model = test_model(&device);

        let obs: Tensor<B, 2> =
            Tensor::from_floats([[0.1, -0.2, 0.3, 0.0, 1.0, -1.0, 0.5, 0.25]], &device);
        let mask: Tensor<B, 2> = Tensor::from_floats([[1.0, 0.0, 1.0]], &device);

        let context = model.encode(obs);
        let logits = model.action1_logits(context, Some(&mask));
        let probs = softmax(logits, 1).into_data();
        let probs: &[f32] = probs.as_slice().unwrap();

        assert!(probs[1] < 1e-6);
        assert!((probs[0] + probs[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_no_mask_matches_masked_with_none() {
        let device = Default::default();
        let model = test_model(&device);

        let obs: Tensor<B, 2> =
            Tensor::from_floats([[0.5, 0.5, -0.5, 0.0, 0.1, 0.2, 0.3, 0.4]], &device);
        let context = model.encode(obs);

        let raw = model.a1_head.forward(context.clone()).into_data();
        let unmasked = model.action1_logits(context, None).into_data();
        assert_eq!(
            raw.as_slice::<f32>().unwrap(),
            unmasked.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_slots_reported_from_initialized_model() {
        let device = Default::default();
        let model =
            AutoregressiveModelConfig::new(8, 32, ActionSlots::new(3, 5)).init::<B>(&device);

        assert_eq!(model.slots(), ActionSlots::new(3, 5));
        assert_eq!(model.obs_size(), 8);
        assert_eq!(model.context_size(), 32);
    }

    #[test]
    fn test_hidden_size_is_half_context() {
        let config = AutoregressiveModelConfig::new(8, 32, ActionSlots::new(3, 3));
        assert_eq!(config.hidden_size(), 16);

        // Degenerate context sizes still produce a usable hidden layer.
        let tiny = AutoregressiveModelConfig::new(8, 1, ActionSlots::new(3, 3));
        assert_eq!(tiny.hidden_size(), 1);
    }
}
