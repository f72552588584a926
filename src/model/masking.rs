//! Validity-mask transform for action logits.
//!
//! A mask is a 0/1 vector with one entry per discrete action. Masking adds
//! `clamp(ln(mask), min = -1e10)` to the raw logits: legal entries (mask 1)
//! get `ln(1) = 0` added and are untouched, illegal entries get a large
//! negative constant that drives their softmax probability to effectively
//! zero without producing `-inf` or NaN.
//!
//! An absent mask is a strict no-op: the logits tensor is returned unchanged,
//! not filtered through a uniform mask. An all-zero mask is degenerate (every
//! action "impossible") and is deliberately not validated here; callers must
//! avoid it.

use burn::tensor::backend::Backend;
use burn::tensor::Tensor;

/// Additive logit floor for masked-out actions.
///
/// Large enough that `softmax` assigns masked entries ~0 probability, small
/// enough to stay finite through downstream arithmetic.
pub const MASKED_LOGIT: f32 = -1e10;

/// Apply an optional validity mask to raw logits.
///
/// `mask` has the same shape as `logits` with entries in {0, 1}. With
/// `None`, the logits are returned unmodified.
pub fn apply_action_mask<B: Backend>(
    logits: Tensor<B, 2>,
    mask: Option<&Tensor<B, 2>>,
) -> Tensor<B, 2> {
    match mask {
        None => logits,
        Some(mask) => {
            let inf_mask = mask.clone().log().clamp_min(MASKED_LOGIT);
            logits + inf_mask
        }
    }
}

/// Build a `[n_envs, n_actions]` mask tensor from a flat 0/1 slice.
pub fn mask_tensor<B: Backend>(
    mask: &[f32],
    n_envs: usize,
    n_actions: usize,
    device: &B::Device,
) -> Tensor<B, 2> {
    Tensor::<B, 1>::from_floats(mask, device).reshape([n_envs, n_actions])
}

/// Optional per-slot validity masks for one batch of decision steps.
///
/// Each mask is a flat row-major `[n_envs * n_actions]` 0/1 vector. `None`
/// means "no restriction" for that slot, and is the default everywhere.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepMasks {
    /// Mask for the first action slot.
    pub a1: Option<Vec<f32>>,
    /// Mask for the second action slot.
    pub a2: Option<Vec<f32>>,
}

impl StepMasks {
    /// No restriction on either slot.
    pub fn none() -> Self {
        Self::default()
    }

    /// Masks for both slots.
    pub fn new(a1: Option<Vec<f32>>, a2: Option<Vec<f32>>) -> Self {
        Self { a1, a2 }
    }

    /// Whether neither slot carries a mask.
    pub fn is_none(&self) -> bool {
        self.a1.is_none() && self.a2.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;
    use burn::tensor::activation::softmax;

    type B = NdArray<f32>;

    #[test]
    fn test_none_mask_is_identity() {
        let device = Default::default();
        let logits: Tensor<B, 2> = Tensor::from_floats([[0.3, -1.2, 2.5]], &device);

        let masked = apply_action_mask(logits.clone(), None);

        let raw = logits.into_data();
        let out = masked.into_data();
        assert_eq!(
            raw.as_slice::<f32>().unwrap(),
            out.as_slice::<f32>().unwrap()
        );
    }

    #[test]
    fn test_masked_entries_get_near_zero_probability() {
        let device = Default::default();
        let logits: Tensor<B, 2> = Tensor::from_floats([[1.0, 5.0, 2.0, 0.5]], &device);
        let mask: Tensor<B, 2> = Tensor::from_floats([[1.0, 0.0, 1.0, 0.0]], &device);

        let masked = apply_action_mask(logits, Some(&mask));
        let probs = softmax(masked, 1).into_data();
        let probs: &[f32] = probs.as_slice().unwrap();

        assert!(probs[1] < 1e-9);
        assert!(probs[3] < 1e-9);
        assert!((probs[0] + probs[2] - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_unmasked_ordering_preserved() {
        let device = Default::default();
        let logits: Tensor<B, 2> = Tensor::from_floats([[0.1, 3.0, 1.5, 2.0]], &device);
        let mask: Tensor<B, 2> = Tensor::from_floats([[1.0, 0.0, 1.0, 1.0]], &device);

        let masked = apply_action_mask(logits.clone(), Some(&mask)).into_data();
        let masked: Vec<f32> = masked.as_slice::<f32>().unwrap().to_vec();
        let raw = logits.into_data();
        let raw: &[f32] = raw.as_slice().unwrap();

        // Legal entries are numerically unchanged, so order is preserved.
        assert_eq!(masked[0], raw[0]);
        assert_eq!(masked[2], raw[2]);
        assert_eq!(masked[3], raw[3]);
        assert!(masked[2] < masked[3]);
    }

    #[test]
    fn test_all_zero_mask_stays_finite() {
        let device = Default::default();
        let logits: Tensor<B, 2> = Tensor::from_floats([[1.0, 2.0]], &device);
        let mask: Tensor<B, 2> = Tensor::from_floats([[0.0, 0.0]], &device);

        // Degenerate input: not validated, but must not produce -inf/NaN.
        let masked = apply_action_mask(logits, Some(&mask)).into_data();
        let masked: &[f32] = masked.as_slice().unwrap();
        assert!(masked.iter().all(|v| v.is_finite()));
    }

    #[test]
    fn test_step_masks_default_is_unrestricted() {
        assert!(StepMasks::none().is_none());
        assert!(!StepMasks::new(Some(vec![1.0, 0.0]), None).is_none());
    }
}
