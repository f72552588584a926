//! The autoregressive masked action model.
//!
//! - [`masking`]: validity-mask transform applied to raw logits
//! - [`autoregressive`]: the two-stage action model (encode → a1 → a2, value)

pub mod autoregressive;
pub mod masking;

pub use autoregressive::{AutoregressiveActionModel, AutoregressiveModelConfig};
pub use masking::{apply_action_mask, mask_tensor, StepMasks, MASKED_LOGIT};
