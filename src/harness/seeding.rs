//! Global RNG reseeding.

use burn::tensor::backend::Backend;

/// Reseed every source of randomness the training stack draws from.
///
/// Covers the backend's tensor RNG (weight initialization) and the
/// `fastrand` generator used for action sampling. Called once per seed at
/// the top of the experiment loop, before any model is built, so runs with
/// the same seed are reproducible end to end.
pub fn reseed_all<B: Backend>(device: &B::Device, seed: u64) {
    B::seed(device, seed);
    fastrand::seed(seed);
}
