//! Neural network building blocks for the action model.
//!
//! - [`normc`]: Dense layer with column-normalized Gaussian initialization,
//!   the initialization scheme the action model uses for every layer.

pub mod normc;

pub use normc::{normc_weights, NormcLinear, NormcLinearConfig};
