//! Iteration-driven training engine.
//!
//! - [`trainable`]: the trait a trainer implements to be driven by the tuner
//! - [`tuner`]: iteration budget, checkpoint cadence and best-result tracking

pub mod trainable;
pub mod tuner;

pub use trainable::{EngineError, Trainable};
pub use tuner::{ConfigError, RunOutcome, TuneConfig, Tuner};
