//! The multi-seed experiment harness.
//!
//! Ties the engine together into the operational loop an experiment
//! actually runs: decide fresh-vs-resume from the interruption sentinel,
//! reseed every RNG for the seed, drive the tuner through the iteration
//! budget, and append the seed's best checkpoint to the results file.
//!
//! - [`resume`]: interruption sentinel and run mode
//! - [`seeding`]: global RNG reseeding
//! - [`results`]: append-only results file of per-seed outcomes
//! - [`runner`]: the per-seed experiment loop

pub mod resume;
pub mod results;
pub mod runner;
pub mod seeding;

pub use resume::RunMode;
pub use results::{ResultsFile, SeedResult};
pub use runner::{ExperimentConfig, ExperimentRunner, HarnessError, SeedOutcome};
pub use seeding::reseed_all;
