//! Autoregressive two-stage action model and multi-seed training harness,
//! built on [Burn](https://burn.dev).
//!
//! # Architecture
//!
//! ```text
//! ExperimentRunner (per seed: reseed → build trainer → fresh/resume)
//!        │
//!        ▼
//!      Tuner ──── iteration budget, checkpoint cadence, best tracking
//!        │
//!        ▼
//!    Trainable (caller-supplied trainer)
//!        │ uses
//!        ▼
//! AutoregressiveActionModel: obs ─► context ─► a1 logits ─► realized a1
//!                                      │                        │
//!                                      ├─► value                ▼
//!                                      │                   a2 logits
//! ```
//!
//! The model produces two sequentially-dependent discrete actions per step:
//! the second action's distribution is conditioned on the *realized* first
//! action, not just its logits. Optional validity masks knock illegal
//! actions out of either distribution.
//!
//! The harness reproduces the operational loop of a long-running experiment:
//! per-seed runs with global reseeding, periodic checkpoints, resumption
//! after interruption via a sentinel file, and an append-only results file
//! recording each seed's best checkpoint.

pub mod checkpoint;
pub mod engine;
pub mod environment;
pub mod harness;
pub mod metrics;
pub mod model;
pub mod nn;
pub mod policy;
pub mod rollout;
pub mod schedule;
pub mod spaces;

pub use checkpoint::{CheckpointError, Checkpointer, CheckpointerConfig};
pub use engine::{EngineError, RunOutcome, Trainable, TuneConfig, Tuner};
pub use environment::{StepResult, VectorizedEnv};
pub use harness::{ExperimentConfig, ExperimentRunner, ResultsFile, RunMode, SeedResult};
pub use metrics::IterationMetrics;
pub use model::{AutoregressiveActionModel, AutoregressiveModelConfig, StepMasks};
pub use policy::{select_actions, ActionSelection, CategoricalLogits};
pub use rollout::{evaluate, EvalReport};
pub use spaces::{ActionPair, ActionSlots, ActionSpace, SpaceError};
