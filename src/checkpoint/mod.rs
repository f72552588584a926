//! Checkpoint management.
//!
//! - [`checkpointer`]: numbered checkpoint files with retention and
//!   best-by-metric tracking, plus Burn module save/load helpers

pub mod checkpointer;

pub use checkpointer::{
    load_module, save_module, CheckpointError, CheckpointInfo, Checkpointer, CheckpointerConfig,
};
