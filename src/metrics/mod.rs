//! Training metrics and logging sinks.
//!
//! - [`iteration`]: the per-iteration metrics record
//! - [`logger`]: console, CSV and fan-out sinks for metric records

pub mod iteration;
pub mod logger;

pub use iteration::IterationMetrics;
pub use logger::{ConsoleLogger, CsvLogger, MetricsLogger, MultiLogger};
