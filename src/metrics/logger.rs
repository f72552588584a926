//! Sinks for per-iteration metrics.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use super::IterationMetrics;

/// A sink that receives one record per training iteration.
pub trait MetricsLogger: Send {
    /// Record one iteration's metrics.
    fn log(&mut self, metrics: &IterationMetrics);

    /// Flush any buffered output.
    fn flush(&mut self) {}
}

// ============================================================================
// Console
// ============================================================================

/// Prints a compact table row per iteration.
pub struct ConsoleLogger {
    header_printed: bool,
}

impl ConsoleLogger {
    pub fn new() -> Self {
        Self {
            header_printed: false,
        }
    }
}

impl Default for ConsoleLogger {
    fn default() -> Self {
        Self::new()
    }
}

impl MetricsLogger for ConsoleLogger {
    fn log(&mut self, m: &IterationMetrics) {
        if !self.header_printed {
            println!(
                "{:>6} {:>12} {:>9} {:>12} {:>12} {:>10}",
                "iter", "env_steps", "episodes", "rew_mean", "rew_max", "lr"
            );
            self.header_printed = true;
        }
        let lr = m
            .learning_rate
            .map(|lr| format!("{:.2e}", lr))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:>6} {:>12} {:>9} {:>12.3} {:>12.3} {:>10}",
            m.iteration, m.env_steps, m.episodes, m.episode_reward_mean, m.episode_reward_max, lr
        );
    }
}

// ============================================================================
// CSV
// ============================================================================

/// Appends one CSV row per iteration.
pub struct CsvLogger {
    writer: BufWriter<File>,
}

impl CsvLogger {
    /// Create the file (truncating any existing one) and write the header.
    pub fn new(path: &Path) -> io::Result<Self> {
        let mut writer = BufWriter::new(File::create(path)?);
        writeln!(
            writer,
            "iteration,env_steps,episodes,episode_reward_mean,episode_reward_max,\
             policy_loss,value_loss,entropy,learning_rate"
        )?;
        Ok(Self { writer })
    }
}

fn opt_f32(v: Option<f32>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

impl MetricsLogger for CsvLogger {
    fn log(&mut self, m: &IterationMetrics) {
        let row = format!(
            "{},{},{},{},{},{},{},{},{}",
            m.iteration,
            m.env_steps,
            m.episodes,
            m.episode_reward_mean,
            m.episode_reward_max,
            opt_f32(m.policy_loss),
            opt_f32(m.value_loss),
            opt_f32(m.entropy),
            m.learning_rate.map(|x| x.to_string()).unwrap_or_default(),
        );
        if let Err(e) = writeln!(self.writer, "{}", row) {
            log::error!("failed to write metrics row: {}", e);
        }
    }

    fn flush(&mut self) {
        if let Err(e) = self.writer.flush() {
            log::error!("failed to flush metrics file: {}", e);
        }
    }
}

impl Drop for CsvLogger {
    fn drop(&mut self) {
        self.flush();
    }
}

// ============================================================================
// Fan-out
// ============================================================================

/// Forwards every record to several sinks.
pub struct MultiLogger {
    loggers: Vec<Box<dyn MetricsLogger>>,
}

impl MultiLogger {
    pub fn new(loggers: Vec<Box<dyn MetricsLogger>>) -> Self {
        Self { loggers }
    }
}

impl MetricsLogger for MultiLogger {
    fn log(&mut self, metrics: &IterationMetrics) {
        for logger in &mut self.loggers {
            logger.log(metrics);
        }
    }

    fn flush(&mut self) {
        for logger in &mut self.loggers {
            logger.flush();
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
