//! Learning-rate schedules.
//!
//! Schedules are queried with the cumulative environment-step count, so the
//! decay horizon is expressed in the same units the trainer reports.

/// A learning-rate schedule queried by global step count.
pub trait LRScheduler: Send {
    /// Learning rate at `step`.
    fn lr_at(&self, step: usize) -> f64;
}

/// Fixed learning rate.
#[derive(Debug, Clone)]
pub struct ConstantLR {
    lr: f64,
}

impl ConstantLR {
    pub fn new(lr: f64) -> Self {
        Self { lr }
    }
}

impl LRScheduler for ConstantLR {
    fn lr_at(&self, _step: usize) -> f64 {
        self.lr
    }
}

/// Linear interpolation from `start_lr` to `end_lr` over `total_steps`,
/// holding `end_lr` afterwards.
#[derive(Debug, Clone)]
pub struct LinearDecay {
    start_lr: f64,
    end_lr: f64,
    total_steps: usize,
}

impl LinearDecay {
    pub fn new(start_lr: f64, end_lr: f64, total_steps: usize) -> Self {
        Self {
            start_lr,
            end_lr,
            total_steps,
        }
    }
}

impl LRScheduler for LinearDecay {
    fn lr_at(&self, step: usize) -> f64 {
        if self.total_steps == 0 || step >= self.total_steps {
            return self.end_lr;
        }
        let frac = step as f64 / self.total_steps as f64;
        self.start_lr + (self.end_lr - self.start_lr) * frac
    }
}
