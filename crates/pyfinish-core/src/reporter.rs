//! Reporter trait for dependency injection
//!
//! This trait allows the driver to report progress and status without
//! being coupled to a specific console implementation.

use crate::driver::Step;
use tracing::{error, info, warn};

pub trait Reporter {
    /// A step of the driver sequence is starting.
    fn step(&self, step: Step);

    /// A step was skipped because it does not apply (platform, existing state).
    fn skipped(&self, step: Step, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// The run stopped at `step`.
    fn failed(&self, step: Step, reason: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn step(&self, step: Step) {
        (**self).step(step);
    }
    fn skipped(&self, step: Step, reason: &str) {
        (**self).skipped(step, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn failed(&self, step: Step, reason: &str) {
        (**self).failed(step, reason);
    }
}

impl<T: Reporter + ?Sized> Reporter for &T {
    fn step(&self, step: Step) {
        (**self).step(step);
    }
    fn skipped(&self, step: Step, reason: &str) {
        (**self).skipped(step, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn failed(&self, step: Step, reason: &str) {
        (**self).failed(step, reason);
    }
}

/// A no-op reporter for silent operations (e.g., testing).
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn step(&self, _: Step) {}
    fn skipped(&self, _: Step, _: &str) {}
    fn info(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn failed(&self, _: Step, _: &str) {}
}

/// Forwards everything to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingReporter;

impl Reporter for TracingReporter {
    fn step(&self, step: Step) {
        info!(step = %step, "Starting");
    }
    fn skipped(&self, step: Step, reason: &str) {
        info!(step = %step, "Skipped: {reason}");
    }
    fn info(&self, msg: &str) {
        info!("{msg}");
    }
    fn warning(&self, msg: &str) {
        warn!("{msg}");
    }
    fn failed(&self, step: Step, reason: &str) {
        error!(step = %step, "{reason}");
    }
}
