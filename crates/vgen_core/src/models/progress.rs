//! Progress events reported during generation.

use std::sync::Arc;

use serde::Serialize;

/// Callback receiving progress events.
///
/// Invoked synchronously on the task reading child output, so it must
/// return quickly.
pub type ProgressSink = dyn for<'e> Fn(&'e ProgressEvent) + Send + Sync;

/// Shared progress observer.
pub type ProgressListener = Arc<ProgressSink>;

/// Normalized progress derived from one line of child process output.
///
/// `total_steps == 0` means the total is unknown.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub current_step: u32,
    pub total_steps: u32,
    pub message: String,
}

impl ProgressEvent {
    pub fn new(current_step: u32, total_steps: u32, message: impl Into<String>) -> Self {
        Self {
            current_step,
            total_steps,
            message: message.into(),
        }
    }

    /// Completion percentage, or 0 when the total is unknown.
    ///
    /// Not clamped: an estimated step may exceed the total.
    pub fn percentage(&self) -> f64 {
        if self.total_steps > 0 {
            f64::from(self.current_step) / f64::from(self.total_steps) * 100.0
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_uses_step_ratio() {
        let event = ProgressEvent::new(12, 50, "Denoising");
        assert!((event.percentage() - 24.0).abs() < 1e-9);
    }

    #[test]
    fn unknown_total_is_zero_percent() {
        let event = ProgressEvent::new(7, 0, "Loading model");
        assert_eq!(event.percentage(), 0.0);
    }
}
