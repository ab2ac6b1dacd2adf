//! Status text to estimated progress.
//!
//! The script does not always print step counts, so `STATUS:` lines are
//! mapped onto a step scale of `total + PHASE_SLOTS`. The three extra slots
//! cover model load, preparation and start of generation; denoising steps
//! follow them and saving fills the final slot.

use once_cell::sync::Lazy;
use regex::Regex;

/// Extra denominator slots reserved for load, prepare and start phases.
pub const PHASE_SLOTS: u32 = 3;

static STEP_FRACTION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\bstep\s+(\d+)\s*/\s*(\d+)").expect("valid regex"));

/// Estimate `(current, total)` from a status message.
///
/// Approximate on purpose: the midpoint guess for denoising without a step
/// fraction can move backwards relative to an earlier explicit step.
pub fn estimate_from_status(status: &str, total_steps: u32) -> (u32, u32) {
    let total = total_steps.saturating_add(PHASE_SLOTS);
    let lower = status.to_lowercase();

    let current = if lower.contains("loading model") {
        1
    } else if lower.contains("model loaded") || lower.contains("preparing") {
        2
    } else if lower.contains("starting") && lower.contains("generation") {
        3
    } else if lower.contains("generating") || lower.contains("denoising") {
        match step_fraction(status) {
            Some(step) => step.saturating_add(PHASE_SLOTS),
            None => total_steps / 2 + PHASE_SLOTS,
        }
    } else if lower.contains("saving") || lower.contains("completed") {
        total
    } else {
        0
    };

    (current, total)
}

fn step_fraction(status: &str) -> Option<u32> {
    let captures = STEP_FRACTION.captures(status)?;
    captures.get(1)?.as_str().parse().ok()
}
