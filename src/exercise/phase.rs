//! Phase timing and rep validity
//!
//! Shared by every tracker: a timer for the phase in progress, the timing
//! gate that judges a finished phase, and the latch that carries a critical
//! check's verdict to the end of the rep.

use crate::config::TimingThresholds;
use crate::feedback::{Cue, FeedbackManager, Priority};

/// Time since a phase began, from caller-supplied frame timestamps
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct PhaseTimer {
    entered_at: Option<f64>,
}

impl PhaseTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the start of a phase
    pub fn enter(&mut self, now: f64) {
        self.entered_at = Some(now);
    }

    pub fn entered_at(&self) -> Option<f64> {
        self.entered_at
    }

    /// Seconds since `enter`, if the phase has started
    pub fn elapsed(&self, now: f64) -> Option<f64> {
        self.entered_at.map(|start| (now - start).max(0.0))
    }

    pub fn clear(&mut self) {
        self.entered_at = None;
    }
}

/// Verdict on a finished phase
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PhaseVerdict {
    Ok,
    TooFast,
    TooSlow,
}

pub fn judge_phase(duration: f64, timing: &TimingThresholds) -> PhaseVerdict {
    if duration < timing.min_phase_secs {
        PhaseVerdict::TooFast
    } else if timing.max_phase_secs.is_some_and(|max| duration > max) {
        PhaseVerdict::TooSlow
    } else {
        PhaseVerdict::Ok
    }
}

/// Judge a phase, raising the HIGH cue on failure
///
/// Returns false when the rep must not count.
pub fn check_phase(duration: f64, timing: &TimingThresholds, feedback: &mut FeedbackManager) -> bool {
    match judge_phase(duration, timing) {
        PhaseVerdict::Ok => true,
        PhaseVerdict::TooFast => {
            feedback.add(Cue::TooFast, Priority::High);
            false
        }
        PhaseVerdict::TooSlow => {
            feedback.add(Cue::TooSlow, Priority::High);
            false
        }
    }
}

/// A critical check's verdict for the rep in progress
///
/// Starts valid at the beginning of a cycle and can only be failed until the
/// next `reset`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Latch {
    valid: bool,
}

impl Latch {
    pub fn new() -> Self {
        Self { valid: true }
    }

    pub fn fail(&mut self) {
        self.valid = false;
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }

    pub fn reset(&mut self) {
        self.valid = true;
    }
}

impl Default for Latch {
    fn default() -> Self {
        Self::new()
    }
}
