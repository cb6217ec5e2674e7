//! Common surface of the exercise trackers
//!
//! Each tracker consumes its own frame type, so `update` is not part of the
//! trait; everything the session reads back after a frame is.

use crate::feedback::Cue;

pub trait RepTracker {
    /// Display name of the current state (e.g. "SQUAT_DOWN")
    fn state_name(&self) -> &'static str;

    /// Validated repetitions
    fn reps(&self) -> u32;

    /// Completed cycles that failed a critical check
    fn rejected(&self) -> u32;

    /// Real-time feedback for the rep in progress; empty once a rep summary
    /// has been frozen
    fn live_feedback(&self) -> Vec<Cue>;

    /// Summary of a cycle completed on the last frame, taken at most once
    fn take_rep_summary(&mut self) -> Option<Vec<Cue>>;

    /// Instruction for the current state when there is nothing to correct
    fn guidance(&self) -> Cue;

    /// Which limb (or limb pair) drives the tracker right now
    fn active_side(&self) -> Option<&'static str>;

    /// Back to the initial state, counters included
    fn reset(&mut self);
}
