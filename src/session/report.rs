//! What the session hands back to the caller

use serde::Serialize;

use super::exercise::Exercise;
use crate::feedback::Cue;

/// Separator for the single-line feedback text
pub const FEEDBACK_SEPARATOR: &str = ", ";

/// Result of one processed frame
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FrameReport {
    /// Exercise name as requested
    pub exercise: String,
    /// State of the dispatched machine, "UNKNOWN" for an unrecognized name
    pub state: &'static str,
    pub squat_count: u32,
    pub curl_count: u32,
    pub shoulder_flexion_count: u32,
    pub knee_raise_count: u32,
    pub total_reps: u32,
    pub squat_state: &'static str,
    pub curl_state: &'static str,
    pub shoulder_flexion_state: &'static str,
    pub knee_raise_state: &'static str,
    /// Limb or limb pair driving the dispatched machine
    pub active_side: Option<&'static str>,
    pub cues: Vec<Cue>,
    pub feedback: Vec<String>,
    pub feedback_text: String,
    /// The dispatched exercise's count went up on this frame
    pub rep_completed: bool,
}

/// Per-exercise totals for the workout log
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ExerciseSummary {
    pub exercise: Exercise,
    pub reps: u32,
    /// Completed cycles that failed a critical check
    pub rejected: u32,
    /// Percentage of completed cycles that counted
    pub accuracy: f32,
}

impl ExerciseSummary {
    pub fn new(exercise: Exercise, reps: u32, rejected: u32) -> Self {
        let cycles = reps + rejected;
        let accuracy = if cycles == 0 {
            0.0
        } else {
            100.0 * reps as f32 / cycles as f32
        };
        Self {
            exercise,
            reps,
            rejected,
            accuracy,
        }
    }
}
