//! Session module - per-user aggregation of the exercise machines
//!
//! Re-exports only. All logic in submodules.

mod counter;
mod exercise;
mod report;
mod store;

pub use counter::{ExerciseCounter, UNKNOWN_STATE};
pub use exercise::Exercise;
pub use report::{ExerciseSummary, FrameReport, FEEDBACK_SEPARATOR};
pub use store::SessionStore;
