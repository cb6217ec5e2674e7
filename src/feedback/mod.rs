//! Feedback module - coaching cues and the prioritizer
//!
//! Re-exports only. All logic in submodules.

mod cues;
mod manager;

pub use cues::{Catalog, Cue, Priority};
pub use manager::{FeedbackItem, FeedbackManager, DEFAULT_WINDOW, SUMMARY_LEN};
