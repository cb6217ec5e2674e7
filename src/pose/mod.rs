//! Pose module - landmark frames from the pose model
//!
//! Re-exports only. All logic in submodules.

mod landmarks;

pub use landmarks::{Bilateral, Joint, Landmark, Pose, Side, LANDMARK_COUNT, VALUES_PER_LANDMARK};
