//! Geometry kernel - joint angles, distances, visibility gating
//!
//! Re-exports only. All logic in submodules.

mod angles;
mod bundle;
mod measures;
mod visibility;

pub use angles::{angle_at, angle_deg, distance, fold_half_turn, vertical_angle};
pub use bundle::AngleBundle;
pub use measures::{
    average_knee_angle, bicep_angle, elbow_bend, elbow_torso, hip_fold, hip_shoulder_lean,
    hip_tilt, knee_angle, mean_available, shoulder_flexion, wrist_tucked, BodyView, ElbowTorso,
};
pub use visibility::{VisibilityGate, DEFAULT_VISIBILITY};
