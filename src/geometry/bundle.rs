//! Per-frame angle bundle
//!
//! Every measure the exercise trackers read, computed once per frame from the
//! raw pose. Never stored between frames.

use serde::Serialize;

use super::measures::{
    average_knee_angle, bicep_angle, elbow_bend, elbow_torso, hip_fold, hip_shoulder_lean,
    hip_tilt, knee_angle, mean_available, shoulder_flexion, wrist_tucked, ElbowTorso,
};
use super::visibility::VisibilityGate;
use crate::config::GeometryThresholds;
use crate::pose::{Bilateral, Pose, Side};

/// Snapshot of derived angles for one frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct AngleBundle {
    /// Elbow flexion for curls (shoulder-elbow-wrist)
    pub bicep: Bilateral<Option<f32>>,
    pub elbow_torso: ElbowTorso,
    /// Torso lean from vertical, left side preferred
    pub hip_shoulder_lean: Option<f32>,
    pub knee: Bilateral<Option<f32>>,
    pub knee_average: Option<f32>,
    /// Torso lean averaged over the visible sides
    pub back_angle: Option<f32>,
    pub shoulder_flexion: Bilateral<Option<f32>>,
    /// Elbow straightness (dot-product formula)
    pub elbow_bend: Bilateral<Option<f32>>,
    pub wrist_tucked: Bilateral<Option<bool>>,
    /// Trunk-thigh angle averaged over the visible sides
    pub hip_fold: Option<f32>,
    pub hip_tilt: Option<f32>,
}

impl AngleBundle {
    pub fn compute(pose: &Pose, config: &GeometryThresholds) -> Self {
        let gate = VisibilityGate::new(config.visibility);
        let lean = Bilateral::from_fn(|side| hip_shoulder_lean(pose, side, &gate));

        Self {
            bicep: Bilateral::from_fn(|side| bicep_angle(pose, side, &gate)),
            elbow_torso: elbow_torso(pose, &gate),
            hip_shoulder_lean: lean.left.or(lean.right),
            knee: Bilateral::from_fn(|side| knee_angle(pose, side, &gate)),
            knee_average: average_knee_angle(pose, &gate),
            back_angle: mean_available(lean.left, lean.right),
            shoulder_flexion: Bilateral::from_fn(|side| shoulder_flexion(pose, side, &gate)),
            elbow_bend: Bilateral::from_fn(|side| elbow_bend(pose, side, &gate)),
            wrist_tucked: Bilateral::from_fn(|side| {
                wrist_tucked(pose, side, &gate, config.wrist_tuck_margin)
            }),
            hip_fold: mean_available(
                hip_fold(pose, Side::Left, &gate),
                hip_fold(pose, Side::Right, &gate),
            ),
            hip_tilt: hip_tilt(pose, &gate),
        }
    }
}
