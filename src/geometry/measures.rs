//! Visibility-gated body measures
//!
//! Each measure decides on its own whether the joints it needs are visible
//! and returns `None` otherwise. Callers never pre-filter.

use serde::Serialize;

use super::angles::{angle_at, angle_deg, distance, vertical_angle};
use super::visibility::VisibilityGate;
use crate::pose::{Bilateral, Joint, Pose, Side};

/// Hip span below which the hip line has no usable direction (side view)
const MIN_HIP_SPAN: f32 = 0.03;

/// Which way the body faces the camera, judged by which arm triple is visible
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BodyView {
    Front,
    LeftSide,
    RightSide,
    Unclear,
}

impl BodyView {
    pub fn as_str(&self) -> &'static str {
        match self {
            BodyView::Front => "front",
            BodyView::LeftSide => "left_side",
            BodyView::RightSide => "right_side",
            BodyView::Unclear => "unclear",
        }
    }
}

/// Angle between upper arm and torso (hip-shoulder-elbow), per side
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct ElbowTorso {
    pub per_side: Bilateral<Option<f32>>,
    /// Mean over the visible sides
    pub average: Option<f32>,
    pub view: BodyView,
}

/// Elbow-to-torso deviation for both arms, plus the view classification
pub fn elbow_torso(pose: &Pose, gate: &VisibilityGate) -> ElbowTorso {
    let per_side = Bilateral::from_fn(|side| {
        let hip = pose.joint(Joint::hip(side));
        let shoulder = pose.joint(Joint::shoulder(side));
        let elbow = pose.joint(Joint::elbow(side));
        gate.measure(&[hip, shoulder, elbow], || {
            angle_deg(hip.xy(), shoulder.xy(), elbow.xy())
        })
    });

    let view = match (per_side.left, per_side.right) {
        (Some(_), Some(_)) => BodyView::Front,
        (Some(_), None) => BodyView::LeftSide,
        (None, Some(_)) => BodyView::RightSide,
        (None, None) => BodyView::Unclear,
    };

    ElbowTorso {
        per_side,
        average: mean_available(per_side.left, per_side.right),
        view,
    }
}

/// Torso lean: hip-to-shoulder segment measured from vertical
pub fn hip_shoulder_lean(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let hip = pose.joint(Joint::hip(side));
    let shoulder = pose.joint(Joint::shoulder(side));
    gate.measure(&[hip, shoulder], || vertical_angle(hip.xy(), shoulder.xy()))
}

/// Knee flexion (hip-knee-ankle); 180° is a straight leg
pub fn knee_angle(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let hip = pose.joint(Joint::hip(side));
    let knee = pose.joint(Joint::knee(side));
    let ankle = pose.joint(Joint::ankle(side));
    gate.measure(&[hip, knee, ankle], || angle_at(hip.xy(), knee.xy(), ankle.xy()))
}

/// Knee angle averaged over the visible legs, or the single visible one
pub fn average_knee_angle(pose: &Pose, gate: &VisibilityGate) -> Option<f32> {
    mean_available(
        knee_angle(pose, Side::Left, gate),
        knee_angle(pose, Side::Right, gate),
    )
}

/// Elbow flexion for curls (shoulder-elbow-wrist); 180° is a straight arm
pub fn bicep_angle(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let shoulder = pose.joint(Joint::shoulder(side));
    let elbow = pose.joint(Joint::elbow(side));
    let wrist = pose.joint(Joint::wrist(side));
    gate.measure(&[shoulder, elbow, wrist], || {
        angle_at(shoulder.xy(), elbow.xy(), wrist.xy())
    })
}

/// Arm raise measured at the shoulder (hip-shoulder-wrist), folded to 0-180
///
/// 0° is the arm hanging along the torso, 180° is straight overhead.
pub fn shoulder_flexion(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let hip = pose.joint(Joint::hip(side));
    let shoulder = pose.joint(Joint::shoulder(side));
    let wrist = pose.joint(Joint::wrist(side));
    gate.measure(&[hip, shoulder, wrist], || {
        angle_at(hip.xy(), shoulder.xy(), wrist.xy())
    })
}

/// Elbow straightness (shoulder-elbow-wrist) by the dot-product formula
pub fn elbow_bend(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let shoulder = pose.joint(Joint::shoulder(side));
    let elbow = pose.joint(Joint::elbow(side));
    let wrist = pose.joint(Joint::wrist(side));
    gate.measure(&[shoulder, elbow, wrist], || {
        angle_deg(shoulder.xy(), elbow.xy(), wrist.xy())
    })
}

/// Trunk-thigh angle at the hip (shoulder-hip-knee); small means folded
pub fn hip_fold(pose: &Pose, side: Side, gate: &VisibilityGate) -> Option<f32> {
    let shoulder = pose.joint(Joint::shoulder(side));
    let hip = pose.joint(Joint::hip(side));
    let knee = pose.joint(Joint::knee(side));
    gate.measure(&[shoulder, hip, knee], || {
        angle_at(shoulder.xy(), hip.xy(), knee.xy())
    })
}

/// Wrist hangs below the elbow by at least `margin`
pub fn wrist_tucked(pose: &Pose, side: Side, gate: &VisibilityGate, margin: f32) -> Option<bool> {
    let elbow = pose.joint(Joint::elbow(side));
    let wrist = pose.joint(Joint::wrist(side));
    gate.measure(&[elbow, wrist], || wrist.y > elbow.y + margin)
}

/// Tilt of the hip line away from horizontal, in degrees
///
/// Unavailable when the hips overlap (side view) since the line has no
/// direction then.
pub fn hip_tilt(pose: &Pose, gate: &VisibilityGate) -> Option<f32> {
    let left = pose.joint(Joint::LeftHip);
    let right = pose.joint(Joint::RightHip);
    if !gate.all_visible(&[left, right]) || distance(left.xy(), right.xy()) < MIN_HIP_SPAN {
        return None;
    }
    let dx = (right.x - left.x).abs();
    let dy = (right.y - left.y).abs();
    Some(dy.atan2(dx).to_degrees())
}

/// Mean of the available values
pub fn mean_available(a: Option<f32>, b: Option<f32>) -> Option<f32> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a + b) / 2.0),
        (Some(v), None) | (None, Some(v)) => Some(v),
        (None, None) => None,
    }
}
