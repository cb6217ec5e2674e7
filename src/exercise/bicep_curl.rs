//! Bicep curl tracker
//!
//! IDLE -> CURL_START (arm extended) -> CURL_UP (top) -> CURL_DOWN -> CURL_START.
//! Entering START needs the elbow above `start_angle`; leaving it needs the
//! arm all the way to `top_angle`, so noise around the start threshold never
//! reaches UP.

use log::{debug, info};
use nalgebra::Vector2;

use super::phase::{check_phase, Latch};
use super::tracker::RepTracker;
use crate::config::{BicepCurlThresholds, GeometryThresholds};
use crate::feedback::{Cue, FeedbackManager, Priority};
use crate::geometry::{distance, AngleBundle, VisibilityGate};
use crate::pose::{Bilateral, Joint, Pose, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CurlState {
    Idle,
    Start,
    Up,
    Down,
}

impl CurlState {
    pub fn as_str(&self) -> &'static str {
        match self {
            CurlState::Idle => "IDLE",
            CurlState::Start => "CURL_START",
            CurlState::Up => "CURL_UP",
            CurlState::Down => "CURL_DOWN",
        }
    }
}

/// One arm's readings for a frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ArmReading {
    /// Elbow flexion (shoulder-elbow-wrist)
    pub angle: Option<f32>,
    /// Upper arm opening from the torso
    pub elbow_torso: Option<f32>,
    pub shoulder: Option<Vector2<f32>>,
    pub wrist_tucked: Option<bool>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct CurlFrame {
    pub arms: Bilateral<ArmReading>,
    pub body_lean: Option<f32>,
}

impl CurlFrame {
    pub fn from_pose(pose: &Pose, angles: &AngleBundle, config: &GeometryThresholds) -> Self {
        let gate = VisibilityGate::new(config.visibility);
        let arms = Bilateral::from_fn(|side| {
            let shoulder = pose.joint(Joint::shoulder(side));
            ArmReading {
                angle: angles.bicep.get(side),
                elbow_torso: angles.elbow_torso.per_side.get(side),
                shoulder: gate.measure(&[shoulder], || shoulder.xy()),
                wrist_tucked: angles.wrist_tucked.get(side),
            }
        });
        Self {
            arms,
            body_lean: angles.hip_shoulder_lean,
        }
    }

    /// The more flexed arm when both are visible, else the visible one
    pub fn active_arm(&self) -> Option<(Side, ArmReading)> {
        let left = self.arms.left;
        let right = self.arms.right;
        match (left.angle, right.angle) {
            (Some(l), Some(r)) if r < l => Some((Side::Right, right)),
            (Some(_), _) => Some((Side::Left, left)),
            (None, Some(_)) => Some((Side::Right, right)),
            (None, None) => None,
        }
    }
}

pub struct BicepCurlTracker {
    state: CurlState,
    reps: u32,
    rejected: u32,
    side: Option<Side>,
    timing_ok: Latch,
    elbow_ok: Latch,
    /// Arm has left the extended position during START
    lifting: bool,
    /// Smallest elbow angle of a lift that hasn't reached the top yet
    lift_low: Option<f32>,
    /// Last frame with the arm extended; the lift is timed from here
    last_extended_at: Option<f64>,
    /// Last frame at the top; the lowering is timed from here
    last_flexed_at: Option<f64>,
    /// Shoulder position while extended, for drift during UP
    shoulder_anchor: Option<(Side, Vector2<f32>)>,
    feedback: FeedbackManager,
    completed: Option<Vec<Cue>>,
}

impl BicepCurlTracker {
    pub fn new() -> Self {
        Self {
            state: CurlState::Idle,
            reps: 0,
            rejected: 0,
            side: None,
            timing_ok: Latch::new(),
            elbow_ok: Latch::new(),
            lifting: false,
            lift_low: None,
            last_extended_at: None,
            last_flexed_at: None,
            shoulder_anchor: None,
            feedback: FeedbackManager::new(),
            completed: None,
        }
    }

    pub fn state(&self) -> CurlState {
        self.state
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    pub fn update(&mut self, frame: &CurlFrame, cfg: &BicepCurlThresholds, now: f64) {
        self.completed = None;

        let Some((side, arm)) = frame.active_arm() else {
            return;
        };
        let Some(angle) = arm.angle else {
            return;
        };
        self.side = Some(side);

        match self.state {
            CurlState::Idle => {
                if angle > cfg.start_angle {
                    self.begin_cycle(&arm, now);
                    self.feedback.start_new_rep();
                    debug!("curl: IDLE -> CURL_START ({} arm at {angle:.1}°)", side.as_str());
                }
            }
            CurlState::Start => self.update_start(&arm, angle, cfg, now),
            CurlState::Up => {
                self.check_elbow(&arm, cfg);
                if angle < cfg.top_angle {
                    self.last_flexed_at = Some(now);
                }
                if let (Some(shoulder), Some((anchor_side, anchor))) = (arm.shoulder, self.shoulder_anchor) {
                    if anchor_side == side && distance(shoulder, anchor) > cfg.shoulder_drift_max {
                        self.feedback.add(Cue::KeepShoulderStill, Priority::Medium);
                    }
                }
                if angle > cfg.top_exit_angle {
                    self.state = CurlState::Down;
                    debug!("curl: CURL_UP -> CURL_DOWN at {angle:.1}°");
                    if angle > cfg.complete_angle {
                        self.finish_rep(&arm, cfg, now);
                    }
                }
            }
            CurlState::Down => {
                self.check_elbow(&arm, cfg);
                if angle < cfg.top_angle {
                    self.state = CurlState::Up;
                    self.last_flexed_at = Some(now);
                    self.feedback.add(Cue::ExtendArmFully, Priority::Medium);
                    debug!("curl: CURL_DOWN -> CURL_UP without full extension");
                } else if angle > cfg.complete_angle {
                    self.finish_rep(&arm, cfg, now);
                }
            }
        }

        if self.state != CurlState::Idle
            && frame.body_lean.is_some_and(|lean| lean > cfg.body_swing_max)
        {
            self.feedback.add(Cue::KeepBodyStill, Priority::Medium);
        }
    }

    fn update_start(&mut self, arm: &ArmReading, angle: f32, cfg: &BicepCurlThresholds, now: f64) {
        if angle > cfg.start_angle {
            self.last_extended_at = Some(now);
            if let Some(anchor) = self.side.zip(arm.shoulder) {
                self.shoulder_anchor = Some(anchor);
            }
            if self.lifting {
                if self.lift_low.is_some_and(|low| low < cfg.partial_angle) {
                    self.feedback.add(Cue::CurlHigher, Priority::Medium);
                }
                self.lifting = false;
                self.lift_low = None;
            }
            if arm.wrist_tucked == Some(false) {
                self.feedback.add(Cue::LetArmHang, Priority::Low);
            }
            return;
        }

        if !self.lifting {
            self.lifting = true;
            self.begin_attempt();
        }
        self.lift_low = Some(self.lift_low.map_or(angle, |low| low.min(angle)));
        self.check_elbow(arm, cfg);

        if angle < cfg.top_angle {
            if let Some(extended) = self.last_extended_at {
                if !check_phase(now - extended, &cfg.timing, &mut self.feedback) {
                    self.timing_ok.fail();
                }
            }
            self.state = CurlState::Up;
            self.last_flexed_at = Some(now);
            self.lifting = false;
            self.lift_low = None;
            debug!("curl: CURL_START -> CURL_UP at {angle:.1}°");
        }
    }

    fn check_elbow(&mut self, arm: &ArmReading, cfg: &BicepCurlThresholds) {
        if arm.elbow_torso.is_some_and(|deviation| deviation > cfg.elbow_deviation_max) {
            self.elbow_ok.fail();
            self.feedback.add(Cue::ElbowAwayFromBody, Priority::High);
        }
    }

    fn finish_rep(&mut self, arm: &ArmReading, cfg: &BicepCurlThresholds, now: f64) {
        if let Some(flexed) = self.last_flexed_at {
            if !check_phase(now - flexed, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }

        if self.timing_ok.is_valid() && self.elbow_ok.is_valid() {
            self.reps += 1;
            info!("curl: rep {} counted", self.reps);
        } else {
            self.rejected += 1;
            debug!(
                "curl: rep rejected (timing ok: {}, elbow ok: {})",
                self.timing_ok.is_valid(),
                self.elbow_ok.is_valid()
            );
        }
        self.completed = Some(self.feedback.complete_rep());

        debug!("curl: CURL_DOWN -> CURL_START");
        self.begin_cycle(arm, now);
    }

    fn begin_cycle(&mut self, arm: &ArmReading, now: f64) {
        self.state = CurlState::Start;
        self.timing_ok.reset();
        self.elbow_ok.reset();
        self.lifting = false;
        self.lift_low = None;
        self.last_extended_at = Some(now);
        self.last_flexed_at = None;
        self.shoulder_anchor = self.side.zip(arm.shoulder);
    }

    /// First frame of a lift; an abandoned lift leaves nothing behind
    fn begin_attempt(&mut self) {
        self.feedback.start_new_rep();
        self.timing_ok.reset();
        self.elbow_ok.reset();
    }
}

impl RepTracker for BicepCurlTracker {
    fn state_name(&self) -> &'static str {
        self.state.as_str()
    }

    fn reps(&self) -> u32 {
        self.reps
    }

    fn rejected(&self) -> u32 {
        self.rejected
    }

    fn live_feedback(&self) -> Vec<Cue> {
        if self.feedback.has_summary() {
            Vec::new()
        } else {
            self.feedback.get_feedback()
        }
    }

    fn take_rep_summary(&mut self) -> Option<Vec<Cue>> {
        self.completed.take()
    }

    fn guidance(&self) -> Cue {
        match self.state {
            CurlState::Idle => Cue::GetInPosition,
            CurlState::Start => Cue::CurlUp,
            CurlState::Up | CurlState::Down => Cue::LowerYourArm,
        }
    }

    fn active_side(&self) -> Option<&'static str> {
        self.side.map(|side| side.as_str())
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for BicepCurlTracker {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn left_arm(angle: f32, elbow_torso: f32) -> CurlFrame {
        CurlFrame {
            arms: Bilateral::new(
                ArmReading {
                    angle: Some(angle),
                    elbow_torso: Some(elbow_torso),
                    ..ArmReading::default()
                },
                ArmReading::default(),
            ),
            body_lean: None,
        }
    }

    fn run(curl: &mut BicepCurlTracker, angles: &[(f32, f64)], elbow_torso: f32) {
        let cfg = BicepCurlThresholds::default();
        for &(angle, t) in angles {
            curl.update(&left_arm(angle, elbow_torso), &cfg, t);
        }
    }

    #[test]
    fn test_counted_curl() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (120.0, 0.4), (50.0, 1.0), (90.0, 1.6), (160.0, 2.0)], 10.0);
        assert_eq!(curl.reps(), 1);
        assert_eq!(curl.state(), CurlState::Start);
        assert_eq!(curl.active_side(), Some("left"));
    }

    #[test]
    fn test_no_chatter_around_start_threshold() {
        let mut curl = BicepCurlTracker::new();
        let angles: Vec<(f32, f64)> = (0..40)
            .map(|i| (if i % 2 == 0 { 163.0 } else { 161.0 }, i as f64 * 0.1))
            .collect();
        run(&mut curl, &angles, 10.0);
        assert_eq!(curl.reps(), 0);
        assert_eq!(curl.rejected(), 0);
        assert_eq!(curl.state(), CurlState::Start);
    }

    #[test]
    fn test_elbow_away_from_body_blocks_rep() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (120.0, 0.4), (50.0, 1.0)], 40.0);
        assert_eq!(curl.state(), CurlState::Up);
        run(&mut curl, &[(90.0, 1.6), (160.0, 2.0)], 40.0);
        assert_eq!(curl.state(), CurlState::Start);
        assert_eq!(curl.reps(), 0);
        assert_eq!(curl.rejected(), 1);
        assert_eq!(curl.take_rep_summary(), Some(vec![Cue::ElbowAwayFromBody]));
    }

    #[test]
    fn test_fast_lift_blocks_rep() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (50.0, 0.1), (90.0, 0.8), (160.0, 1.2)], 10.0);
        assert_eq!(curl.reps(), 0);
        assert_eq!(curl.take_rep_summary(), Some(vec![Cue::TooFast]));
    }

    #[test]
    fn test_slow_lowering_blocks_rep() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (50.0, 1.0), (90.0, 3.0), (160.0, 5.0)], 10.0);
        assert_eq!(curl.reps(), 0);
        assert_eq!(curl.take_rep_summary(), Some(vec![Cue::TooSlow]));
    }

    #[test]
    fn test_partial_lift_coaches_range() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (95.0, 0.5), (170.0, 1.0)], 10.0);
        assert_eq!(curl.state(), CurlState::Start);
        assert_eq!(curl.live_feedback(), vec![Cue::CurlHigher]);
    }

    #[test]
    fn test_abandoned_lift_does_not_reject_next_rep() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (120.0, 0.4), (170.0, 0.8)], 40.0);
        assert_eq!(curl.state(), CurlState::Start);
        assert_eq!(curl.rejected(), 0);

        run(&mut curl, &[(120.0, 1.2), (50.0, 1.8), (90.0, 2.4), (160.0, 2.8)], 10.0);
        assert_eq!(curl.reps(), 1);
        assert_eq!(curl.rejected(), 0);
        assert_eq!(curl.take_rep_summary(), Some(vec![]));
    }

    #[test]
    fn test_partial_lift_cue_cleared_by_next_lift() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (95.0, 0.5), (170.0, 1.0)], 10.0);
        assert_eq!(curl.live_feedback(), vec![Cue::CurlHigher]);

        run(&mut curl, &[(120.0, 1.4), (50.0, 2.0), (90.0, 2.6), (160.0, 3.0)], 10.0);
        assert_eq!(curl.reps(), 1);
        assert_eq!(curl.take_rep_summary(), Some(vec![]));
    }

    #[test]
    fn test_shoulder_drift_only_against_same_arm() {
        let cfg = BicepCurlThresholds::default();
        let mut curl = BicepCurlTracker::new();
        let reading = |angle: f32, shoulder: (f32, f32)| ArmReading {
            angle: Some(angle),
            shoulder: Some(Vector2::new(shoulder.0, shoulder.1)),
            ..ArmReading::default()
        };
        let left = |angle: f32, shoulder: (f32, f32)| CurlFrame {
            arms: Bilateral::new(reading(angle, shoulder), ArmReading::default()),
            body_lean: None,
        };

        curl.update(&left(170.0, (0.6, 0.3)), &cfg, 0.0);
        curl.update(&left(50.0, (0.6, 0.3)), &cfg, 1.0);
        assert_eq!(curl.state(), CurlState::Up);

        // right arm takes over mid-rep, its shoulder far from the left anchor
        let both = CurlFrame {
            arms: Bilateral::new(reading(55.0, (0.6, 0.3)), reading(40.0, (0.4, 0.3))),
            body_lean: None,
        };
        curl.update(&both, &cfg, 1.2);
        assert_eq!(curl.active_side(), Some("right"));
        assert!(!curl.live_feedback().contains(&Cue::KeepShoulderStill));

        curl.update(&left(50.0, (0.6, 0.4)), &cfg, 1.4);
        assert!(curl.live_feedback().contains(&Cue::KeepShoulderStill));
    }

    #[test]
    fn test_more_flexed_arm_is_active() {
        let frame = CurlFrame {
            arms: Bilateral::new(
                ArmReading {
                    angle: Some(160.0),
                    ..ArmReading::default()
                },
                ArmReading {
                    angle: Some(70.0),
                    ..ArmReading::default()
                },
            ),
            body_lean: None,
        };
        assert_eq!(frame.active_arm().map(|(side, _)| side), Some(Side::Right));
        assert_eq!(CurlFrame::default().active_arm(), None);
    }

    #[test]
    fn test_summary_shown_until_next_lift() {
        let mut curl = BicepCurlTracker::new();
        run(&mut curl, &[(170.0, 0.0), (50.0, 1.0), (90.0, 1.6), (165.0, 2.0)], 40.0);
        assert!(curl.take_rep_summary().is_some());
        assert!(curl.live_feedback().is_empty());
        run(&mut curl, &[(140.0, 2.5)], 10.0);
        assert!(!curl.feedback().has_summary());
    }
}
