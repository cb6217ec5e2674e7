//! Squat tracker
//!
//! IDLE -> SQUAT_START (standing) -> SQUAT_DOWN (bottom) -> SQUAT_START.
//! The primary signal is the knee angle averaged over the visible legs.
//!
//! Critical checks for a rep: phase timing, knees not past the toes, no knee
//! valgus, a short hold at the bottom, enough hip drop and enough hip fold.
//! Depth and forward lean are coaching only.

use log::{debug, info};

use super::phase::{check_phase, Latch, PhaseTimer};
use super::tracker::RepTracker;
use crate::config::{GeometryThresholds, SquatThresholds};
use crate::feedback::{Cue, FeedbackManager, Priority};
use crate::geometry::{distance, mean_available, AngleBundle, VisibilityGate};
use crate::pose::{Joint, Pose, Side};

/// Hip span below which knee valgus can't be judged (side view)
const MIN_HIP_SPAN: f32 = 0.05;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SquatState {
    Idle,
    Start,
    Down,
}

impl SquatState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SquatState::Idle => "IDLE",
            SquatState::Start => "SQUAT_START",
            SquatState::Down => "SQUAT_DOWN",
        }
    }
}

/// Measures the squat tracker reads from one frame
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SquatFrame {
    pub knee_angle: Option<f32>,
    /// Trunk-thigh angle at the hip
    pub hip_fold: Option<f32>,
    /// Torso lean from vertical
    pub back_angle: Option<f32>,
    /// Mean height of the visible hips (image y, grows downward)
    pub hip_y: Option<f32>,
    /// Largest horizontal knee-to-ankle offset over the visible legs
    pub knee_past_ankle: Option<f32>,
    /// Knee span over hip span, when both hips are far enough apart to judge
    pub knee_span_ratio: Option<f32>,
}

impl SquatFrame {
    pub fn from_pose(pose: &Pose, angles: &AngleBundle, config: &GeometryThresholds) -> Self {
        let gate = VisibilityGate::new(config.visibility);

        let hip_height = |side: Side| {
            let hip = pose.joint(Joint::hip(side));
            gate.measure(&[hip], || hip.y)
        };

        let knee_offset = |side: Side| {
            let knee = pose.joint(Joint::knee(side));
            let ankle = pose.joint(Joint::ankle(side));
            gate.measure(&[knee, ankle], || (knee.x - ankle.x).abs())
        };
        let knee_past_ankle = match (knee_offset(Side::Left), knee_offset(Side::Right)) {
            (Some(l), Some(r)) => Some(l.max(r)),
            (l, r) => l.or(r),
        };

        let left_hip = pose.joint(Joint::LeftHip);
        let right_hip = pose.joint(Joint::RightHip);
        let left_knee = pose.joint(Joint::LeftKnee);
        let right_knee = pose.joint(Joint::RightKnee);
        let knee_span_ratio = gate
            .measure(&[left_hip, right_hip, left_knee, right_knee], || {
                let hip_span = distance(left_hip.xy(), right_hip.xy());
                (hip_span >= MIN_HIP_SPAN).then(|| distance(left_knee.xy(), right_knee.xy()) / hip_span)
            })
            .flatten();

        Self {
            knee_angle: angles.knee_average,
            hip_fold: angles.hip_fold,
            back_angle: angles.back_angle,
            hip_y: mean_available(hip_height(Side::Left), hip_height(Side::Right)),
            knee_past_ankle,
            knee_span_ratio,
        }
    }
}

pub struct SquatTracker {
    state: SquatState,
    reps: u32,
    rejected: u32,
    /// Descent is timed from the last standing frame, the bottom from entry
    phase: PhaseTimer,
    timing_ok: Latch,
    form_ok: Latch,
    /// Hip height while standing, before the descent
    standing_hip_y: Option<f32>,
    /// Lowest hip position (largest y) reached at the bottom
    bottom_hip_y: Option<f32>,
    min_hip_fold: Option<f32>,
    /// First frame at the bottom where the knees began to open again
    ascent_began_at: Option<f64>,
    /// Deepest knee angle of a dip that never reached the bottom
    shallow_dip: Option<f32>,
    feedback: FeedbackManager,
    completed: Option<Vec<Cue>>,
}

impl SquatTracker {
    pub fn new() -> Self {
        Self {
            state: SquatState::Idle,
            reps: 0,
            rejected: 0,
            phase: PhaseTimer::new(),
            timing_ok: Latch::new(),
            form_ok: Latch::new(),
            standing_hip_y: None,
            bottom_hip_y: None,
            min_hip_fold: None,
            ascent_began_at: None,
            shallow_dip: None,
            feedback: FeedbackManager::new(),
            completed: None,
        }
    }

    pub fn state(&self) -> SquatState {
        self.state
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    /// Advance the state machine by one frame
    pub fn update(&mut self, frame: &SquatFrame, cfg: &SquatThresholds, now: f64) {
        self.completed = None;

        if let Some(knee) = frame.knee_angle {
            match self.state {
                SquatState::Idle => {
                    if knee > cfg.start_angle {
                        self.begin_cycle(frame, now);
                        self.feedback.start_new_rep();
                        debug!("squat: IDLE -> SQUAT_START at {knee:.1}°");
                    }
                }
                SquatState::Start => self.update_standing(frame, knee, cfg, now),
                SquatState::Down => {
                    self.track_bottom(frame, knee, cfg, now);
                    if knee > cfg.start_angle {
                        self.finish_rep(frame, cfg, now);
                    }
                }
            }
        }

        self.check_lean(frame, cfg);
    }

    fn update_standing(&mut self, frame: &SquatFrame, knee: f32, cfg: &SquatThresholds, now: f64) {
        if knee > cfg.start_angle {
            self.phase.enter(now);
            if frame.hip_y.is_some() {
                self.standing_hip_y = frame.hip_y;
            }
            if let Some(dip) = self.shallow_dip.take() {
                if dip < cfg.partial_angle {
                    self.feedback.add(Cue::SquatDeeper, Priority::Medium);
                }
            }
            return;
        }

        if knee >= cfg.down_angle {
            if self.shallow_dip.is_none() {
                self.begin_attempt();
            }
            self.shallow_dip = Some(self.shallow_dip.map_or(knee, |d| d.min(knee)));
            return;
        }

        // Reached the bottom
        if self.shallow_dip.is_none() {
            self.begin_attempt();
        }
        if let Some(duration) = self.phase.elapsed(now) {
            if !check_phase(duration, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }
        self.state = SquatState::Down;
        self.phase.enter(now);
        self.shallow_dip = None;
        self.bottom_hip_y = None;
        self.min_hip_fold = None;
        self.ascent_began_at = None;
        debug!("squat: SQUAT_START -> SQUAT_DOWN at {knee:.1}°");
        self.track_bottom(frame, knee, cfg, now);
    }

    /// Per-frame bookkeeping and form checks while at the bottom
    fn track_bottom(&mut self, frame: &SquatFrame, knee: f32, cfg: &SquatThresholds, now: f64) {
        if let Some(y) = frame.hip_y {
            self.bottom_hip_y = Some(self.bottom_hip_y.map_or(y, |b| b.max(y)));
        }
        if let Some(fold) = frame.hip_fold {
            self.min_hip_fold = Some(self.min_hip_fold.map_or(fold, |m| m.min(fold)));
        }
        if self.ascent_began_at.is_none() && knee >= cfg.down_angle {
            self.ascent_began_at = Some(now);
        }

        if frame.knee_past_ankle.is_some_and(|offset| offset > cfg.knee_over_toe_margin) {
            self.form_ok.fail();
            self.feedback.add(Cue::KneesPastToes, Priority::High);
        }
        if frame.knee_span_ratio.is_some_and(|ratio| ratio < cfg.valgus_ratio) {
            self.form_ok.fail();
            self.feedback.add(Cue::KneesCavingIn, Priority::High);
        }
        if knee < cfg.too_deep_angle {
            self.feedback.add(Cue::SquatTooDeep, Priority::Medium);
        }
    }

    fn finish_rep(&mut self, frame: &SquatFrame, cfg: &SquatThresholds, now: f64) {
        if let Some(entered) = self.phase.entered_at() {
            let hold = self.ascent_began_at.unwrap_or(now) - entered;
            if hold < cfg.min_hold_secs {
                self.form_ok.fail();
                self.feedback.add(Cue::HoldAtBottom, Priority::High);
            }
        }
        if let Some(duration) = self.phase.elapsed(now) {
            if !check_phase(duration, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }
        if let (Some(standing), Some(bottom)) = (self.standing_hip_y, self.bottom_hip_y) {
            if bottom - standing < cfg.min_hip_drop {
                self.form_ok.fail();
                self.feedback.add(Cue::HipsNotLowEnough, Priority::High);
            }
        }
        if self.min_hip_fold.is_some_and(|fold| fold >= cfg.hip_fold_max) {
            self.form_ok.fail();
            self.feedback.add(Cue::FoldAtHips, Priority::High);
        }

        if self.timing_ok.is_valid() && self.form_ok.is_valid() {
            self.reps += 1;
            info!("squat: rep {} counted", self.reps);
        } else {
            self.rejected += 1;
            debug!(
                "squat: rep rejected (timing ok: {}, form ok: {})",
                self.timing_ok.is_valid(),
                self.form_ok.is_valid()
            );
        }
        self.completed = Some(self.feedback.complete_rep());

        debug!("squat: SQUAT_DOWN -> SQUAT_START");
        self.begin_cycle(frame, now);
    }

    /// Enter SQUAT_START with fresh validity and anchors
    fn begin_cycle(&mut self, frame: &SquatFrame, now: f64) {
        self.state = SquatState::Start;
        self.phase.enter(now);
        self.timing_ok.reset();
        self.form_ok.reset();
        self.standing_hip_y = frame.hip_y;
        self.bottom_hip_y = None;
        self.min_hip_fold = None;
        self.ascent_began_at = None;
        self.shallow_dip = None;
    }

    /// First frame of a descent; an abandoned dip leaves nothing behind
    fn begin_attempt(&mut self) {
        self.feedback.start_new_rep();
        self.timing_ok.reset();
        self.form_ok.reset();
    }

    fn check_lean(&mut self, frame: &SquatFrame, cfg: &SquatThresholds) {
        let Some(back) = frame.back_angle else {
            return;
        };
        let descending = self.state == SquatState::Start && self.shallow_dip.is_some();
        if self.state == SquatState::Down && back < cfg.lean_min {
            self.feedback.add(Cue::LeanForward, Priority::Medium);
        } else if (descending || self.state == SquatState::Down) && back > cfg.lean_max {
            self.feedback.add(Cue::LeanForwardLess, Priority::Medium);
        }
    }
}

impl RepTracker for SquatTracker {
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
            SquatState::Idle => Cue::GetInPosition,
            SquatState::Start => Cue::LowerYourself,
            SquatState::Down => Cue::StandUp,
        }
    }

    fn active_side(&self) -> Option<&'static str> {
        None
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for SquatTracker {
    fn default() -> Self {
        Self::new()
    }
}
