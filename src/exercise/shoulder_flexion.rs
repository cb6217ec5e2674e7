//! Shoulder flexion tracker
//!
//! Each arm runs its own IDLE -> FLEXION_START -> FLEXION_UP -> FLEXION_DOWN
//! cycle and counts on its own schedule. The tracker only composes the two
//! for display: the arm raised higher right now is the one shown.

use log::{debug, info};

use super::phase::{check_phase, Latch};
use super::smoothing::SmoothingWindow;
use super::tracker::RepTracker;
use crate::config::ShoulderFlexionThresholds;
use crate::feedback::{Cue, FeedbackManager, Priority, SUMMARY_LEN};
use crate::geometry::AngleBundle;
use crate::pose::{Bilateral, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlexionState {
    Idle,
    Start,
    Up,
    Down,
}

impl FlexionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlexionState::Idle => "IDLE",
            FlexionState::Start => "FLEXION_START",
            FlexionState::Up => "FLEXION_UP",
            FlexionState::Down => "FLEXION_DOWN",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlexionReading {
    /// Arm raise at the shoulder, 0° hanging
    pub flexion: Option<f32>,
    /// Elbow straightness, 180° straight
    pub elbow_bend: Option<f32>,
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FlexionFrame {
    pub arms: Bilateral<FlexionReading>,
    pub body_lean: Option<f32>,
}

impl FlexionFrame {
    pub fn from_angles(angles: &AngleBundle) -> Self {
        Self {
            arms: Bilateral::from_fn(|side| FlexionReading {
                flexion: angles.shoulder_flexion.get(side),
                elbow_bend: angles.elbow_bend.get(side),
            }),
            body_lean: angles.back_angle,
        }
    }
}

// ============================================================================
// SINGLE ARM
// ============================================================================

pub struct FlexionArm {
    side: Side,
    state: FlexionState,
    reps: u32,
    rejected: u32,
    timing_ok: Latch,
    elbow_ok: Latch,
    elbow: SmoothingWindow,
    /// Arm has left the rest position during START
    lifting: bool,
    last_rest_at: Option<f64>,
    last_top_at: Option<f64>,
    peak: Option<f32>,
    /// Latest flexion reading, for picking the display arm
    flexion: Option<f32>,
    feedback: FeedbackManager,
    completed: Option<Vec<Cue>>,
}

impl FlexionArm {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            state: FlexionState::Idle,
            reps: 0,
            rejected: 0,
            timing_ok: Latch::new(),
            elbow_ok: Latch::new(),
            elbow: SmoothingWindow::new(ShoulderFlexionThresholds::default().elbow_window),
            lifting: false,
            last_rest_at: None,
            last_top_at: None,
            peak: None,
            flexion: None,
            feedback: FeedbackManager::new(),
            completed: None,
        }
    }

    pub fn state(&self) -> FlexionState {
        self.state
    }

    pub fn reps(&self) -> u32 {
        self.reps
    }

    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    pub fn update(
        &mut self,
        reading: &FlexionReading,
        body_lean: Option<f32>,
        cfg: &ShoulderFlexionThresholds,
        now: f64,
    ) {
        self.completed = None;
        self.flexion = reading.flexion;
        self.elbow.set_capacity(cfg.elbow_window);
        let elbow = self.elbow.update(reading.elbow_bend);

        let Some(flexion) = reading.flexion else {
            return;
        };

        match self.state {
            FlexionState::Idle => {
                if flexion < cfg.rest_angle {
                    self.begin_cycle(now);
                    self.feedback.start_new_rep();
                    debug!("flexion[{}]: IDLE -> FLEXION_START", self.side.as_str());
                }
            }
            FlexionState::Start => {
                if flexion < cfg.rest_angle {
                    self.last_rest_at = Some(now);
                    self.lifting = false;
                } else {
                    if !self.lifting {
                        self.lifting = true;
                        self.begin_attempt();
                    }
                    self.check_elbow(elbow, cfg);
                    if flexion > cfg.up_angle {
                        if let Some(rest) = self.last_rest_at {
                            if !check_phase(now - rest, &cfg.timing, &mut self.feedback) {
                                self.timing_ok.fail();
                            }
                        }
                        self.state = FlexionState::Up;
                        self.peak = Some(flexion);
                        self.last_top_at = Some(now);
                        debug!("flexion[{}]: FLEXION_START -> FLEXION_UP at {flexion:.1}°", self.side.as_str());
                    }
                }
            }
            FlexionState::Up => {
                self.check_elbow(elbow, cfg);
                self.peak = Some(self.peak.map_or(flexion, |p| p.max(flexion)));
                if flexion >= cfg.up_exit_angle {
                    self.last_top_at = Some(now);
                } else {
                    self.state = FlexionState::Down;
                    if self.peak.is_some_and(|p| p < cfg.target_angle) {
                        self.feedback.add(Cue::RaiseArmHigher, Priority::Medium);
                    }
                    debug!("flexion[{}]: FLEXION_UP -> FLEXION_DOWN", self.side.as_str());
                    if flexion < cfg.return_angle {
                        self.finish_rep(cfg, now);
                    }
                }
            }
            FlexionState::Down => {
                self.check_elbow(elbow, cfg);
                if flexion > cfg.up_angle {
                    self.state = FlexionState::Up;
                    self.last_top_at = Some(now);
                    self.peak = Some(self.peak.map_or(flexion, |p| p.max(flexion)));
                } else if flexion < cfg.return_angle {
                    self.finish_rep(cfg, now);
                }
            }
        }

        let active = self.lifting || matches!(self.state, FlexionState::Up | FlexionState::Down);
        if active && body_lean.is_some_and(|lean| lean > cfg.lean_max) {
            self.feedback.add(Cue::KeepTorsoUpright, Priority::Medium);
        }
    }

    fn check_elbow(&mut self, smoothed: Option<f32>, cfg: &ShoulderFlexionThresholds) {
        if smoothed.is_some_and(|angle| angle < cfg.elbow_straight_min) {
            self.elbow_ok.fail();
            self.feedback.add(Cue::KeepElbowStraight, Priority::High);
        }
    }

    fn finish_rep(&mut self, cfg: &ShoulderFlexionThresholds, now: f64) {
        if let Some(top) = self.last_top_at {
            if !check_phase(now - top, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }

        if self.timing_ok.is_valid() && self.elbow_ok.is_valid() {
            self.reps += 1;
            info!("flexion[{}]: rep {} counted", self.side.as_str(), self.reps);
        } else {
            self.rejected += 1;
            debug!(
                "flexion[{}]: rep rejected (timing ok: {}, elbow ok: {})",
                self.side.as_str(),
                self.timing_ok.is_valid(),
                self.elbow_ok.is_valid()
            );
        }
        self.completed = Some(self.feedback.complete_rep());
        self.begin_cycle(now);
    }

    fn begin_cycle(&mut self, now: f64) {
        self.state = FlexionState::Start;
        self.timing_ok.reset();
        self.elbow_ok.reset();
        self.lifting = false;
        self.last_rest_at = Some(now);
        self.last_top_at = None;
        self.peak = None;
    }

    /// First frame of a raise; an abandoned raise leaves nothing behind
    fn begin_attempt(&mut self) {
        self.feedback.start_new_rep();
        self.timing_ok.reset();
        self.elbow_ok.reset();
    }

    fn live_feedback(&self) -> Vec<Cue> {
        if self.feedback.has_summary() {
            Vec::new()
        } else {
            self.feedback.get_feedback()
        }
    }
}

// ============================================================================
// BOTH ARMS
// ============================================================================

pub struct ShoulderFlexionTracker {
    left: FlexionArm,
    right: FlexionArm,
}

impl ShoulderFlexionTracker {
    pub fn new() -> Self {
        Self {
            left: FlexionArm::new(Side::Left),
            right: FlexionArm::new(Side::Right),
        }
    }

    pub fn arm(&self, side: Side) -> &FlexionArm {
        match side {
            Side::Left => &self.left,
            Side::Right => &self.right,
        }
    }

    pub fn update(&mut self, frame: &FlexionFrame, cfg: &ShoulderFlexionThresholds, now: f64) {
        self.left.update(&frame.arms.left, frame.body_lean, cfg, now);
        self.right.update(&frame.arms.right, frame.body_lean, cfg, now);
    }

    /// The arm raised higher on the latest frame; left when neither is visible
    pub fn display_side(&self) -> Side {
        match (self.left.flexion, self.right.flexion) {
            (Some(l), Some(r)) if r > l => Side::Right,
            (None, Some(_)) => Side::Right,
            _ => Side::Left,
        }
    }

    fn display_arm(&self) -> &FlexionArm {
        self.arm(self.display_side())
    }

    fn other_arm(&self) -> &FlexionArm {
        self.arm(self.display_side().opposite())
    }
}

fn merge_cues(first: Vec<Cue>, second: Vec<Cue>) -> Vec<Cue> {
    let mut merged = first;
    for cue in second {
        if !merged.contains(&cue) {
            merged.push(cue);
        }
    }
    merged.truncate(SUMMARY_LEN);
    merged
}

impl RepTracker for ShoulderFlexionTracker {
    fn state_name(&self) -> &'static str {
        self.display_arm().state.as_str()
    }

    fn reps(&self) -> u32 {
        self.left.reps + self.right.reps
    }

    fn rejected(&self) -> u32 {
        self.left.rejected + self.right.rejected
    }

    fn live_feedback(&self) -> Vec<Cue> {
        merge_cues(self.display_arm().live_feedback(), self.other_arm().live_feedback())
    }

    fn take_rep_summary(&mut self) -> Option<Vec<Cue>> {
        match (self.left.completed.take(), self.right.completed.take()) {
            (Some(l), Some(r)) => Some(merge_cues(l, r)),
            (l, r) => l.or(r),
        }
    }

    fn guidance(&self) -> Cue {
        match self.display_arm().state {
            FlexionState::Idle => Cue::GetInPosition,
            FlexionState::Start => Cue::RaiseYourArm,
            FlexionState::Up | FlexionState::Down => Cue::LowerYourArm,
        }
    }

    fn active_side(&self) -> Option<&'static str> {
        Some(self.display_side().as_str())
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for ShoulderFlexionTracker {
    fn default() -> Self {
        Self::new()
    }
}
