//! Standing knee raise with contralateral arm
//!
//! IDLE -> KNEE_RAISE_START (leg down, arm down) -> KNEE_RAISE_UP -> START.
//! A leg is always paired with the opposite arm, and both must reach the top
//! to advance. The active pair is the one whose leg is more bent, and it is
//! locked while UP.

use log::{debug, info};
use serde::Serialize;

use super::phase::{check_phase, Latch, PhaseTimer};
use super::smoothing::SmoothingWindow;
use super::tracker::RepTracker;
use crate::config::KneeRaiseThresholds;
use crate::feedback::{Cue, FeedbackManager, Priority};
use crate::geometry::AngleBundle;
use crate::pose::{Bilateral, Side};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KneeRaiseState {
    Idle,
    Start,
    Up,
}

impl KneeRaiseState {
    pub fn as_str(&self) -> &'static str {
        match self {
            KneeRaiseState::Idle => "IDLE",
            KneeRaiseState::Start => "KNEE_RAISE_START",
            KneeRaiseState::Up => "KNEE_RAISE_UP",
        }
    }
}

/// Leg and the opposite arm, named by the leg
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PairSide {
    LeftLegRightArm,
    RightLegLeftArm,
}

impl PairSide {
    pub fn for_leg(leg: Side) -> Self {
        match leg {
            Side::Left => PairSide::LeftLegRightArm,
            Side::Right => PairSide::RightLegLeftArm,
        }
    }

    pub fn leg(&self) -> Side {
        match self {
            PairSide::LeftLegRightArm => Side::Left,
            PairSide::RightLegLeftArm => Side::Right,
        }
    }

    pub fn arm(&self) -> Side {
        self.leg().opposite()
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PairSide::LeftLegRightArm => "left_leg_right_arm",
            PairSide::RightLegLeftArm => "right_leg_left_arm",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct KneeRaiseFrame {
    pub knee: Bilateral<Option<f32>>,
    /// Shoulder flexion per arm
    pub arm_flexion: Bilateral<Option<f32>>,
    pub hip_tilt: Option<f32>,
}

impl KneeRaiseFrame {
    pub fn from_angles(angles: &AngleBundle) -> Self {
        Self {
            knee: angles.knee,
            arm_flexion: angles.shoulder_flexion,
            hip_tilt: angles.hip_tilt,
        }
    }
}

/// One smoothing window per raw signal
struct Smoothed {
    left_knee: SmoothingWindow,
    right_knee: SmoothingWindow,
    left_arm: SmoothingWindow,
    right_arm: SmoothingWindow,
}

impl Smoothed {
    fn new(capacity: usize) -> Self {
        Self {
            left_knee: SmoothingWindow::new(capacity),
            right_knee: SmoothingWindow::new(capacity),
            left_arm: SmoothingWindow::new(capacity),
            right_arm: SmoothingWindow::new(capacity),
        }
    }

    /// Push one frame, returning smoothed (knee, arm) per side
    fn update(&mut self, frame: &KneeRaiseFrame, capacity: usize) -> (Bilateral<Option<f32>>, Bilateral<Option<f32>>) {
        for window in [&mut self.left_knee, &mut self.right_knee, &mut self.left_arm, &mut self.right_arm] {
            window.set_capacity(capacity);
        }
        let knee = Bilateral::new(
            self.left_knee.update(frame.knee.left),
            self.right_knee.update(frame.knee.right),
        );
        let arm = Bilateral::new(
            self.left_arm.update(frame.arm_flexion.left),
            self.right_arm.update(frame.arm_flexion.right),
        );
        (knee, arm)
    }
}

pub struct KneeRaiseTracker {
    state: KneeRaiseState,
    reps: u32,
    rejected: u32,
    pair: Option<PairSide>,
    smoothed: Smoothed,
    timing_ok: Latch,
    balance_ok: Latch,
    sync_ok: Latch,
    last_rest_at: Option<f64>,
    leg_up_at: Option<f64>,
    arm_up_at: Option<f64>,
    /// Left rest during START
    raising: bool,
    up: PhaseTimer,
    feedback: FeedbackManager,
    completed: Option<Vec<Cue>>,
}

impl KneeRaiseTracker {
    pub fn new() -> Self {
        Self {
            state: KneeRaiseState::Idle,
            reps: 0,
            rejected: 0,
            pair: None,
            smoothed: Smoothed::new(KneeRaiseThresholds::default().smoothing_window),
            timing_ok: Latch::new(),
            balance_ok: Latch::new(),
            sync_ok: Latch::new(),
            last_rest_at: None,
            leg_up_at: None,
            arm_up_at: None,
            raising: false,
            up: PhaseTimer::new(),
            feedback: FeedbackManager::new(),
            completed: None,
        }
    }

    pub fn state(&self) -> KneeRaiseState {
        self.state
    }

    pub fn pair(&self) -> Option<PairSide> {
        self.pair
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    pub fn update(&mut self, frame: &KneeRaiseFrame, cfg: &KneeRaiseThresholds, now: f64) {
        self.completed = None;
        let (knee, arm) = self.smoothed.update(frame, cfg.smoothing_window);

        if self.state != KneeRaiseState::Up {
            let leg = match (knee.left, knee.right) {
                (Some(l), Some(r)) if r < l => Some(Side::Right),
                (Some(_), _) => Some(Side::Left),
                (None, Some(_)) => Some(Side::Right),
                (None, None) => None,
            };
            if let Some(leg) = leg {
                self.pair = Some(PairSide::for_leg(leg));
            }
        }

        let Some(pair) = self.pair else {
            return;
        };
        let (Some(leg), Some(arm)) = (knee.get(pair.leg()), arm.get(pair.arm())) else {
            return;
        };
        let at_rest = leg > cfg.leg_rest_angle && arm < cfg.arm_rest_angle;

        match self.state {
            KneeRaiseState::Idle => {
                if at_rest {
                    self.begin_cycle(now);
                    self.feedback.start_new_rep();
                    debug!("knee raise: IDLE -> KNEE_RAISE_START ({})", pair.as_str());
                }
            }
            KneeRaiseState::Start => {
                if at_rest {
                    if self.leg_up_at.is_some() != self.arm_up_at.is_some() {
                        self.feedback.add(Cue::MoveArmAndLegTogether, Priority::Medium);
                    }
                    self.leg_up_at = None;
                    self.arm_up_at = None;
                    self.raising = false;
                    self.last_rest_at = Some(now);
                } else {
                    if !self.raising {
                        self.raising = true;
                        self.begin_attempt();
                    }
                    if self.leg_up_at.is_none() && leg < cfg.leg_up_angle {
                        self.leg_up_at = Some(now);
                    }
                    if self.arm_up_at.is_none() && arm > cfg.arm_up_angle {
                        self.arm_up_at = Some(now);
                    }
                    if let (Some(leg_at), Some(arm_at)) = (self.leg_up_at, self.arm_up_at) {
                        self.reach_top(leg_at, arm_at, cfg, now);
                    }
                }
            }
            KneeRaiseState::Up => {
                if at_rest {
                    self.finish_rep(cfg, now);
                }
            }
        }

        let active = self.raising || self.state == KneeRaiseState::Up;
        if active && frame.hip_tilt.is_some_and(|tilt| tilt > cfg.hip_tilt_max) {
            self.balance_ok.fail();
            self.feedback.add(Cue::KeepHipsLevel, Priority::High);
        }
    }

    fn reach_top(&mut self, leg_at: f64, arm_at: f64, cfg: &KneeRaiseThresholds, now: f64) {
        if (leg_at - arm_at).abs() > cfg.sync_lag_max_secs {
            self.sync_ok.fail();
            self.feedback.add(Cue::MoveArmAndLegTogether, Priority::High);
        }
        if let Some(rest) = self.last_rest_at {
            if !check_phase(now - rest, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }
        self.state = KneeRaiseState::Up;
        self.up.enter(now);
        debug!("knee raise: KNEE_RAISE_START -> KNEE_RAISE_UP");
    }

    fn finish_rep(&mut self, cfg: &KneeRaiseThresholds, now: f64) {
        if let Some(duration) = self.up.elapsed(now) {
            if !check_phase(duration, &cfg.timing, &mut self.feedback) {
                self.timing_ok.fail();
            }
        }

        if self.timing_ok.is_valid() && self.balance_ok.is_valid() && self.sync_ok.is_valid() {
            self.reps += 1;
            info!("knee raise: rep {} counted", self.reps);
        } else {
            self.rejected += 1;
            debug!(
                "knee raise: rep rejected (timing ok: {}, balance ok: {}, sync ok: {})",
                self.timing_ok.is_valid(),
                self.balance_ok.is_valid(),
                self.sync_ok.is_valid()
            );
        }
        self.completed = Some(self.feedback.complete_rep());

        debug!("knee raise: KNEE_RAISE_UP -> KNEE_RAISE_START");
        self.begin_cycle(now);
    }

    /// First frame off rest; an abandoned raise leaves nothing behind
    fn begin_attempt(&mut self) {
        self.feedback.start_new_rep();
        self.timing_ok.reset();
        self.balance_ok.reset();
        self.sync_ok.reset();
    }

    fn begin_cycle(&mut self, now: f64) {
        self.state = KneeRaiseState::Start;
        self.timing_ok.reset();
        self.balance_ok.reset();
        self.sync_ok.reset();
        self.last_rest_at = Some(now);
        self.leg_up_at = None;
        self.arm_up_at = None;
        self.raising = false;
        self.up.clear();
    }
}

impl RepTracker for KneeRaiseTracker {
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
            KneeRaiseState::Idle => Cue::GetInPosition,
            KneeRaiseState::Start => Cue::RaiseKneeAndArm,
            KneeRaiseState::Up => Cue::LowerKneeAndArm,
        }
    }

    fn active_side(&self) -> Option<&'static str> {
        self.pair.map(|pair| pair.as_str())
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}

impl Default for KneeRaiseTracker {
    fn default() -> Self {
        Self::new()
    }
}
