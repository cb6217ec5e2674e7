//! Exercise module - one rep-counting state machine per exercise
//!
//! Re-exports only. All logic in submodules.

mod bicep_curl;
mod knee_raise;
mod phase;
mod shoulder_flexion;
mod smoothing;
mod squat;
mod tracker;

pub use bicep_curl::{ArmReading, BicepCurlTracker, CurlFrame, CurlState};
pub use knee_raise::{KneeRaiseFrame, KneeRaiseState, KneeRaiseTracker, PairSide};
pub use phase::{check_phase, judge_phase, Latch, PhaseTimer, PhaseVerdict};
pub use shoulder_flexion::{
    FlexionArm, FlexionFrame, FlexionReading, FlexionState, ShoulderFlexionTracker,
};
pub use smoothing::SmoothingWindow;
pub use squat::{SquatFrame, SquatState, SquatTracker};
pub use tracker::RepTracker;
