//! Live-tunable exercise thresholds
//!
//! Every section deserializes with defaults, so a caller can send a partial
//! object (`{"squat": {"down_angle": 95}}`) and only that field changes.
//! Angles are degrees, distances are normalized image units, times are
//! seconds.

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Full threshold tree, one section per exercise family
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub geometry: GeometryThresholds,
    pub squat: SquatThresholds,
    pub bicep_curl: BicepCurlThresholds,
    pub shoulder_flexion: ShoulderFlexionThresholds,
    pub knee_raise: KneeRaiseThresholds,
}

/// Phase timing gate
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingThresholds {
    /// Faster than this blocks the rep
    pub min_phase_secs: f64,
    /// Slower than this blocks the rep, when set
    pub max_phase_secs: Option<f64>,
}

impl Default for TimingThresholds {
    fn default() -> Self {
        Self {
            min_phase_secs: 0.35,
            max_phase_secs: None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeometryThresholds {
    /// Landmarks at or below this visibility are ignored
    pub visibility: f32,
    /// How far below the elbow the wrist must hang to count as tucked
    pub wrist_tuck_margin: f32,
}

impl Default for GeometryThresholds {
    fn default() -> Self {
        Self {
            visibility: 0.7,
            wrist_tuck_margin: 0.05,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    /// Knee angle above this is standing (enter START, complete rep)
    pub start_angle: f32,
    /// Knee angle below this is the bottom (enter DOWN)
    pub down_angle: f32,
    /// Dipping below this without reaching the bottom earns a depth cue
    pub partial_angle: f32,
    pub too_deep_angle: f32,
    /// Trunk-thigh angle must get below this at the bottom
    pub hip_fold_max: f32,
    /// Hip must sink at least this far between standing and the bottom
    pub min_hip_drop: f32,
    /// Knee may sit this far past the ankle horizontally
    pub knee_over_toe_margin: f32,
    /// Knee span must stay at least this fraction of hip span
    pub valgus_ratio: f32,
    pub min_hold_secs: f64,
    pub lean_min: f32,
    pub lean_max: f32,
    pub timing: TimingThresholds,
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Self {
            start_angle: 160.0,
            down_angle: 90.0,
            partial_angle: 130.0,
            too_deep_angle: 70.0,
            hip_fold_max: 130.0,
            min_hip_drop: 0.10,
            knee_over_toe_margin: 0.10,
            valgus_ratio: 0.70,
            min_hold_secs: 0.25,
            lean_min: 10.0,
            lean_max: 30.0,
            timing: TimingThresholds::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BicepCurlThresholds {
    /// Elbow angle above this is an extended arm (enter START)
    pub start_angle: f32,
    /// Elbow angle below this is the top of the curl (enter UP)
    pub top_angle: f32,
    /// Elbow angle above this leaves the top (enter DOWN)
    pub top_exit_angle: f32,
    /// Elbow angle above this on the way down completes the rep
    pub complete_angle: f32,
    /// Lifting below this without reaching the top earns a range cue
    pub partial_angle: f32,
    /// Upper arm may open this far from the torso
    pub elbow_deviation_max: f32,
    pub body_swing_max: f32,
    pub shoulder_drift_max: f32,
    pub timing: TimingThresholds,
}

impl Default for BicepCurlThresholds {
    fn default() -> Self {
        Self {
            start_angle: 162.0,
            top_angle: 60.0,
            top_exit_angle: 70.0,
            complete_angle: 150.0,
            partial_angle: 100.0,
            elbow_deviation_max: 35.0,
            body_swing_max: 15.0,
            shoulder_drift_max: 0.08,
            timing: TimingThresholds {
                min_phase_secs: 0.35,
                max_phase_secs: Some(3.5),
            },
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShoulderFlexionThresholds {
    /// Flexion below this is an arm at rest (enter START)
    pub rest_angle: f32,
    /// Flexion below this on the way down completes the rep
    pub return_angle: f32,
    /// Flexion above this is a raised arm (enter UP)
    pub up_angle: f32,
    /// Flexion below this leaves the top (enter DOWN)
    pub up_exit_angle: f32,
    /// Peak flexion below this earns a height cue
    pub target_angle: f32,
    /// Smoothed elbow angle must stay above this
    pub elbow_straight_min: f32,
    /// Elbow readings averaged for the straightness check
    pub elbow_window: usize,
    pub lean_max: f32,
    pub timing: TimingThresholds,
}

impl Default for ShoulderFlexionThresholds {
    fn default() -> Self {
        Self {
            rest_angle: 30.0,
            return_angle: 40.0,
            up_angle: 120.0,
            up_exit_angle: 105.0,
            target_angle: 150.0,
            elbow_straight_min: 150.0,
            elbow_window: 3,
            lean_max: 15.0,
            timing: TimingThresholds::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KneeRaiseThresholds {
    /// Knee angle above this is a standing leg
    pub leg_rest_angle: f32,
    /// Knee angle below this is a raised leg
    pub leg_up_angle: f32,
    /// Arm flexion below this is an arm at rest
    pub arm_rest_angle: f32,
    /// Arm flexion above this is a raised arm
    pub arm_up_angle: f32,
    pub hip_tilt_max: f32,
    /// Largest gap between leg and arm reaching the top
    pub sync_lag_max_secs: f64,
    /// Readings averaged per signal
    pub smoothing_window: usize,
    pub timing: TimingThresholds,
}

impl Default for KneeRaiseThresholds {
    fn default() -> Self {
        Self {
            leg_rest_angle: 150.0,
            leg_up_angle: 110.0,
            arm_rest_angle: 30.0,
            arm_up_angle: 80.0,
            hip_tilt_max: 10.0,
            sync_lag_max_secs: 0.5,
            smoothing_window: 2,
            timing: TimingThresholds::default(),
        }
    }
}

impl Thresholds {
    /// Check every enter/exit ordering the machines rely on for hysteresis
    pub fn validate(&self) -> Result<()> {
        let g = &self.geometry;
        ensure((0.0..1.0).contains(&g.visibility), "geometry.visibility must be in [0, 1)")?;

        let s = &self.squat;
        ensure(s.down_angle < s.partial_angle, "squat.down_angle must be below partial_angle")?;
        ensure(s.partial_angle < s.start_angle, "squat.partial_angle must be below start_angle")?;
        ensure(s.too_deep_angle < s.down_angle, "squat.too_deep_angle must be below down_angle")?;
        ensure(s.lean_min < s.lean_max, "squat.lean_min must be below lean_max")?;
        ensure(s.valgus_ratio > 0.0, "squat.valgus_ratio must be positive")?;
        check_timing(&s.timing, "squat")?;

        let c = &self.bicep_curl;
        ensure(c.top_angle < c.top_exit_angle, "bicep_curl.top_angle must be below top_exit_angle")?;
        ensure(c.top_exit_angle < c.partial_angle, "bicep_curl.top_exit_angle must be below partial_angle")?;
        ensure(c.partial_angle < c.complete_angle, "bicep_curl.partial_angle must be below complete_angle")?;
        ensure(c.complete_angle <= c.start_angle, "bicep_curl.complete_angle must not exceed start_angle")?;
        check_timing(&c.timing, "bicep_curl")?;

        let f = &self.shoulder_flexion;
        ensure(f.rest_angle <= f.return_angle, "shoulder_flexion.rest_angle must not exceed return_angle")?;
        ensure(f.return_angle < f.up_exit_angle, "shoulder_flexion.return_angle must be below up_exit_angle")?;
        ensure(f.up_exit_angle < f.up_angle, "shoulder_flexion.up_exit_angle must be below up_angle")?;
        ensure(f.elbow_window > 0, "shoulder_flexion.elbow_window must be positive")?;
        check_timing(&f.timing, "shoulder_flexion")?;

        let k = &self.knee_raise;
        ensure(k.leg_up_angle < k.leg_rest_angle, "knee_raise.leg_up_angle must be below leg_rest_angle")?;
        ensure(k.arm_rest_angle < k.arm_up_angle, "knee_raise.arm_rest_angle must be below arm_up_angle")?;
        ensure(k.smoothing_window > 0, "knee_raise.smoothing_window must be positive")?;
        check_timing(&k.timing, "knee_raise")?;

        Ok(())
    }
}

fn check_timing(timing: &TimingThresholds, section: &str) -> Result<()> {
    ensure(timing.min_phase_secs >= 0.0, &format!("{section}.timing.min_phase_secs must not be negative"))?;
    if let Some(max) = timing.max_phase_secs {
        ensure(max > timing.min_phase_secs, &format!("{section}.timing.max_phase_secs must exceed min_phase_secs"))?;
    }
    Ok(())
}

fn ensure(condition: bool, message: &str) -> Result<()> {
    if condition {
        Ok(())
    } else {
        Err(EngineError::InvalidThresholds(message.to_string()))
    }
}
