//! Coaching cues and their display text
//!
//! Trackers emit `Cue` keys, never text. The `Catalog` turns a key into the
//! string shown to the user, so the language lives with the caller.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Feedback tiers; higher surfaces first
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Priority {
    Low = 1,
    Medium = 2,
    High = 3,
}

/// Every message the trackers can raise
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cue {
    // Timing (critical)
    TooFast,
    TooSlow,

    // Squat
    KneesPastToes,
    KneesCavingIn,
    HoldAtBottom,
    HipsNotLowEnough,
    FoldAtHips,
    SquatDeeper,
    SquatTooDeep,
    LeanForward,
    LeanForwardLess,

    // Bicep curl
    ElbowAwayFromBody,
    CurlHigher,
    ExtendArmFully,
    KeepBodyStill,
    KeepShoulderStill,
    LetArmHang,

    // Shoulder flexion
    KeepElbowStraight,
    RaiseArmHigher,
    KeepTorsoUpright,

    // Knee raise
    KeepHipsLevel,
    MoveArmAndLegTogether,

    // Guidance by state
    GetInPosition,
    LowerYourself,
    StandUp,
    CurlUp,
    LowerYourArm,
    RaiseYourArm,
    RaiseKneeAndArm,
    LowerKneeAndArm,
}

impl Cue {
    /// Built-in English text
    pub fn default_text(&self) -> &'static str {
        match self {
            Cue::TooFast => "Too fast - slow down",
            Cue::TooSlow => "Too slow - keep a steady pace",
            Cue::KneesPastToes => "Keep your knees behind your toes",
            Cue::KneesCavingIn => "Push your knees outward",
            Cue::HoldAtBottom => "Pause briefly at the bottom",
            Cue::HipsNotLowEnough => "Sink your hips lower",
            Cue::FoldAtHips => "Sit back and fold at the hips",
            Cue::SquatDeeper => "Lower yourself deeper",
            Cue::SquatTooDeep => "Don't go too deep",
            Cue::LeanForward => "Lean your chest slightly forward",
            Cue::LeanForwardLess => "Don't lean too far forward",
            Cue::ElbowAwayFromBody => "Keep your elbow close to your body",
            Cue::CurlHigher => "Curl higher",
            Cue::ExtendArmFully => "Extend your arm fully at the bottom",
            Cue::KeepBodyStill => "Keep your body straight, don't swing",
            Cue::KeepShoulderStill => "Keep your shoulder steady",
            Cue::LetArmHang => "Let your arm hang fully before curling",
            Cue::KeepElbowStraight => "Keep your elbow straight",
            Cue::RaiseArmHigher => "Raise your arm higher",
            Cue::KeepTorsoUpright => "Keep your torso upright",
            Cue::KeepHipsLevel => "Keep your hips level",
            Cue::MoveArmAndLegTogether => "Raise your arm and opposite knee together",
            Cue::GetInPosition => "Get into the starting position",
            Cue::LowerYourself => "Lower yourself",
            Cue::StandUp => "Stand back up",
            Cue::CurlUp => "Curl your arm up",
            Cue::LowerYourArm => "Lower your arm slowly",
            Cue::RaiseYourArm => "Raise your arm",
            Cue::RaiseKneeAndArm => "Raise your knee and opposite arm",
            Cue::LowerKneeAndArm => "Lower your knee and arm",
        }
    }
}

/// Display text for cues, with caller overrides on top of the defaults
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    overrides: HashMap<Cue, String>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the text for one cue
    pub fn set_message(&mut self, cue: Cue, text: impl Into<String>) {
        self.overrides.insert(cue, text.into());
    }

    /// Replace several cues at once (e.g. a whole translation)
    pub fn extend(&mut self, messages: HashMap<Cue, String>) {
        self.overrides.extend(messages);
    }

    pub fn text(&self, cue: Cue) -> &str {
        self.overrides
            .get(&cue)
            .map(String::as_str)
            .unwrap_or_else(|| cue.default_text())
    }

    /// Render a cue list as display strings
    pub fn render(&self, cues: &[Cue]) -> Vec<String> {
        cues.iter().map(|&cue| self.text(cue).to_string()).collect()
    }
}
