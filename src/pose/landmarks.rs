//! Pose landmarks and the joint index table
//!
//! MediaPipe Pose emits 33 landmarks per frame in a fixed order. The mapping
//! from that order to anatomical joints is declared once here in `Joint`;
//! everything downstream asks a `Pose` for a joint by name.

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Number of landmarks per frame (MediaPipe Pose)
pub const LANDMARK_COUNT: usize = 33;

/// Values per landmark in the flat bridge encoding: x, y, z, visibility
pub const VALUES_PER_LANDMARK: usize = 4;

// ============================================================================
// JOINT INDICES (MediaPipe Pose - 33 total)
// ============================================================================

/// Joints the exercise engine reads, with their pose-model index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Joint {
    LeftShoulder,
    RightShoulder,
    LeftElbow,
    RightElbow,
    LeftWrist,
    RightWrist,
    LeftHip,
    RightHip,
    LeftKnee,
    RightKnee,
    LeftAnkle,
    RightAnkle,
}

impl Joint {
    /// Position of this joint in the pose model's output
    pub const fn index(self) -> usize {
        match self {
            Joint::LeftShoulder => 11,
            Joint::RightShoulder => 12,
            Joint::LeftElbow => 13,
            Joint::RightElbow => 14,
            Joint::LeftWrist => 15,
            Joint::RightWrist => 16,
            Joint::LeftHip => 23,
            Joint::RightHip => 24,
            Joint::LeftKnee => 25,
            Joint::RightKnee => 26,
            Joint::LeftAnkle => 27,
            Joint::RightAnkle => 28,
        }
    }
}

impl Joint {
    pub const fn shoulder(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftShoulder,
            Side::Right => Joint::RightShoulder,
        }
    }

    pub const fn elbow(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftElbow,
            Side::Right => Joint::RightElbow,
        }
    }

    pub const fn wrist(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftWrist,
            Side::Right => Joint::RightWrist,
        }
    }

    pub const fn hip(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftHip,
            Side::Right => Joint::RightHip,
        }
    }

    pub const fn knee(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftKnee,
            Side::Right => Joint::RightKnee,
        }
    }

    pub const fn ankle(side: Side) -> Self {
        match side {
            Side::Left => Joint::LeftAnkle,
            Side::Right => Joint::RightAnkle,
        }
    }
}

/// Body side, as labelled by the pose model (subject's left/right)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A value measured once per body side
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Bilateral<T> {
    pub left: T,
    pub right: T,
}

impl<T: Copy> Bilateral<T> {
    pub fn new(left: T, right: T) -> Self {
        Self { left, right }
    }

    /// Evaluate `f` for each side
    pub fn from_fn(mut f: impl FnMut(Side) -> T) -> Self {
        Self {
            left: f(Side::Left),
            right: f(Side::Right),
        }
    }

    pub fn get(&self, side: Side) -> T {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
        }
    }
}

// ============================================================================
// LANDMARK DATA STRUCTURE
// ============================================================================

/// A single landmark (normalized image coordinates)
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32, // 0-1 normalized
    pub y: f32, // 0-1 normalized, grows downward
    #[serde(default)]
    pub z: f32, // Relative depth
    #[serde(default)]
    pub visibility: f32, // 0-1 confidence
}

impl Landmark {
    pub fn new(x: f32, y: f32, visibility: f32) -> Self {
        Self { x, y, z: 0.0, visibility }
    }

    /// Image-plane position
    pub fn xy(&self) -> Vector2<f32> {
        Vector2::new(self.x, self.y)
    }

    /// Strictly above the threshold counts as visible
    pub fn is_visible(&self, threshold: f32) -> bool {
        self.visibility > threshold
    }
}

/// One frame of landmarks, validated to the pose model's full length
#[derive(Clone, Debug, PartialEq)]
pub struct Pose {
    landmarks: [Landmark; LANDMARK_COUNT],
}

impl Pose {
    /// Build from an ordered landmark list; extra trailing entries are ignored
    pub fn from_landmarks(landmarks: &[Landmark]) -> Result<Self> {
        if landmarks.len() < LANDMARK_COUNT {
            return Err(EngineError::InsufficientData {
                got: landmarks.len(),
                need: LANDMARK_COUNT,
            });
        }
        let mut frame = [Landmark::default(); LANDMARK_COUNT];
        frame.copy_from_slice(&landmarks[..LANDMARK_COUNT]);
        Ok(Self { landmarks: frame })
    }

    /// Build from the flat bridge encoding (x, y, z, visibility per landmark)
    pub fn from_flat(data: &[f32]) -> Result<Self> {
        let got = data.len() / VALUES_PER_LANDMARK;
        if got < LANDMARK_COUNT {
            return Err(EngineError::InsufficientData {
                got,
                need: LANDMARK_COUNT,
            });
        }
        let mut frame = [Landmark::default(); LANDMARK_COUNT];
        for (i, slot) in frame.iter_mut().enumerate() {
            let base = i * VALUES_PER_LANDMARK;
            *slot = Landmark {
                x: data[base],
                y: data[base + 1],
                z: data[base + 2],
                visibility: data[base + 3],
            };
        }
        Ok(Self { landmarks: frame })
    }

    /// Landmark for a named joint
    pub fn joint(&self, joint: Joint) -> &Landmark {
        &self.landmarks[joint.index()]
    }
}
