//! End-to-end: synthetic 33-landmark frames through a session to counts

use rehab_coach::pose::{Joint, LANDMARK_COUNT};
use rehab_coach::{Cue, EngineError, Exercise, ExerciseCounter, Landmark, SessionStore};

// ============================================================================
// SYNTHETIC POSES
// ============================================================================

/// Every landmark hidden except the given joints
fn frame(joints: &[(Joint, (f32, f32))], visibility: f32) -> Vec<Landmark> {
    let mut landmarks = vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT];
    for &(joint, (x, y)) in joints {
        landmarks[joint.index()] = Landmark::new(x, y, visibility);
    }
    landmarks
}

fn offset(from: (f32, f32), heading_deg: f32, length: f32) -> (f32, f32) {
    let heading = heading_deg.to_radians();
    (from.0 + length * heading.cos(), from.1 + length * heading.sin())
}

/// Left-side view of a squat with the given knee angle and a 20° forward lean
fn squat_pose_at(knee_deg: f32, visibility: f32) -> Vec<Landmark> {
    let ankle = (0.5, 0.9);
    let knee = (0.5, 0.7);
    let hip = offset(knee, 90.0 + knee_deg, 0.2);
    let shoulder = offset(hip, 270.0 + 20.0, 0.3);
    frame(
        &[
            (Joint::LeftShoulder, shoulder),
            (Joint::LeftHip, hip),
            (Joint::LeftKnee, knee),
            (Joint::LeftAnkle, ankle),
        ],
        visibility,
    )
}

fn squat_pose(knee_deg: f32) -> Vec<Landmark> {
    squat_pose_at(knee_deg, 1.0)
}

/// Left arm beside an upright torso with the given elbow angle
fn curl_pose(elbow_deg: f32) -> Vec<Landmark> {
    let shoulder = (0.6, 0.3);
    let elbow = (0.6, 0.5);
    let wrist = offset(elbow, 270.0 - elbow_deg, 0.2);
    frame(
        &[
            (Joint::LeftShoulder, shoulder),
            (Joint::LeftElbow, elbow),
            (Joint::LeftWrist, wrist),
            (Joint::LeftHip, (0.6, 0.7)),
        ],
        1.0,
    )
}

/// Straight left arm raised to the given flexion
fn flexion_pose(flexion_deg: f32) -> Vec<Landmark> {
    let shoulder = (0.5, 0.4);
    let elbow = offset(shoulder, 90.0 - flexion_deg, 0.15);
    let wrist = offset(shoulder, 90.0 - flexion_deg, 0.3);
    frame(
        &[
            (Joint::LeftShoulder, shoulder),
            (Joint::LeftElbow, elbow),
            (Joint::LeftWrist, wrist),
            (Joint::LeftHip, (0.5, 0.7)),
        ],
        1.0,
    )
}

/// Front view: left knee bent to `knee_deg`, right arm raised to
/// `arm_deg`, left hip dropped by `hip_drop`
fn knee_raise_pose(knee_deg: f32, arm_deg: f32, hip_drop: f32) -> Vec<Landmark> {
    let left_hip = (0.55, 0.55 + hip_drop);
    let left_knee = (left_hip.0, left_hip.1 + 0.17);
    let right_shoulder = (0.45, 0.3);
    frame(
        &[
            (Joint::LeftShoulder, (0.55, 0.3)),
            (Joint::LeftWrist, (0.55, 0.6)),
            (Joint::LeftHip, left_hip),
            (Joint::LeftKnee, left_knee),
            (Joint::LeftAnkle, offset(left_knee, knee_deg - 90.0, 0.18)),
            (Joint::RightShoulder, right_shoulder),
            (Joint::RightWrist, offset(right_shoulder, 90.0 - arm_deg, 0.3)),
            (Joint::RightHip, (0.45, 0.55)),
            (Joint::RightKnee, (0.45, 0.72)),
            (Joint::RightAnkle, (0.45, 0.9)),
        ],
        1.0,
    )
}

const KNEE_RAISE: [(f32, f32, f64); 6] = [
    (170.0, 10.0, 0.0),
    (170.0, 10.0, 0.3),
    (100.0, 100.0, 0.6),
    (100.0, 100.0, 0.9),
    (170.0, 10.0, 1.5),
    (170.0, 10.0, 1.8),
];

// ============================================================================
// SCENARIOS
// ============================================================================

#[test]
fn squat_counts_through_the_pipeline() {
    let mut counter = ExerciseCounter::new();

    let report = counter.process("squat", &squat_pose(165.0), 0.0).unwrap();
    assert_eq!(report.state, "SQUAT_START");

    let report = counter.process("squat", &squat_pose(80.0), 0.5).unwrap();
    assert_eq!(report.state, "SQUAT_DOWN");
    assert_eq!(report.cues, vec![Cue::StandUp]);

    let report = counter.process("squat", &squat_pose(170.0), 1.2).unwrap();
    assert_eq!(report.squat_count, 1);
    assert_eq!(report.total_reps, 1);
    assert_eq!(report.state, "SQUAT_START");
    assert!(report.rep_completed);
    assert_eq!(report.cues, vec![Cue::LowerYourself]);
}

#[test]
fn rushed_squat_is_not_counted() {
    let mut counter = ExerciseCounter::new();
    counter.process("squat", &squat_pose(165.0), 0.0).unwrap();
    counter.process("squat", &squat_pose(80.0), 0.01).unwrap();
    let report = counter.process("squat", &squat_pose(170.0), 0.02).unwrap();

    assert_eq!(report.squat_count, 0);
    assert_eq!(report.state, "SQUAT_START");
    assert!(!report.rep_completed);
    assert_eq!(report.cues[0], Cue::TooFast);
    assert_eq!(report.feedback[0], Cue::TooFast.default_text());
    assert_eq!(counter.summary(Exercise::Squat).rejected, 1);
}

#[test]
fn curl_counts_through_the_pipeline() {
    let mut counter = ExerciseCounter::new();
    for (angle, t) in [(170.0, 0.0), (120.0, 0.4), (50.0, 1.0), (90.0, 1.6)] {
        counter.process("bicep-curl", &curl_pose(angle), t).unwrap();
    }
    let report = counter.process("bicep-curl", &curl_pose(160.0), 2.0).unwrap();
    assert_eq!(report.curl_count, 1);
    assert_eq!(report.curl_state, "CURL_START");
    assert_eq!(report.active_side, Some("left"));
}

#[test]
fn shoulder_flexion_counts_through_the_pipeline() {
    let mut counter = ExerciseCounter::new();
    for (flexion, t) in [(10.0, 0.0), (80.0, 0.6), (160.0, 1.0), (90.0, 1.5)] {
        counter.process("shoulder-flexion", &flexion_pose(flexion), t).unwrap();
    }
    let report = counter.process("shoulder-flexion", &flexion_pose(20.0), 2.0).unwrap();
    assert_eq!(report.shoulder_flexion_count, 1);
    assert_eq!(report.state, "FLEXION_START");
    assert_eq!(report.active_side, Some("left"));
}

#[test]
fn knee_raise_pairs_leg_with_opposite_arm() {
    let mut counter = ExerciseCounter::new();
    let mut last = None;
    for (knee, arm, t) in KNEE_RAISE {
        let report = counter.process("knee-raise", &knee_raise_pose(knee, arm, 0.0), t).unwrap();
        if t == 0.9 {
            assert_eq!(report.state, "KNEE_RAISE_UP");
        }
        last = Some(report);
    }
    let report = last.unwrap();
    assert_eq!(report.knee_raise_count, 1);
    assert_eq!(report.state, "KNEE_RAISE_START");
    assert_eq!(report.active_side, Some("left_leg_right_arm"));
    assert!(report.rep_completed);
}

#[test]
fn tilted_hips_block_knee_raise() {
    let mut counter = ExerciseCounter::new();
    let mut last = None;
    for (knee, arm, t) in KNEE_RAISE {
        let hip_drop = if t == 0.9 { 0.03 } else { 0.0 };
        last = Some(counter.process("knee-raise", &knee_raise_pose(knee, arm, hip_drop), t).unwrap());
    }
    let report = last.unwrap();
    assert_eq!(report.knee_raise_count, 0);
    assert!(!report.rep_completed);
    assert_eq!(report.cues, vec![Cue::KeepHipsLevel]);
    assert_eq!(counter.summary(Exercise::KneeRaise).rejected, 1);
}

// ============================================================================
// PROPERTIES
// ============================================================================

#[test]
fn any_visibility_is_processed() {
    let mut counter = ExerciseCounter::new();
    for visibility in [0.0, 0.599, 0.6, 0.601, 0.7, 1.0] {
        for exercise in Exercise::ALL {
            let landmarks = vec![Landmark::new(0.4, 0.6, visibility); LANDMARK_COUNT];
            assert!(counter.process(exercise.as_str(), &landmarks, 0.0).is_ok());
        }
    }
}

#[test]
fn visibility_threshold_is_exclusive() {
    let mut counter = ExerciseCounter::new();
    let report = counter.process("squat", &squat_pose_at(165.0, 0.7), 0.0).unwrap();
    assert_eq!(report.state, "IDLE");

    let report = counter.process("squat", &squat_pose_at(165.0, 0.701), 0.1).unwrap();
    assert_eq!(report.state, "SQUAT_START");
}

#[test]
fn repeated_rest_frames_change_nothing() {
    let mut counter = ExerciseCounter::new();
    let bent = squat_pose(120.0);
    for i in 0..30 {
        let report = counter.process("squat", &bent, i as f64 * 0.05).unwrap();
        assert_eq!(report.state, "IDLE");
        assert_eq!(report.total_reps, 0);
    }
}

#[test]
fn short_frame_is_rejected_without_side_effects() {
    let mut counter = ExerciseCounter::new();
    counter.process("squat", &squat_pose(165.0), 0.0).unwrap();

    let bottom = squat_pose(80.0);
    let err = counter.process("squat", &bottom[..32], 0.5).unwrap_err();
    assert_eq!(err, EngineError::InsufficientData { got: 32, need: 33 });
    assert_eq!(counter.state_name(Exercise::Squat), "SQUAT_START");
}

#[test]
fn reset_returns_to_idle() {
    let mut counter = ExerciseCounter::new();
    counter.process("squat", &squat_pose(165.0), 0.0).unwrap();
    counter.process("squat", &squat_pose(80.0), 0.5).unwrap();
    counter.process("squat", &squat_pose(170.0), 1.2).unwrap();
    assert_eq!(counter.total_reps(), 1);

    counter.reset("squat");
    let report = counter.process("squat", &squat_pose(120.0), 2.0).unwrap();
    assert_eq!(report.state, "IDLE");
    assert_eq!(report.squat_count, 0);
    assert_eq!(report.total_reps, 0);

    counter.process("bicep-curl", &curl_pose(170.0), 3.0).unwrap();
    counter.reset("all");
    assert_eq!(counter.state_name(Exercise::BicepCurl), "IDLE");
}

#[test]
fn sessions_do_not_share_machines() {
    let mut store = SessionStore::new();
    store.process("alice", "squat", &squat_pose(165.0), 0.0).unwrap();
    store.process("bob", "squat", &squat_pose(120.0), 0.2).unwrap();
    store.process("alice", "squat", &squat_pose(80.0), 0.5).unwrap();
    store.process("bob", "squat", &squat_pose(170.0), 0.7).unwrap();
    let report = store.process("alice", "squat", &squat_pose(170.0), 1.2).unwrap();
    assert_eq!(report.squat_count, 1);

    let bob = store.end("bob").unwrap();
    assert_eq!(bob[0].reps, 0);
    let alice = store.end("alice").unwrap();
    assert_eq!(alice[0].reps, 1);
    assert!((alice[0].accuracy - 100.0).abs() < 1e-4);
}
