//! Exercise session aggregator
//!
//! One live machine per exercise. Each frame is measured once and handed to
//! the machine the caller names; the others keep their state untouched.

use log::{debug, info};

use super::exercise::Exercise;
use super::report::{ExerciseSummary, FrameReport, FEEDBACK_SEPARATOR};
use crate::config::Thresholds;
use crate::error::Result;
use crate::exercise::{
    BicepCurlTracker, CurlFrame, FlexionFrame, KneeRaiseFrame, KneeRaiseTracker, RepTracker,
    ShoulderFlexionTracker, SquatFrame, SquatTracker,
};
use crate::feedback::{Catalog, Cue};
use crate::geometry::AngleBundle;
use crate::pose::{Landmark, Pose};

/// State name reported for an unrecognized exercise
pub const UNKNOWN_STATE: &str = "UNKNOWN";

pub struct ExerciseCounter {
    thresholds: Thresholds,
    catalog: Catalog,
    squat: SquatTracker,
    curl: BicepCurlTracker,
    flexion: ShoulderFlexionTracker,
    knee_raise: KneeRaiseTracker,
}

impl ExerciseCounter {
    pub fn new() -> Self {
        Self::with_config(Thresholds::default(), Catalog::default())
    }

    pub fn with_config(thresholds: Thresholds, catalog: Catalog) -> Self {
        Self {
            thresholds,
            catalog,
            squat: SquatTracker::new(),
            curl: BicepCurlTracker::new(),
            flexion: ShoulderFlexionTracker::new(),
            knee_raise: KneeRaiseTracker::new(),
        }
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Swap in new thresholds; they apply from the next frame
    ///
    /// Rejected thresholds leave the current ones in force.
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<()> {
        thresholds.validate()?;
        self.thresholds = thresholds;
        debug!("session: thresholds updated");
        Ok(())
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn catalog_mut(&mut self) -> &mut Catalog {
        &mut self.catalog
    }

    // ========================================================================
    // FRAME PROCESSING
    // ========================================================================

    /// Process one frame of landmarks taken at `now` (seconds)
    ///
    /// Fewer than 33 landmarks is rejected before any state changes.
    pub fn process(&mut self, exercise: &str, landmarks: &[Landmark], now: f64) -> Result<FrameReport> {
        let pose = Pose::from_landmarks(landmarks)?;
        Ok(self.process_pose(exercise, &pose, now))
    }

    /// Same as `process`, from flat `[x, y, z, visibility]` values
    pub fn process_flat(&mut self, exercise: &str, data: &[f32], now: f64) -> Result<FrameReport> {
        let pose = Pose::from_flat(data)?;
        Ok(self.process_pose(exercise, &pose, now))
    }

    pub fn process_pose(&mut self, name: &str, pose: &Pose, now: f64) -> FrameReport {
        let Some(exercise) = Exercise::from_name(name) else {
            debug!("session: unknown exercise '{name}', frame ignored");
            return self.report(name, UNKNOWN_STATE, None, Vec::new(), false);
        };

        let angles = AngleBundle::compute(pose, &self.thresholds.geometry);
        let before = self.tracker(exercise).reps();

        match exercise {
            Exercise::Squat => {
                let frame = SquatFrame::from_pose(pose, &angles, &self.thresholds.geometry);
                self.squat.update(&frame, &self.thresholds.squat, now);
            }
            Exercise::BicepCurl => {
                let frame = CurlFrame::from_pose(pose, &angles, &self.thresholds.geometry);
                self.curl.update(&frame, &self.thresholds.bicep_curl, now);
            }
            Exercise::ShoulderFlexion => {
                let frame = FlexionFrame::from_angles(&angles);
                self.flexion.update(&frame, &self.thresholds.shoulder_flexion, now);
            }
            Exercise::KneeRaise => {
                let frame = KneeRaiseFrame::from_angles(&angles);
                self.knee_raise.update(&frame, &self.thresholds.knee_raise, now);
            }
        }

        let tracker = self.tracker_mut(exercise);
        let rep_completed = tracker.reps() > before;
        let cues = match tracker.take_rep_summary().filter(|summary| !summary.is_empty()) {
            Some(summary) => summary,
            None => {
                let live = tracker.live_feedback();
                if live.is_empty() {
                    vec![tracker.guidance()]
                } else {
                    live
                }
            }
        };
        let state = tracker.state_name();
        let active_side = tracker.active_side();

        self.report(name, state, active_side, cues, rep_completed)
    }

    fn report(
        &self,
        exercise: &str,
        state: &'static str,
        active_side: Option<&'static str>,
        cues: Vec<Cue>,
        rep_completed: bool,
    ) -> FrameReport {
        let feedback = self.catalog.render(&cues);
        FrameReport {
            exercise: exercise.to_string(),
            state,
            squat_count: self.squat.reps(),
            curl_count: self.curl.reps(),
            shoulder_flexion_count: self.flexion.reps(),
            knee_raise_count: self.knee_raise.reps(),
            total_reps: self.total_reps(),
            squat_state: self.squat.state_name(),
            curl_state: self.curl.state_name(),
            shoulder_flexion_state: self.flexion.state_name(),
            knee_raise_state: self.knee_raise.state_name(),
            active_side,
            cues,
            feedback_text: feedback.join(FEEDBACK_SEPARATOR),
            feedback,
            rep_completed,
        }
    }

    // ========================================================================
    // COUNTERS
    // ========================================================================

    pub fn tracker(&self, exercise: Exercise) -> &dyn RepTracker {
        match exercise {
            Exercise::Squat => &self.squat,
            Exercise::BicepCurl => &self.curl,
            Exercise::ShoulderFlexion => &self.flexion,
            Exercise::KneeRaise => &self.knee_raise,
        }
    }

    fn tracker_mut(&mut self, exercise: Exercise) -> &mut dyn RepTracker {
        match exercise {
            Exercise::Squat => &mut self.squat,
            Exercise::BicepCurl => &mut self.curl,
            Exercise::ShoulderFlexion => &mut self.flexion,
            Exercise::KneeRaise => &mut self.knee_raise,
        }
    }

    pub fn count(&self, exercise: Exercise) -> u32 {
        self.tracker(exercise).reps()
    }

    pub fn state_name(&self, exercise: Exercise) -> &'static str {
        self.tracker(exercise).state_name()
    }

    /// Reps across all exercises
    pub fn total_reps(&self) -> u32 {
        Exercise::ALL.iter().map(|&exercise| self.count(exercise)).sum()
    }

    /// Reset one exercise, or every exercise for "all" or an unknown name
    pub fn reset(&mut self, name: &str) {
        match Exercise::from_name(name) {
            Some(exercise) => {
                self.tracker_mut(exercise).reset();
                info!("session: {exercise} reset");
            }
            None => {
                for exercise in Exercise::ALL {
                    self.tracker_mut(exercise).reset();
                }
                info!("session: all exercises reset");
            }
        }
    }

    pub fn summary(&self, exercise: Exercise) -> ExerciseSummary {
        let tracker = self.tracker(exercise);
        ExerciseSummary::new(exercise, tracker.reps(), tracker.rejected())
    }

    pub fn summaries(&self) -> Vec<ExerciseSummary> {
        Exercise::ALL.iter().map(|&exercise| self.summary(exercise)).collect()
    }
}

impl Default for ExerciseCounter {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::EngineError;
    use crate::pose::LANDMARK_COUNT;

    fn hidden_frame() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn test_short_frame_rejected() {
        let mut counter = ExerciseCounter::new();
        let err = counter.process("squat", &hidden_frame()[..20], 0.0).unwrap_err();
        assert_eq!(err, EngineError::InsufficientData { got: 20, need: 33 });
        assert_eq!(counter.state_name(Exercise::Squat), "IDLE");
    }

    #[test]
    fn test_unknown_exercise_is_noop() {
        let mut counter = ExerciseCounter::new();
        let report = counter.process("jumping-jacks", &hidden_frame(), 0.0).unwrap();
        assert_eq!(report.state, UNKNOWN_STATE);
        assert_eq!(report.total_reps, 0);
        assert_eq!(report.squat_state, "IDLE");
        assert!(report.feedback.is_empty());
        assert_eq!(report.feedback_text, "");
    }

    #[test]
    fn test_guidance_when_nothing_to_correct() {
        let mut counter = ExerciseCounter::new();
        let report = counter.process("bicep-curl", &hidden_frame(), 0.0).unwrap();
        assert_eq!(report.state, "IDLE");
        assert_eq!(report.cues, vec![Cue::GetInPosition]);
        assert_eq!(report.feedback_text, Cue::GetInPosition.default_text());
        assert!(!report.rep_completed);
    }

    #[test]
    fn test_catalog_override_in_report() {
        let mut counter = ExerciseCounter::new();
        counter.catalog_mut().set_message(Cue::GetInPosition, "Colócate en posición");
        let report = counter.process("knee-raise", &hidden_frame(), 0.0).unwrap();
        assert_eq!(report.feedback, vec!["Colócate en posición".to_string()]);
    }

    #[test]
    fn test_invalid_thresholds_keep_previous() {
        let mut counter = ExerciseCounter::new();
        let mut bad = Thresholds::default();
        bad.squat.down_angle = 170.0;
        assert!(matches!(counter.set_thresholds(bad), Err(EngineError::InvalidThresholds(_))));
        assert_eq!(counter.thresholds(), &Thresholds::default());

        let mut good = Thresholds::default();
        good.bicep_curl.elbow_deviation_max = 25.0;
        counter.set_thresholds(good.clone()).unwrap();
        assert_eq!(counter.thresholds(), &good);
    }

    #[test]
    fn test_summaries_cover_every_exercise() {
        let counter = ExerciseCounter::new();
        let summaries = counter.summaries();
        assert_eq!(summaries.len(), 4);
        assert!(summaries.iter().all(|s| s.reps == 0 && s.rejected == 0));
    }
}
