//! Sessions keyed by caller-chosen id
//!
//! Each session owns its own `ExerciseCounter`, so frames from different
//! users never touch the same machines. New sessions copy the store's current
//! thresholds and messages.
//!
//! Sessions live until `end` or `evict_idle`. A page that never ends its
//! sessions should call `evict_idle` periodically.

use std::collections::HashMap;

use log::info;

use super::counter::ExerciseCounter;
use super::report::{ExerciseSummary, FrameReport};
use crate::config::Thresholds;
use crate::error::Result;
use crate::feedback::{Catalog, Cue};
use crate::pose::{Landmark, Pose};

#[derive(Default)]
pub struct SessionStore {
    sessions: HashMap<String, ExerciseCounter>,
    /// Timestamp of each session's latest frame
    last_frame_at: HashMap<String, f64>,
    thresholds: Thresholds,
    catalog: Catalog,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Session for `id`, created on first use
    pub fn session_mut(&mut self, id: &str) -> &mut ExerciseCounter {
        let Self {
            sessions,
            thresholds,
            catalog,
            ..
        } = self;
        sessions.entry(id.to_string()).or_insert_with(|| {
            info!("sessions: opened '{id}'");
            ExerciseCounter::with_config(thresholds.clone(), catalog.clone())
        })
    }

    pub fn session(&self, id: &str) -> Option<&ExerciseCounter> {
        self.sessions.get(id)
    }

    /// Process a frame for one session
    ///
    /// The landmarks are validated first, so a short frame neither creates
    /// a session nor changes one.
    pub fn process(
        &mut self,
        id: &str,
        exercise: &str,
        landmarks: &[Landmark],
        now: f64,
    ) -> Result<FrameReport> {
        let pose = Pose::from_landmarks(landmarks)?;
        Ok(self.process_pose(id, exercise, &pose, now))
    }

    pub fn process_flat(&mut self, id: &str, exercise: &str, data: &[f32], now: f64) -> Result<FrameReport> {
        let pose = Pose::from_flat(data)?;
        Ok(self.process_pose(id, exercise, &pose, now))
    }

    fn process_pose(&mut self, id: &str, exercise: &str, pose: &Pose, now: f64) -> FrameReport {
        self.last_frame_at.insert(id.to_string(), now);
        self.session_mut(id).process_pose(exercise, pose, now)
    }

    /// Reset an exercise (or all) in an existing session
    pub fn reset(&mut self, id: &str, exercise: &str) {
        if let Some(session) = self.sessions.get_mut(id) {
            session.reset(exercise);
        }
    }

    /// Drop a session, returning its final summaries
    pub fn end(&mut self, id: &str) -> Option<Vec<ExerciseSummary>> {
        let session = self.sessions.remove(id)?;
        self.last_frame_at.remove(id);
        info!("sessions: closed '{id}'");
        Some(session.summaries())
    }

    /// End every session whose latest frame is more than `max_idle_secs`
    /// before `now`, returning the ids closed
    ///
    /// A session that has never seen a frame counts as idle.
    pub fn evict_idle(&mut self, now: f64, max_idle_secs: f64) -> Vec<String> {
        let idle: Vec<String> = self
            .sessions
            .keys()
            .filter(|id| {
                self.last_frame_at
                    .get(*id)
                    .map_or(true, |&seen| now - seen > max_idle_secs)
            })
            .cloned()
            .collect();
        for id in &idle {
            self.end(id);
        }
        if !idle.is_empty() {
            info!("sessions: evicted {} idle", idle.len());
        }
        idle
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Validate and apply thresholds to every session and to new ones
    pub fn set_thresholds(&mut self, thresholds: Thresholds) -> Result<()> {
        thresholds.validate()?;
        for session in self.sessions.values_mut() {
            session.set_thresholds(thresholds.clone())?;
        }
        self.thresholds = thresholds;
        Ok(())
    }

    /// Override display text for cues in every session and in new ones
    pub fn set_messages(&mut self, messages: HashMap<Cue, String>) {
        for session in self.sessions.values_mut() {
            session.catalog_mut().extend(messages.clone());
        }
        self.catalog.extend(messages);
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pose::LANDMARK_COUNT;
    use crate::session::Exercise;

    fn frame() -> Vec<Landmark> {
        vec![Landmark::new(0.5, 0.5, 0.0); LANDMARK_COUNT]
    }

    #[test]
    fn test_sessions_are_independent() {
        let mut store = SessionStore::new();
        store.process("alice", "squat", &frame(), 0.0).unwrap();
        store.process("bob", "bicep-curl", &frame(), 0.0).unwrap();
        assert_eq!(store.len(), 2);

        let summaries = store.end("alice").unwrap();
        assert_eq!(summaries.len(), 4);
        assert_eq!(summaries[0].exercise, Exercise::Squat);
        assert_eq!(store.len(), 1);
        assert!(store.end("alice").is_none());
    }

    #[test]
    fn test_short_frame_opens_no_session() {
        let mut store = SessionStore::new();
        assert!(store.process("alice", "squat", &frame()[..5], 0.0).is_err());
        assert!(store.is_empty());
    }

    #[test]
    fn test_idle_sessions_are_evicted() {
        let mut store = SessionStore::new();
        store.process("alice", "squat", &frame(), 0.0).unwrap();
        store.process("bob", "squat", &frame(), 50.0).unwrap();

        assert!(store.evict_idle(55.0, 60.0).is_empty());
        assert_eq!(store.evict_idle(70.0, 60.0), vec!["alice".to_string()]);
        assert_eq!(store.len(), 1);
        assert!(store.session("bob").is_some());

        store.process("bob", "squat", &frame(), 100.0).unwrap();
        assert!(store.evict_idle(150.0, 60.0).is_empty());
        assert_eq!(store.evict_idle(161.0, 60.0), vec!["bob".to_string()]);
        assert!(store.is_empty());
    }

    #[test]
    fn test_settings_reach_existing_and_new_sessions() {
        let mut store = SessionStore::new();
        store.session_mut("alice");

        let mut thresholds = Thresholds::default();
        thresholds.knee_raise.hip_tilt_max = 8.0;
        store.set_thresholds(thresholds.clone()).unwrap();

        let mut messages = HashMap::new();
        messages.insert(Cue::StandUp, "Levántate".to_string());
        store.set_messages(messages);

        for id in ["alice", "bob"] {
            let session = store.session_mut(id);
            assert_eq!(session.thresholds(), &thresholds);
            assert_eq!(session.catalog().text(Cue::StandUp), "Levántate");
        }
    }
}
