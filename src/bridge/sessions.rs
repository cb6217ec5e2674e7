//! `WorkoutSessions` - the session store as a JS class
//!
//! The page owns one instance and passes a session id with every frame.
//! Reports and summaries cross the boundary as plain JS objects.
//!
//! ```javascript
//! const sessions = new WorkoutSessions();
//! const report = sessions.processFrame('user-1', 'squat', results.poseLandmarks);
//! label.textContent = report.feedback_text;
//! ```

use std::collections::HashMap;

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::config::Thresholds;
use crate::error::EngineError;
use crate::feedback::Cue;
use crate::pose::Landmark;
use crate::session::SessionStore;

fn to_js(err: EngineError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn to_value<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

fn from_value<T: serde::de::DeserializeOwned>(value: JsValue) -> Result<T, JsValue> {
    serde_wasm_bindgen::from_value(value).map_err(|e| to_js(EngineError::Decode(e.to_string())))
}

/// Frame time in seconds when the caller doesn't pass one
fn now_secs() -> f64 {
    js_sys::Date::now() / 1000.0
}

#[wasm_bindgen]
pub struct WorkoutSessions {
    store: SessionStore,
}

#[wasm_bindgen]
impl WorkoutSessions {
    #[wasm_bindgen(constructor)]
    pub fn new() -> WorkoutSessions {
        WorkoutSessions {
            store: SessionStore::new(),
        }
    }

    // ========================================================================
    // FRAMES
    // ========================================================================

    /// Process one frame of `{x, y, z, visibility}` landmarks
    ///
    /// @param {string} session_id
    /// @param {string} exercise - "squat", "bicep-curl", "shoulder-flexion" or "knee-raise"
    /// @param {Array} landmarks - the 33 pose landmarks
    /// @param {number | undefined} timestamp - frame time in seconds
    /// @returns {object} frame report
    #[wasm_bindgen(js_name = processFrame)]
    pub fn process_frame(
        &mut self,
        session_id: &str,
        exercise: &str,
        landmarks: JsValue,
        timestamp: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        let landmarks: Vec<Landmark> = from_value(landmarks)?;
        let now = timestamp.unwrap_or_else(now_secs);
        let report = self
            .store
            .process(session_id, exercise, &landmarks, now)
            .map_err(to_js)?;
        to_value(&report)
    }

    /// Process one frame from a flat Float32Array (x, y, z, visibility per landmark)
    #[wasm_bindgen(js_name = processFlat)]
    pub fn process_flat(
        &mut self,
        session_id: &str,
        exercise: &str,
        data: &[f32],
        timestamp: Option<f64>,
    ) -> Result<JsValue, JsValue> {
        let now = timestamp.unwrap_or_else(now_secs);
        let report = self
            .store
            .process_flat(session_id, exercise, data, now)
            .map_err(to_js)?;
        to_value(&report)
    }

    // ========================================================================
    // SESSION LIFECYCLE
    // ========================================================================

    /// Switch exercise: resets that exercise ("all" resets every one)
    #[wasm_bindgen(js_name = selectExercise)]
    pub fn select_exercise(&mut self, session_id: &str, exercise: &str) {
        self.store.reset(session_id, exercise);
    }

    /// Per-exercise summaries for a live session, or undefined
    pub fn summaries(&self, session_id: &str) -> Result<JsValue, JsValue> {
        match self.store.session(session_id) {
            Some(session) => to_value(&session.summaries()),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// Close a session and return its summaries, or undefined if unknown
    #[wasm_bindgen(js_name = endSession)]
    pub fn end_session(&mut self, session_id: &str) -> Result<JsValue, JsValue> {
        match self.store.end(session_id) {
            Some(summaries) => to_value(&summaries),
            None => Ok(JsValue::UNDEFINED),
        }
    }

    /// End sessions with no frame for `max_idle_secs`; returns their ids
    ///
    /// @param {number} max_idle_secs
    /// @param {number | undefined} timestamp - current time in seconds
    #[wasm_bindgen(js_name = evictIdle)]
    pub fn evict_idle(&mut self, max_idle_secs: f64, timestamp: Option<f64>) -> Result<JsValue, JsValue> {
        let now = timestamp.unwrap_or_else(now_secs);
        to_value(&self.store.evict_idle(now, max_idle_secs))
    }

    #[wasm_bindgen(js_name = sessionCount)]
    pub fn session_count(&self) -> usize {
        self.store.len()
    }

    // ========================================================================
    // SETTINGS
    // ========================================================================

    /// Replace the thresholds; omitted fields take their defaults
    #[wasm_bindgen(js_name = setThresholds)]
    pub fn set_thresholds(&mut self, thresholds: JsValue) -> Result<(), JsValue> {
        let thresholds: Thresholds = from_value(thresholds)?;
        self.store.set_thresholds(thresholds).map_err(to_js)
    }

    #[wasm_bindgen(js_name = getThresholds)]
    pub fn get_thresholds(&self) -> Result<JsValue, JsValue> {
        to_value(self.store.thresholds())
    }

    /// Override cue text, e.g. `{ stand_up: "Levántate" }`
    #[wasm_bindgen(js_name = setMessages)]
    pub fn set_messages(&mut self, messages: JsValue) -> Result<(), JsValue> {
        let messages: HashMap<Cue, String> = from_value(messages)?;
        self.store.set_messages(messages);
        Ok(())
    }
}

impl Default for WorkoutSessions {
    fn default() -> Self {
        Self::new()
    }
}
