//! Rehab Coach - rep counting and form feedback from pose landmarks
//!
//! Entry point for the WASM module and the native library. Only contains:
//! - Module declarations
//! - Re-exports of the public engine API
//! - The wasm_bindgen start hook

pub mod bridge;
pub mod config;
pub mod error;
pub mod exercise;
pub mod feedback;
pub mod geometry;
pub mod pose;
pub mod session;

use wasm_bindgen::prelude::*;

pub use bridge::{init_logging, WorkoutSessions};
pub use config::Thresholds;
pub use error::{EngineError, Result};
pub use feedback::{Catalog, Cue, Priority};
pub use pose::{Landmark, Pose};
pub use session::{Exercise, ExerciseCounter, ExerciseSummary, FrameReport, SessionStore};

// ============================================================================
// WASM ENTRY POINTS
// ============================================================================

/// Called automatically when the WASM module loads
#[wasm_bindgen(start)]
pub fn init_panic_hook() {
    console_error_panic_hook::set_once();
    web_sys::console::log_1(&"✅ rehab-coach loaded".into());
}

/// Crate version, for the page footer
#[wasm_bindgen(js_name = getVersion)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
