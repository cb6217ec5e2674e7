//! Bridge module - JS ↔ Rust communication
//!
//! All #[wasm_bindgen] entry points live here.
//! Re-exports only in mod.rs, logic in submodules.

mod logging;
mod sessions;

pub use logging::init_logging;
pub use sessions::WorkoutSessions;
