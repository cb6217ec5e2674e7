//! Browser logging setup

use wasm_bindgen::prelude::*;

/// Route `log` output to the browser console
///
/// @param {string} level - "trace", "debug", "info", "warn" or "error"
#[wasm_bindgen(js_name = initLogging)]
pub fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => log::Level::Trace,
        "debug" => log::Level::Debug,
        "warn" => log::Level::Warn,
        "error" => log::Level::Error,
        _ => log::Level::Info,
    };

    let _ = wasm_logger::init(wasm_logger::Config::new(level));
    log::info!("rehab-coach logging at {level}");
}
