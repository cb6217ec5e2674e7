//! Engine error type
//!
//! Only whole-call failures live here. A landmark that is too faint to use is
//! an `Option::None` measurement, and a rep that fails a critical check is a
//! silent non-increment, neither is an error.

use thiserror::Error;

/// Errors surfaced by the engine and the JS bridge
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Fewer landmarks than the pose model produces per frame
    #[error("insufficient landmarks: got {got}, need {need}")]
    InsufficientData { got: usize, need: usize },

    /// A threshold update would break an enter/exit ordering
    #[error("invalid thresholds: {0}")]
    InvalidThresholds(String),

    /// Input from JS could not be decoded
    #[error("decode failed: {0}")]
    Decode(String),
}

pub type Result<T> = std::result::Result<T, EngineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_data_message() {
        let err = EngineError::InsufficientData { got: 12, need: 33 };
        assert_eq!(err.to_string(), "insufficient landmarks: got 12, need 33");
    }
}
