//! Visibility gate
//!
//! When any landmark a measure depends on is at or below the threshold, the
//! measure is unavailable. The gate never substitutes a fallback position.

use crate::pose::Landmark;

/// Default threshold for the angle bundle
pub const DEFAULT_VISIBILITY: f32 = 0.7;

/// Visibility gate for a group of joints
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisibilityGate {
    /// Minimum visibility (exclusive) to accept a landmark
    threshold: f32,
}

impl VisibilityGate {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    /// True when every landmark clears the threshold
    pub fn all_visible(&self, points: &[&Landmark]) -> bool {
        points.iter().all(|p| p.is_visible(self.threshold))
    }

    /// Run `measure` only if every landmark is visible
    pub fn measure<T>(&self, points: &[&Landmark], measure: impl FnOnce() -> T) -> Option<T> {
        if self.all_visible(points) {
            Some(measure())
        } else {
            None
        }
    }
}

impl Default for VisibilityGate {
    fn default() -> Self {
        Self::new(DEFAULT_VISIBILITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gate_boundaries() {
        let gate = VisibilityGate::new(0.6);
        for (vis, expected) in [(0.0, false), (0.599, false), (0.6, false), (0.601, true), (1.0, true)] {
            let lm = Landmark::new(0.5, 0.5, vis);
            assert_eq!(gate.all_visible(&[&lm]), expected, "visibility {vis}");
        }
    }

    #[test]
    fn test_measure_skipped_when_hidden() {
        let gate = VisibilityGate::default();
        let seen = Landmark::new(0.5, 0.5, 0.9);
        let hidden = Landmark::new(0.5, 0.5, 0.2);
        assert_eq!(gate.measure(&[&seen], || 1), Some(1));
        assert_eq!(gate.measure(&[&seen, &hidden], || 1), None);
    }
}
