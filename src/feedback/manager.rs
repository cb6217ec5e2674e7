//! Feedback prioritizer
//!
//! Keeps two views of the cues raised during a rep:
//! - a FIFO window of the most recent cues; any cue making up more than half
//!   of it is "frequent" (repeated coaching, not single-frame noise)
//! - a priority-ordered list, so a HIGH cue raised once still surfaces
//!
//! `complete_rep` freezes a top-2 summary that stays until the next
//! `start_new_rep`.

use std::collections::VecDeque;

use super::cues::{Cue, Priority};

/// Default size of the recent-cue window
pub const DEFAULT_WINDOW: usize = 5;

/// Cues kept in a synthesized summary
pub const SUMMARY_LEN: usize = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FeedbackItem {
    pub cue: Cue,
    pub priority: Priority,
}

#[derive(Clone, Debug)]
pub struct FeedbackManager {
    window_size: usize,
    /// Most recent cues, oldest first
    window: VecDeque<FeedbackItem>,
    /// Highest priority first; equal priorities keep arrival order
    ranked: Vec<FeedbackItem>,
    /// Cues seen in more than half of the window
    frequent: Vec<Cue>,
    /// Frozen summary of the last completed rep
    summary: Option<Vec<Cue>>,
}

impl FeedbackManager {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_WINDOW)
    }

    pub fn with_window(window_size: usize) -> Self {
        let window_size = window_size.max(1);
        Self {
            window_size,
            window: VecDeque::with_capacity(window_size + 1),
            ranked: Vec::with_capacity(window_size * 2 + 1),
            frequent: Vec::new(),
            summary: None,
        }
    }

    /// Record a cue
    pub fn add(&mut self, cue: Cue, priority: Priority) {
        let item = FeedbackItem { cue, priority };

        let at = self
            .ranked
            .iter()
            .position(|existing| existing.priority < priority)
            .unwrap_or(self.ranked.len());
        self.ranked.insert(at, item);
        self.ranked.truncate(self.window_size * 2);

        self.window.push_back(item);
        if self.window.len() > self.window_size {
            self.window.pop_front();
        }

        self.refresh_frequent();
    }

    fn refresh_frequent(&mut self) {
        let threshold = self.window.len() / 2;
        let mut frequent: Vec<Cue> = Vec::new();
        for item in &self.window {
            if frequent.contains(&item.cue) {
                continue;
            }
            let count = self.window.iter().filter(|other| other.cue == item.cue).count();
            if count > threshold {
                frequent.push(item.cue);
            }
        }
        self.frequent = frequent;
    }

    /// Real-time view: the frequent cues, or the frozen summary after a rep
    pub fn current(&self) -> Vec<Cue> {
        match &self.summary {
            Some(summary) => summary.clone(),
            None => self.frequent.clone(),
        }
    }

    /// Top pending cue plus the frequent ones, best priority first, at most 2
    pub fn get_feedback(&self) -> Vec<Cue> {
        let mut cues: Vec<Cue> = Vec::with_capacity(self.frequent.len() + 1);
        if let Some(top) = self.ranked.first() {
            cues.push(top.cue);
        }
        for &cue in &self.frequent {
            if !cues.contains(&cue) {
                cues.push(cue);
            }
        }

        cues.sort_by(|a, b| self.best_priority(*b).cmp(&self.best_priority(*a)));
        cues.truncate(SUMMARY_LEN);
        cues
    }

    fn best_priority(&self, cue: Cue) -> Priority {
        self.ranked
            .iter()
            .filter(|item| item.cue == cue)
            .map(|item| item.priority)
            .max()
            .unwrap_or(Priority::Low)
    }

    /// Begin collecting for a new repetition attempt
    pub fn start_new_rep(&mut self) {
        self.clear();
    }

    /// Freeze the summary for the rep that just ended and return it
    pub fn complete_rep(&mut self) -> Vec<Cue> {
        let summary = self.get_feedback();
        self.summary = Some(summary.clone());
        summary
    }

    /// True between `complete_rep` and the next `start_new_rep`
    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }

    /// Full reset
    pub fn clear(&mut self) {
        self.window.clear();
        self.ranked.clear();
        self.frequent.clear();
        self.summary = None;
    }
}

impl Default for FeedbackManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_high_priority_surfaces_first() {
        let mut fm = FeedbackManager::new();
        for _ in 0..5 {
            fm.add(Cue::LeanForward, Priority::Medium);
        }
        fm.add(Cue::TooFast, Priority::High);
        assert_eq!(fm.get_feedback(), vec![Cue::TooFast, Cue::LeanForward]);
    }

    #[test]
    fn test_single_medium_is_not_frequent() {
        let mut fm = FeedbackManager::new();
        fm.add(Cue::CurlHigher, Priority::Medium);
        fm.add(Cue::KeepBodyStill, Priority::Medium);
        fm.add(Cue::KeepBodyStill, Priority::Medium);
        assert_eq!(fm.current(), vec![Cue::KeepBodyStill]);
    }

    #[test]
    fn test_window_evicts_oldest() {
        let mut fm = FeedbackManager::with_window(3);
        for _ in 0..3 {
            fm.add(Cue::CurlHigher, Priority::Medium);
        }
        for _ in 0..2 {
            fm.add(Cue::KeepShoulderStill, Priority::Medium);
        }
        // Window is now [CurlHigher, KeepShoulderStill, KeepShoulderStill]
        assert_eq!(fm.current(), vec![Cue::KeepShoulderStill]);
    }

    #[test]
    fn test_ranked_list_is_capped() {
        let mut fm = FeedbackManager::with_window(2);
        fm.add(Cue::TooFast, Priority::High);
        for _ in 0..10 {
            fm.add(Cue::LetArmHang, Priority::Low);
        }
        assert_eq!(fm.ranked.len(), 4);
        assert_eq!(fm.ranked[0].cue, Cue::TooFast);
    }

    #[test]
    fn test_summary_frozen_until_next_rep() {
        let mut fm = FeedbackManager::new();
        fm.add(Cue::ElbowAwayFromBody, Priority::High);
        let summary = fm.complete_rep();
        assert_eq!(summary, vec![Cue::ElbowAwayFromBody]);

        for _ in 0..5 {
            fm.add(Cue::CurlHigher, Priority::Medium);
        }
        assert!(fm.has_summary());
        assert_eq!(fm.current(), vec![Cue::ElbowAwayFromBody]);

        fm.start_new_rep();
        assert!(!fm.has_summary());
        assert!(fm.current().is_empty());
        assert!(fm.get_feedback().is_empty());
    }

    #[test]
    fn test_first_high_wins_ties() {
        let mut fm = FeedbackManager::new();
        fm.add(Cue::SquatDeeper, Priority::Medium);
        fm.add(Cue::SquatDeeper, Priority::Medium);
        fm.add(Cue::KneesCavingIn, Priority::High);
        fm.add(Cue::TooFast, Priority::High);
        // Top pending is the first HIGH, SquatDeeper is 2 of 4
        let summary = fm.complete_rep();
        assert_eq!(summary, vec![Cue::KneesCavingIn]);
    }
}
