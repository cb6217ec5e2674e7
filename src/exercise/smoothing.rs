//! Rolling mean over the last few readings of one signal
//!
//! Used where a single noisy frame must not decide a critical check.

use std::collections::VecDeque;

#[derive(Clone, Debug)]
pub struct SmoothingWindow {
    /// Recent readings, oldest first
    values: VecDeque<f32>,
    capacity: usize,
}

impl SmoothingWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Push this frame's reading and return the smoothed value
    ///
    /// An unavailable reading yields `None` for this frame but keeps the
    /// history, so one dropped frame doesn't restart the window.
    pub fn update(&mut self, reading: Option<f32>) -> Option<f32> {
        let value = reading?;
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
        self.mean()
    }

    /// Mean of the stored readings
    pub fn mean(&self) -> Option<f32> {
        if self.values.is_empty() {
            return None;
        }
        Some(self.values.iter().sum::<f32>() / self.values.len() as f32)
    }

    /// Change the window length, dropping the oldest readings if it shrinks
    pub fn set_capacity(&mut self, capacity: usize) {
        self.capacity = capacity.max(1);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn clear(&mut self) {
        self.values.clear();
    }
}
