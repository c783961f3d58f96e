//! Sliding temporal buffer
//!
//! Holds the samples of the last `window` seconds. The bound is elapsed time,
//! not a count: every insert evicts whatever fell out of the window.

use crate::core::error::{Result, SparringError};
use crate::core::types::Timestamp;
use std::collections::VecDeque;

/// A value recorded at a point on the match clock
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimestampedSample<T> {
    pub value: T,
    pub timestamp: Timestamp,
}

/// Duration-bounded history of samples, oldest first
#[derive(Debug, Clone)]
pub struct SlidingWindow<T> {
    samples: VecDeque<TimestampedSample<T>>,
    window: f64,
}

impl<T: Copy> SlidingWindow<T> {
    pub fn new(window: f64) -> Result<Self> {
        if !window.is_finite() || window <= 0.0 {
            return Err(SparringError::InvalidConfiguration(format!(
                "window duration must be positive, got {window}"
            )));
        }
        Ok(Self {
            samples: VecDeque::new(),
            window,
        })
    }

    /// Record a sample and evict everything older than `timestamp - window`
    ///
    /// A timestamp earlier than the latest sample is clamped to it so the
    /// history stays non-decreasing.
    pub fn add(&mut self, value: T, timestamp: Timestamp) {
        let timestamp = match self.samples.back() {
            Some(last) if timestamp < last.timestamp => last.timestamp,
            _ => timestamp,
        };
        self.samples.push_back(TimestampedSample { value, timestamp });

        while let Some(front) = self.samples.front() {
            if timestamp - front.timestamp > self.window {
                self.samples.pop_front();
            } else {
                break;
            }
        }
    }

    pub fn earliest(&self) -> Result<&TimestampedSample<T>> {
        self.samples.front().ok_or(SparringError::EmptyBuffer)
    }

    pub fn latest(&self) -> Result<&TimestampedSample<T>> {
        self.samples.back().ok_or(SparringError::EmptyBuffer)
    }

    /// Time spanned between the earliest and latest sample
    pub fn elapsed(&self) -> Result<f64> {
        Ok(self.latest()?.timestamp - self.earliest()?.timestamp)
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &TimestampedSample<T>> {
        self.samples.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_window_errors() {
        let window: SlidingWindow<f32> = SlidingWindow::new(1.0).unwrap();
        assert!(matches!(window.earliest(), Err(SparringError::EmptyBuffer)));
        assert!(matches!(window.latest(), Err(SparringError::EmptyBuffer)));
        assert_eq!(window.count(), 0);
    }

    #[test]
    fn test_non_positive_window_rejected() {
        assert!(SlidingWindow::<f32>::new(0.0).is_err());
        assert!(SlidingWindow::<f32>::new(-0.5).is_err());
        assert!(SlidingWindow::<f32>::new(f64::NAN).is_err());
    }

    #[test]
    fn test_old_samples_evicted() {
        let mut window = SlidingWindow::new(0.2).unwrap();
        window.add(1.0, 0.0);
        window.add(2.0, 0.1);
        window.add(3.0, 0.2);
        assert_eq!(window.count(), 3); // 0.0 is exactly at the edge

        window.add(4.0, 0.25);
        assert_eq!(window.count(), 3);
        assert_eq!(window.earliest().unwrap().value, 2.0);
        assert_eq!(window.latest().unwrap().value, 4.0);
    }

    #[test]
    fn test_large_gap_keeps_only_latest() {
        let mut window = SlidingWindow::new(0.2).unwrap();
        for i in 0..5 {
            window.add(i, i as f64 * 0.01);
        }
        window.add(99, 10.0);
        assert_eq!(window.count(), 1);
        assert_eq!(window.earliest().unwrap().value, 99);
        assert_eq!(window.elapsed().unwrap(), 0.0);
    }

    #[test]
    fn test_out_of_order_timestamp_clamped() {
        let mut window = SlidingWindow::new(1.0).unwrap();
        window.add('a', 0.5);
        window.add('b', 0.4);
        assert_eq!(window.latest().unwrap().timestamp, 0.5);
    }

    #[test]
    fn test_clear() {
        let mut window = SlidingWindow::new(1.0).unwrap();
        window.add(1u8, 0.0);
        window.add(2u8, 0.1);
        window.clear();
        assert!(window.is_empty());
        assert!(window.earliest().is_err());
    }
}
