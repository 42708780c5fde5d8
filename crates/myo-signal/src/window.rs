//! Sliding sample window for spike suppression

use myo_core::{BridgeError, BridgeResult, FilterMode};
use std::collections::VecDeque;

/// Fixed-capacity FIFO window over recent sensor values.
///
/// Averaging suppresses single-sample spikes from EMG noise; raw mode
/// keeps latency minimal while tuning thresholds. Capacity is fixed at
/// construction. The mean is recomputed from the current contents on
/// each call, over at most `capacity` terms.
#[derive(Debug, Clone)]
pub struct SlidingWindow {
    capacity: usize,
    samples: VecDeque<f64>,
}

impl SlidingWindow {
    /// Create a window holding at most `capacity` samples
    pub fn new(capacity: usize) -> BridgeResult<Self> {
        if capacity == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "window capacity must be at least 1".to_string(),
            });
        }
        Ok(SlidingWindow {
            capacity,
            samples: VecDeque::with_capacity(capacity),
        })
    }

    /// Append a sample, evicting the oldest when full
    pub fn push(&mut self, sample: f64) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Filtered value under `mode`.
    ///
    /// `Mean` averages whatever is currently held; there is no zero
    /// padding before the window fills. Fails with
    /// [`BridgeError::EmptyWindow`] before the first push.
    pub fn value(&self, mode: FilterMode) -> BridgeResult<f64> {
        let latest = self
            .samples
            .back()
            .copied()
            .ok_or(BridgeError::EmptyWindow)?;
        match mode {
            FilterMode::Raw => Ok(latest),
            FilterMode::Mean => {
                let sum: f64 = self.samples.iter().sum();
                Ok(sum / self.samples.len() as f64)
            }
        }
    }

    /// Number of samples currently held
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// True before the first push
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Maximum number of samples the window holds
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drop all held samples, keeping the capacity
    pub fn reset(&mut self) {
        self.samples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_over_full_window() {
        let mut window = SlidingWindow::new(5).unwrap();
        for value in [100.0, 200.0, 300.0, 400.0, 500.0] {
            window.push(value);
        }
        assert_eq!(window.value(FilterMode::Mean).unwrap(), 300.0);

        // One more push evicts exactly the oldest sample
        window.push(600.0);
        assert_eq!(window.len(), 5);
        assert_eq!(window.value(FilterMode::Mean).unwrap(), 400.0);
    }

    #[test]
    fn test_mean_over_partial_window() {
        let mut window = SlidingWindow::new(50).unwrap();
        window.push(100.0);
        window.push(200.0);
        // No zero padding: only what was pushed counts
        assert_eq!(window.value(FilterMode::Mean).unwrap(), 150.0);
    }

    #[test]
    fn test_raw_returns_latest() {
        let mut window = SlidingWindow::new(5).unwrap();
        window.push(100.0);
        window.push(700.0);
        assert_eq!(window.value(FilterMode::Raw).unwrap(), 700.0);
    }

    #[test]
    fn test_fifo_eviction_order() {
        let mut window = SlidingWindow::new(3).unwrap();
        for value in [1.0, 2.0, 3.0, 4.0] {
            window.push(value);
        }
        // Oldest (1.0) evicted: remaining are 2, 3, 4
        assert_eq!(window.len(), 3);
        assert_eq!(window.value(FilterMode::Mean).unwrap(), 3.0);
        assert_eq!(window.value(FilterMode::Raw).unwrap(), 4.0);
    }

    #[test]
    fn test_empty_window_fails() {
        let window = SlidingWindow::new(5).unwrap();
        assert_eq!(
            window.value(FilterMode::Mean),
            Err(BridgeError::EmptyWindow)
        );
        assert_eq!(window.value(FilterMode::Raw), Err(BridgeError::EmptyWindow));
    }

    #[test]
    fn test_zero_capacity_rejected() {
        assert!(matches!(
            SlidingWindow::new(0),
            Err(BridgeError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_reset_empties_window() {
        let mut window = SlidingWindow::new(5).unwrap();
        window.push(42.0);
        window.reset();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), 5);
    }
}
