//! Threshold decision stage

use serde::{Deserialize, Serialize};

/// Converts a filtered value into a binary activation signal.
///
/// Single strict comparison, no hysteresis band: a filtered value
/// hovering around the threshold can oscillate the output. Known
/// limitation of the design, handled downstream by the debounce.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdDecider {
    threshold: f64,
}

impl ThresholdDecider {
    /// Create a decider with the given activation threshold
    pub fn new(threshold: f64) -> Self {
        ThresholdDecider { threshold }
    }

    /// `true` when the filtered value is strictly above the threshold
    pub fn decide(&self, filtered: f64) -> bool {
        filtered > self.threshold
    }

    /// Configured activation threshold
    pub fn threshold(&self) -> f64 {
        self.threshold
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strictly_greater_than() {
        let decider = ThresholdDecider::new(600.0);
        assert!(!decider.decide(599.9));
        assert!(!decider.decide(600.0));
        assert!(decider.decide(600.1));
    }

    #[test]
    fn test_flex_sequence() {
        let decider = ThresholdDecider::new(600.0);
        let decisions: Vec<bool> = [200.0, 700.0, 200.0]
            .iter()
            .map(|&v| decider.decide(v))
            .collect();
        assert_eq!(decisions, vec![false, true, false]);
    }
}
