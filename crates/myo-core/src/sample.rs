//! Sensor samples and serial line parsing

use std::time::Instant;

/// One parsed sensor reading, published by the reader task.
///
/// The reader is the only writer; consumers see a snapshot of the
/// freshest sample and use `sequence` to tell new data from old.
#[derive(Debug, Clone, Copy)]
pub struct SensorSample {
    /// Parsed sensor value
    pub value: f64,
    /// Monotonically increasing publish counter
    pub sequence: u64,
    /// When the sample was parsed
    pub timestamp: Instant,
}

impl SensorSample {
    /// Create a sample stamped with the current time
    pub fn new(value: f64, sequence: u64) -> Self {
        SensorSample {
            value,
            sequence,
            timestamp: Instant::now(),
        }
    }
}

/// Parse one serial line into a sensor value.
///
/// Accepts a trimmed non-negative integer or floating-point literal.
/// Everything else counts as serial noise and maps to `None`: empty
/// lines, partial writes, text fragments, negatives, NaN and infinities.
/// Malformed input is expected on a noisy link and never raises an error.
pub fn parse_sensor_line(line: &str) -> Option<f64> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.parse::<f64>() {
        Ok(value) if value.is_finite() && value >= 0.0 => Some(value),
        _ => None,
    }
}
