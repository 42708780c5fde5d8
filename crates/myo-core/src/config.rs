//! Static configuration for the sensor bridge
//!
//! Built once at startup and handed to each component at construction.
//! No process-wide defaults are consulted anywhere else.

use crate::error::{BridgeError, BridgeResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Filtering mode applied to the sample window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FilterMode {
    /// Latest sample, no smoothing (lowest latency, used while tuning)
    Raw,
    /// Arithmetic mean over the window (suppresses single-sample spikes)
    Mean,
}

/// Actuation variant driven by the control loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BridgeMode {
    /// Open and close a gripper behind a time debounce
    Gripper,
    /// Fire one inference run per rising edge of the signal
    Trigger,
}

/// Configuration for the whole acquisition and decision pipeline
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BridgeConfig {
    /// Serial port identifier (e.g. `/dev/rfcomm0` or `COM5`)
    pub port: String,
    /// Serial baud rate
    pub baud_rate: u32,
    /// Activation threshold compared against the filtered value
    pub threshold: f64,
    /// Raw or mean filtering
    pub filter_mode: FilterMode,
    /// Sample window capacity
    pub window_size: usize,
    /// Gripper or inference-trigger actuation
    pub bridge_mode: BridgeMode,
    /// Reader poll cadence
    pub poll_interval: Duration,
    /// Control loop cadence, at least the reader's
    pub loop_interval: Duration,
    /// Minimum time between committed gripper transitions
    pub debounce: Duration,
    /// Delay after opening the port before sampling starts
    pub settle_delay: Duration,
    /// Log decisions without calling the actuator
    pub observe_only: bool,
    /// Robot control endpoint handed to the collaborator
    pub endpoint: String,
}

impl BridgeConfig {
    /// Validate the configuration before any component is built
    pub fn validate(&self) -> BridgeResult<()> {
        if self.window_size == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "window size must be at least 1".to_string(),
            });
        }
        if self.baud_rate == 0 {
            return Err(BridgeError::InvalidConfig {
                reason: "baud rate must be positive".to_string(),
            });
        }
        if !self.threshold.is_finite() {
            return Err(BridgeError::InvalidConfig {
                reason: "threshold must be a finite number".to_string(),
            });
        }
        if self.poll_interval.is_zero() {
            return Err(BridgeError::InvalidConfig {
                reason: "poll interval must be positive".to_string(),
            });
        }
        if self.loop_interval < self.poll_interval {
            return Err(BridgeError::InvalidConfig {
                reason: "loop interval must not be shorter than the poll interval"
                    .to_string(),
            });
        }
        Ok(())
    }
}

impl Default for BridgeConfig {
    fn default() -> Self {
        BridgeConfig {
            port: "/dev/rfcomm0".to_string(),
            baud_rate: 115_200,
            threshold: 600.0,
            filter_mode: FilterMode::Raw,
            window_size: 50,
            bridge_mode: BridgeMode::Gripper,
            poll_interval: Duration::from_millis(33),
            loop_interval: Duration::from_millis(33),
            debounce: Duration::from_secs(1),
            settle_delay: Duration::from_secs(2),
            observe_only: false,
            endpoint: "http://localhost:80".to_string(),
        }
    }
}
