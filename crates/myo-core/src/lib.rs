//! Myo-Core: Foundation types for the EMG-to-actuator bridge
//!
//! Shared sample, configuration and error types used across the workspace.

pub mod config;
pub mod error;
pub mod sample;

pub use config::*;
pub use sample::*;
pub use error::{BridgeError, BridgeResult};
