//! Myo-Signal: Filtering and decision stages for the sensor pipeline
//!
//! Pure, synchronous stages: a sliding sample window and the threshold
//! decision that turns a filtered value into an activation signal.

pub mod decider;
pub mod window;

pub use decider::*;
pub use window::*;
