//! Myo-Serial: Sensor acquisition over a serial link
//!
//! A non-blocking serial transport and the background reader task that
//! publishes the freshest parsed value for the control loop.

pub mod link;
pub mod reader;

pub use link::*;
pub use reader::*;
