//! Module Exports
//!
//! This file exports the closed-loop controllers that back long-running
//! actions.
//!
//! - `position`: moves of one motor or a synchronized pair to an encoder
//!   position (the lift and the arm).
//! - `encoder`: distance and rotation moves on the drive wheel encoders.

pub mod encoder;
pub mod position;

pub use encoder::{EncoderDrive, EncoderMove, MotionRequest};
pub use position::{Arm, Lift, PositionMove};
