//! Math utilities for the manipulator.
//!
//! This module provides the mecanum drivetrain kinematics used by manual driving.

pub mod kinematics;
