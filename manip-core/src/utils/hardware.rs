//! Hardware collaborator interface for the manipulator.
//!
//! The control core never talks to a bus directly. Motors and sensors are
//! reached through the `Motor` and `Hardware` traits, which a board crate (or
//! the simulator in `utils::sim`) implements. Every call is expected to return
//! immediately; the loop treats hardware access as instantaneous relative to
//! one tick.

use serde::{Deserialize, Serialize};

/// Every actuator the core can command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActuatorId {
    FrontLeft,
    FrontRight,
    RearLeft,
    RearRight,
    LiftLeft,
    LiftRight,
    /// Shoulder motor that extends and retracts the claw.
    Arm,
    Claw,
}

impl ActuatorId {
    pub const COUNT: usize = 8;

    pub const ALL: [ActuatorId; Self::COUNT] = [
        ActuatorId::FrontLeft,
        ActuatorId::FrontRight,
        ActuatorId::RearLeft,
        ActuatorId::RearRight,
        ActuatorId::LiftLeft,
        ActuatorId::LiftRight,
        ActuatorId::Arm,
        ActuatorId::Claw,
    ];

    /// The four mecanum wheels.
    pub const DRIVE: [ActuatorId; 4] = [
        ActuatorId::FrontLeft,
        ActuatorId::FrontRight,
        ActuatorId::RearLeft,
        ActuatorId::RearRight,
    ];

    /// Both lift motors, primary (right) first.
    pub const LIFT: [ActuatorId; 2] = [ActuatorId::LiftRight, ActuatorId::LiftLeft];

    /// Dense index, usable for array-backed storage.
    pub const fn index(self) -> usize {
        self as usize
    }
}

/// Closed-loop mode of a motor controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    /// Power is applied directly; the encoder is only read.
    #[default]
    RunUsingEncoder,
    /// The controller drives toward the last target position and reports busy
    /// until it arrives.
    RunToPosition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ZeroPowerBehavior {
    #[default]
    Brake,
    Float,
}

/// A single DC motor with an encoder.
pub trait Motor {
    fn current_position(&self) -> i32;
    /// Last commanded power in `[-1.0, 1.0]`.
    fn power(&self) -> f64;
    fn set_power(
        &mut self,
        power: f64,
    );
    /// True while a `RunToPosition` move has not reached its target.
    fn is_busy(&self) -> bool;
    fn set_target_position(
        &mut self,
        position: i32,
    );
    fn set_run_mode(
        &mut self,
        mode: RunMode,
    );
    fn set_direction(
        &mut self,
        direction: Direction,
    );
    fn set_zero_power_behavior(
        &mut self,
        behavior: ZeroPowerBehavior,
    );
}

/// An object reported by the vision sensor.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DetectedObject {
    pub id: u16,
    pub x: i16,
    pub y: i16,
    pub width: u16,
    pub height: u16,
}

/// Access to every device on the robot.
pub trait Hardware {
    fn motor(
        &mut self,
        id: ActuatorId,
    ) -> &mut dyn Motor;

    /// Range to the nearest obstacle in millimetres, if a sensor is fitted.
    fn distance_mm(&mut self) -> Option<f64> {
        None
    }

    fn detected_objects(&mut self) -> &[DetectedObject] {
        &[]
    }
}

/// One-time actuator setup: braked, encoder-driven motors with the right-hand
/// side reversed so positive power moves the robot (and lift) forward/up.
pub fn configure_actuators(hw: &mut dyn Hardware) {
    for id in ActuatorId::ALL {
        let direction = match id {
            ActuatorId::FrontRight
            | ActuatorId::RearRight
            | ActuatorId::LiftRight
            | ActuatorId::Arm => {
                Direction::Reverse
            }
            _ => Direction::Forward,
        };
        let motor = hw.motor(id);
        motor.set_direction(direction);
        motor.set_zero_power_behavior(ZeroPowerBehavior::Brake);
        motor.set_run_mode(RunMode::RunUsingEncoder);
    }
    tracing::info!("actuators configured");
}
