//! In-memory motors and sensors for host runs and tests.
//!
//! `SimMotor` integrates its commanded power into an encoder position each
//! time `step` is called. In `RunToPosition` mode it moves toward the target
//! and reports busy until it gets there, unless it has been told to stall.

use alloc::vec::Vec;

use crate::utils::hardware::{
    ActuatorId, DetectedObject, Direction, Hardware, Motor, RunMode, ZeroPowerBehavior,
};

/// Encoder counts travelled per `step` at full power.
pub const DEFAULT_COUNTS_PER_STEP: i32 = 20;

#[derive(Debug, Clone)]
pub struct SimMotor {
    pub position: i32,
    pub target: i32,
    pub mode: RunMode,
    pub direction: Direction,
    pub zero_power: ZeroPowerBehavior,
    /// A stalled motor never moves and, in `RunToPosition`, is always busy.
    pub stalled: bool,
    pub counts_per_step: i32,
    power: f64,
    power_writes: Vec<f64>,
}

impl Default for SimMotor {
    fn default() -> Self {
        Self {
            position: 0,
            target: 0,
            mode: RunMode::RunUsingEncoder,
            direction: Direction::Forward,
            zero_power: ZeroPowerBehavior::Brake,
            stalled: false,
            counts_per_step: DEFAULT_COUNTS_PER_STEP,
            power: 0.0,
            power_writes: Vec::new(),
        }
    }
}

impl SimMotor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every power value written so far, oldest first.
    pub fn power_writes(&self) -> &[f64] {
        &self.power_writes
    }

    /// Advance the simulation by one tick.
    pub fn step(&mut self) {
        if self.stalled {
            return;
        }
        let travel = libm::round(self.power.abs() * self.counts_per_step as f64) as i32;
        match self.mode {
            RunMode::RunToPosition => {
                let remaining = self.target.saturating_sub(self.position);
                let delta = remaining.signum() * travel.min(remaining.saturating_abs());
                self.position = self.position.saturating_add(delta);
            }
            RunMode::RunUsingEncoder => {
                let sign = if self.power < 0.0 { -1 } else { 1 };
                self.position = self.position.saturating_add(sign * travel);
            }
        }
    }
}

impl Motor for SimMotor {
    fn current_position(&self) -> i32 {
        self.position
    }

    fn power(&self) -> f64 {
        self.power
    }

    fn set_power(
        &mut self,
        power: f64,
    ) {
        self.power = power;
        self.power_writes.push(power);
    }

    fn is_busy(&self) -> bool {
        self.mode == RunMode::RunToPosition
            && self.power != 0.0
            && (self.stalled || self.position != self.target)
    }

    fn set_target_position(
        &mut self,
        position: i32,
    ) {
        self.target = position;
    }

    fn set_run_mode(
        &mut self,
        mode: RunMode,
    ) {
        self.mode = mode;
    }

    fn set_direction(
        &mut self,
        direction: Direction,
    ) {
        self.direction = direction;
    }

    fn set_zero_power_behavior(
        &mut self,
        behavior: ZeroPowerBehavior,
    ) {
        self.zero_power = behavior;
    }
}

/// A whole robot made of `SimMotor`s plus settable sensor readings.
#[derive(Debug, Clone, Default)]
pub struct SimHardware {
    motors: [SimMotor; ActuatorId::COUNT],
    pub distance_mm: Option<f64>,
    pub objects: Vec<DetectedObject>,
}

impl SimHardware {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sim(
        &self,
        id: ActuatorId,
    ) -> &SimMotor {
        &self.motors[id.index()]
    }

    pub fn sim_mut(
        &mut self,
        id: ActuatorId,
    ) -> &mut SimMotor {
        &mut self.motors[id.index()]
    }

    /// Step every motor once.
    pub fn step(&mut self) {
        for motor in self.motors.iter_mut() {
            motor.step();
        }
    }
}

impl Hardware for SimHardware {
    fn motor(
        &mut self,
        id: ActuatorId,
    ) -> &mut dyn Motor {
        &mut self.motors[id.index()]
    }

    fn distance_mm(&mut self) -> Option<f64> {
        self.distance_mm
    }

    fn detected_objects(&mut self) -> &[DetectedObject] {
        &self.objects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_to_position_stops_at_target() {
        let mut m = SimMotor::new();
        m.set_run_mode(RunMode::RunToPosition);
        m.set_target_position(50);
        m.set_power(1.0);
        assert!(m.is_busy());
        for _ in 0..10 {
            m.step();
        }
        assert_eq!(m.position, 50);
        assert!(!m.is_busy());
    }

    #[test]
    fn stalled_motor_stays_busy() {
        let mut m = SimMotor::new();
        m.stalled = true;
        m.set_run_mode(RunMode::RunToPosition);
        m.set_target_position(50);
        m.set_power(0.5);
        m.step();
        assert_eq!(m.position, 0);
        assert!(m.is_busy());
    }

    #[test]
    fn positions_saturate_at_encoder_limits() {
        let mut m = SimMotor::new();
        m.position = i32::MAX - 5;
        m.set_power(1.0);
        m.step();
        assert_eq!(m.position, i32::MAX);

        m.position = i32::MIN + 5;
        m.set_run_mode(RunMode::RunToPosition);
        m.set_target_position(i32::MAX);
        m.step();
        assert_eq!(m.position, i32::MIN + 5 + DEFAULT_COUNTS_PER_STEP);
    }
}
