//! Move of one motor, or a synchronized pair, to an encoder position.
//!
//! Every motor gets the same signed power until any of them reaches the
//! target, at which point all are stopped. The first motor is the primary:
//! its position alone decides whether the move raises or lowers. There is no
//! correction for drift between paired motors.

use crate::utils::actions::{ActionError, Lease, TickContext, TickResult};
use crate::utils::config::{ArmParams, LiftParams};
use crate::utils::hardware::{ActuatorId, Hardware};
use crate::utils::telemetry::TelemetryValue;

/// Direction of travel, fixed on the first tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Travel {
    Raising,
    Lowering,
}

impl Travel {
    pub fn sign(self) -> f64 {
        match self {
            Travel::Raising => 1.0,
            Travel::Lowering => -1.0,
        }
    }

    /// True while every position is still short of `target`.
    fn continues(
        self,
        positions: &[i32],
        target: i32,
    ) -> bool {
        if positions.is_empty() {
            return false;
        }
        match self {
            Travel::Lowering => positions.iter().all(|&p| p > target),
            Travel::Raising => positions.iter().all(|&p| p < target),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionState {
    NotStarted,
    Running { travel: Travel },
    Done,
}

/// Result of one pure step: the next state, the power to write to every
/// motor (if any) and what to report.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Step {
    pub state: PositionState,
    pub power: Option<f64>,
    pub result: TickResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PositionMove {
    motors: heapless::Vec<ActuatorId, 2>,
    target: i32,
    min_position: i32,
    max_position: i32,
    power: f64,
    state: PositionState,
}

impl PositionMove {
    /// `motors` lists the primary first; anything past the second is ignored.
    pub fn new(
        motors: impl IntoIterator<Item = ActuatorId>,
        target: i32,
        min_position: i32,
        max_position: i32,
        power: f64,
    ) -> Self {
        Self {
            motors: motors.into_iter().take(2).collect(),
            target,
            min_position,
            max_position,
            power: power.abs(),
            state: PositionState::NotStarted,
        }
    }

    pub fn target(&self) -> i32 {
        self.target
    }

    pub fn state(&self) -> PositionState {
        self.state
    }

    pub fn lease(&self) -> Lease {
        self.motors.iter().copied().collect()
    }

    /// Advance `state` given the motors' current positions, primary first.
    /// Does no I/O.
    pub fn step(
        &self,
        state: PositionState,
        positions: &[i32],
    ) -> Step {
        match state {
            PositionState::NotStarted => {
                if self.target < self.min_position || self.target > self.max_position {
                    return Step {
                        state: PositionState::Done,
                        power: None,
                        result: TickResult::Failed(ActionError::TargetOutOfBounds {
                            target: self.target,
                            min: self.min_position,
                            max: self.max_position,
                        }),
                    };
                }
                let primary = positions.first().copied().unwrap_or(self.target);
                let travel = if primary > self.target {
                    Travel::Lowering
                } else {
                    Travel::Raising
                };
                if travel.continues(positions, self.target) {
                    Step {
                        state: PositionState::Running { travel },
                        power: Some(travel.sign() * self.power),
                        result: TickResult::Pending,
                    }
                } else {
                    Self::arrived()
                }
            }
            PositionState::Running { travel } => {
                if travel.continues(positions, self.target) {
                    Step {
                        state,
                        power: None,
                        result: TickResult::Pending,
                    }
                } else {
                    Self::arrived()
                }
            }
            PositionState::Done => Step {
                state,
                power: None,
                result: TickResult::Complete,
            },
        }
    }

    fn arrived() -> Step {
        Step {
            state: PositionState::Done,
            power: Some(0.0),
            result: TickResult::Complete,
        }
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_>,
    ) -> TickResult {
        if self.state == PositionState::Done {
            return TickResult::Complete;
        }
        let positions: heapless::Vec<i32, 2> = self
            .motors
            .iter()
            .map(|&id| ctx.hw.motor(id).current_position())
            .collect();
        let step = self.step(self.state, &positions);

        if let Some(power) = step.power {
            for &id in self.motors.iter() {
                ctx.hw.motor(id).set_power(power);
            }
        }
        if let PositionState::Running { travel } = step.state {
            if self.state == PositionState::NotStarted {
                tracing::debug!(goal = self.target, ?travel, ?positions, "position move started");
            }
        }
        ctx.telemetry
            .put("position move target", TelemetryValue::Int(self.target));

        self.state = step.state;
        step.result
    }

    pub fn cancel(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        for &id in self.motors.iter() {
            hw.motor(id).set_power(0.0);
        }
        self.state = PositionState::Done;
    }
}

/// Factory for lift moves bounded by `LiftParams`.
#[derive(Debug, Clone, Copy)]
pub struct Lift {
    params: LiftParams,
}

impl Lift {
    pub fn new(params: LiftParams) -> Self {
        Self { params }
    }

    /// Move to an arbitrary position. Bounds are checked on the first tick.
    pub fn lift(
        &self,
        position: i32,
    ) -> PositionMove {
        PositionMove::new(
            ActuatorId::LIFT,
            position,
            self.params.min_position,
            self.params.max_position,
            self.params.max_power,
        )
    }

    pub fn raise(&self) -> PositionMove {
        self.lift(self.params.max_position)
    }

    pub fn drop(&self) -> PositionMove {
        self.lift(self.params.drop_position)
    }
}

/// Factory for single-motor arm moves bounded by `ArmParams`.
///
/// Extending and retracting use separate powers; `go_to` uses the extend
/// power.
#[derive(Debug, Clone, Copy)]
pub struct Arm {
    params: ArmParams,
}

impl Arm {
    pub fn new(params: ArmParams) -> Self {
        Self { params }
    }

    pub fn go_to(
        &self,
        position: i32,
    ) -> PositionMove {
        self.with_power(position, self.params.extend_power)
    }

    pub fn extend(&self) -> PositionMove {
        self.with_power(self.params.max_position, self.params.extend_power)
    }

    pub fn retract(&self) -> PositionMove {
        self.with_power(self.params.min_position, self.params.retract_power)
    }

    fn with_power(
        &self,
        position: i32,
        power: f64,
    ) -> PositionMove {
        PositionMove::new(
            [ActuatorId::Arm],
            position,
            self.params.min_position,
            self.params.max_position,
            power,
        )
    }
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;

    use embassy_time::Instant;

    use super::*;
    use crate::utils::{hardware::Motor, sim::SimHardware, telemetry::TelemetryLine};

    fn lift_move(target: i32) -> PositionMove {
        PositionMove::new(ActuatorId::LIFT, target, 0, 1000, 0.8)
    }

    fn set_lift(
        hw: &mut SimHardware,
        position: i32,
    ) {
        hw.sim_mut(ActuatorId::LiftRight).position = position;
        hw.sim_mut(ActuatorId::LiftLeft).position = position;
    }

    fn tick(
        m: &mut PositionMove,
        hw: &mut SimHardware,
    ) -> TickResult {
        let mut lines: Vec<TelemetryLine> = Vec::new();
        let mut ctx = TickContext::new(hw, &mut lines, Instant::from_millis(0));
        m.tick(&mut ctx)
    }

    #[test]
    fn raises_when_below_target() {
        let mut hw = SimHardware::new();
        set_lift(&mut hw, 50);
        let mut m = lift_move(100);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Pending);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.8);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), 0.8);
        assert_eq!(
            m.state(),
            PositionState::Running {
                travel: Travel::Raising
            }
        );
    }

    #[test]
    fn lowers_when_above_target() {
        let mut hw = SimHardware::new();
        set_lift(&mut hw, 150);
        let mut m = lift_move(100);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Pending);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), -0.8);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), -0.8);
    }

    #[test]
    fn lowering_runs_until_target_reached() {
        let mut hw = SimHardware::new();
        set_lift(&mut hw, 150);
        let mut m = lift_move(100);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Pending);
        for position in [120, 101] {
            set_lift(&mut hw, position);
            assert_eq!(tick(&mut m, &mut hw), TickResult::Pending, "at {position}");
            assert_eq!(hw.sim(ActuatorId::LiftRight).power(), -0.8);
            assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), -0.8);
        }
        set_lift(&mut hw, 100);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Complete);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.0);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), 0.0);
        assert_eq!(m.state(), PositionState::Done);
    }

    #[test]
    fn lowering_stops_when_either_motor_passes_target() {
        let mut hw = SimHardware::new();
        set_lift(&mut hw, 150);
        let mut m = lift_move(100);
        tick(&mut m, &mut hw);
        hw.sim_mut(ActuatorId::LiftRight).position = 130;
        hw.sim_mut(ActuatorId::LiftLeft).position = 90;
        assert_eq!(tick(&mut m, &mut hw), TickResult::Complete);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.0);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), 0.0);
    }

    #[test]
    fn out_of_bounds_fails_before_any_power_write() {
        for target in [-1, 1001] {
            let mut hw = SimHardware::new();
            let mut m = lift_move(target);
            assert_eq!(
                tick(&mut m, &mut hw),
                TickResult::Failed(ActionError::TargetOutOfBounds {
                    target,
                    min: 0,
                    max: 1000
                })
            );
            assert!(hw.sim(ActuatorId::LiftRight).power_writes().is_empty());
            assert!(hw.sim(ActuatorId::LiftLeft).power_writes().is_empty());
        }
    }

    #[test]
    fn runs_until_target_reached() {
        let mut hw = SimHardware::new();
        let mut m = PositionMove::new(ActuatorId::LIFT, 5, 0, 1000, 0.5);
        for position in 0..5 {
            set_lift(&mut hw, position);
            assert_eq!(tick(&mut m, &mut hw), TickResult::Pending, "at {position}");
            assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.5);
        }
        set_lift(&mut hw, 5);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Complete);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.0);
        assert_eq!(hw.sim(ActuatorId::LiftLeft).power(), 0.0);
    }

    #[test]
    fn either_motor_arriving_stops_both() {
        let mut hw = SimHardware::new();
        let mut m = lift_move(100);
        tick(&mut m, &mut hw);
        hw.sim_mut(ActuatorId::LiftLeft).position = 100;
        hw.sim_mut(ActuatorId::LiftRight).position = 80;
        assert_eq!(tick(&mut m, &mut hw), TickResult::Complete);
        assert_eq!(hw.sim(ActuatorId::LiftRight).power(), 0.0);
    }

    #[test]
    fn direction_is_fixed_after_first_tick() {
        let m = lift_move(100);
        let running = PositionState::Running {
            travel: Travel::Raising,
        };
        // overshoot while raising completes rather than reversing
        let step = m.step(running, &[120, 120]);
        assert_eq!(step.result, TickResult::Complete);
        assert_eq!(step.power, Some(0.0));
    }

    #[test]
    fn lift_factory_uses_params() {
        let lift = Lift::new(LiftParams::default());
        assert_eq!(lift.raise().target(), 2000);
        assert_eq!(lift.drop().target(), 100);
        assert_eq!(lift.lift(700).lease().as_slice(), &ActuatorId::LIFT);
    }

    #[test]
    fn arm_moves_a_single_motor_with_its_own_powers() {
        let arm = Arm::new(ArmParams::default());
        let mut hw = SimHardware::new();

        hw.sim_mut(ActuatorId::Arm).position = 20;
        let mut extend = arm.extend();
        assert_eq!(extend.lease().as_slice(), &[ActuatorId::Arm]);
        assert_eq!(tick(&mut extend, &mut hw), TickResult::Pending);
        assert_eq!(hw.sim(ActuatorId::Arm).power(), 0.25);
        assert!(hw.sim(ActuatorId::LiftRight).power_writes().is_empty());
        hw.sim_mut(ActuatorId::Arm).position = 100;
        assert_eq!(tick(&mut extend, &mut hw), TickResult::Complete);
        assert_eq!(hw.sim(ActuatorId::Arm).power(), 0.0);

        let mut retract = arm.retract();
        assert_eq!(retract.target(), 20);
        assert_eq!(tick(&mut retract, &mut hw), TickResult::Pending);
        assert_eq!(hw.sim(ActuatorId::Arm).power(), -0.45);
    }

    #[test]
    fn arm_rejects_targets_below_nonzero_minimum() {
        let arm = Arm::new(ArmParams::default());
        let mut hw = SimHardware::new();
        let mut m = arm.go_to(10);
        assert_eq!(
            tick(&mut m, &mut hw),
            TickResult::Failed(ActionError::TargetOutOfBounds {
                target: 10,
                min: 20,
                max: 100
            })
        );
        assert!(hw.sim(ActuatorId::Arm).power_writes().is_empty());

        // the minimum itself is in range
        hw.sim_mut(ActuatorId::Arm).position = 60;
        let mut m = arm.go_to(20);
        assert_eq!(tick(&mut m, &mut hw), TickResult::Pending);
        assert_eq!(hw.sim(ActuatorId::Arm).power(), -0.25);
    }
}
