//! Cooperative, resumable actions.
//!
//! An `Action` is a small state machine that the control loop polls once per
//! tick. Nothing happens at construction: each variant captures its target,
//! power and direction on its first tick and keeps them for the rest of its
//! life. `tick` never blocks; it reads and writes hardware through the
//! `TickContext` and returns a `TickResult`.
//!
//! The set of action kinds is closed, so they are a plain enum dispatched by
//! `match`:
//!
//! - `PositionMove`: drive a motor pair to an encoder position
//! - `EncoderMove`: drive wheels a distance or angle on their encoders
//! - `Instant`: write fixed powers once and finish
//!
//! Every action declares the actuators it writes through `lease`, which the
//! `Scheduler` uses to detect contention.

pub mod scheduler;

use core::fmt;

use embassy_time::Instant;

use crate::utils::controllers::{encoder::EncoderMove, position::PositionMove};
use crate::utils::hardware::{ActuatorId, Hardware};
use crate::utils::telemetry::Telemetry;

pub use scheduler::{Scheduler, TickSummary};

/// Actuators an action holds write access to while it is in flight.
pub type Lease = heapless::Vec<ActuatorId, 4>;

/// Outcome of one `Action::tick`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickResult {
    /// Still working; tick again next loop.
    Pending,
    Complete,
    Failed(ActionError),
}

/// Errors raised by actions or by the scheduler when admitting them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ActionError {
    /// Requested position lies outside the configured travel.
    TargetOutOfBounds { target: i32, min: i32, max: i32 },
    /// An in-flight action already holds this actuator.
    Contention { actuator: ActuatorId },
}

impl fmt::Display for ActionError {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ActionError::TargetOutOfBounds { target, min, max } => {
                write!(f, "target position {target} outside [{min}, {max}]")
            }
            ActionError::Contention { actuator } => {
                write!(f, "actuator {actuator:?} is leased by a running action")
            }
        }
    }
}

/// Everything an action may touch during one tick.
pub struct TickContext<'a> {
    pub hw: &'a mut dyn Hardware,
    pub telemetry: &'a mut dyn Telemetry,
    /// Time at the start of this loop iteration.
    pub now: Instant,
}

impl<'a> TickContext<'a> {
    pub fn new(
        hw: &'a mut dyn Hardware,
        telemetry: &'a mut dyn Telemetry,
        now: Instant,
    ) -> Self {
        Self { hw, telemetry, now }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    PositionMove(PositionMove),
    EncoderMove(EncoderMove),
    Instant(InstantEffect),
}

impl Action {
    pub fn name(&self) -> &'static str {
        match self {
            Action::PositionMove(_) => "position_move",
            Action::EncoderMove(_) => "encoder_move",
            Action::Instant(_) => "instant",
        }
    }

    pub fn lease(&self) -> Lease {
        match self {
            Action::PositionMove(a) => a.lease(),
            Action::EncoderMove(a) => a.lease(),
            Action::Instant(a) => a.lease(),
        }
    }

    /// Advance by one step.
    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_>,
    ) -> TickResult {
        match self {
            Action::PositionMove(a) => a.tick(ctx),
            Action::EncoderMove(a) => a.tick(ctx),
            Action::Instant(a) => a.tick(ctx),
        }
    }

    /// Stop early: zero the power of every leased actuator.
    pub fn cancel(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        match self {
            Action::PositionMove(a) => a.cancel(hw),
            Action::EncoderMove(a) => a.cancel(hw),
            Action::Instant(a) => a.cancel(hw),
        }
    }
}

impl From<PositionMove> for Action {
    fn from(value: PositionMove) -> Self {
        Action::PositionMove(value)
    }
}

impl From<EncoderMove> for Action {
    fn from(value: EncoderMove) -> Self {
        Action::EncoderMove(value)
    }
}

impl From<InstantEffect> for Action {
    fn from(value: InstantEffect) -> Self {
        Action::Instant(value)
    }
}

/// Fixed power writes applied on the first tick; completes immediately.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstantEffect {
    writes: heapless::Vec<(ActuatorId, f64), 4>,
    applied: bool,
}

impl InstantEffect {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a power write. Writes past the fourth actuator are dropped.
    pub fn set(
        mut self,
        actuator: ActuatorId,
        power: f64,
    ) -> Self {
        if self.writes.push((actuator, power)).is_err() {
            tracing::warn!(actuator = ?actuator, "instant effect full, write dropped");
        }
        self
    }

    pub fn writes(&self) -> &[(ActuatorId, f64)] {
        &self.writes
    }

    pub fn lease(&self) -> Lease {
        self.writes.iter().map(|(id, _)| *id).collect()
    }

    pub fn cancel(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        for &(id, _) in self.writes.iter() {
            hw.motor(id).set_power(0.0);
        }
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_>,
    ) -> TickResult {
        if !self.applied {
            for &(id, power) in self.writes.iter() {
                ctx.hw.motor(id).set_power(power);
            }
            self.applied = true;
        }
        TickResult::Complete
    }
}
