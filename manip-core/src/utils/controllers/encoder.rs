//! Encoder-driven drive moves: straight lines, strafes and point turns.
//!
//! `EncoderDrive` converts millimetres or degrees into encoder counts from the
//! drivetrain geometry and builds an `EncoderMove`. The move puts each targeted
//! wheel into `RunToPosition` with its own signed target and then waits for the
//! motor controllers to finish. A move that is still busy when its time budget
//! runs out is force-stopped and reported complete.

use core::f64::consts::PI;

use embassy_time::{Duration, Instant};

use crate::utils::actions::{Lease, TickContext, TickResult};
use crate::utils::config::EncoderParams;
use crate::utils::hardware::{ActuatorId, Hardware, RunMode};
use crate::utils::telemetry::TelemetryValue;

/// A wheel and the sign applied to the move's count target on that wheel.
pub type WheelSign = (ActuatorId, i32);

/// Straight-line translation: every wheel forward.
pub const TRANSLATE: [WheelSign; 4] = [
    (ActuatorId::FrontLeft, 1),
    (ActuatorId::FrontRight, 1),
    (ActuatorId::RearLeft, 1),
    (ActuatorId::RearRight, 1),
];

/// Strafe on the front pair, signs as in the mecanum x column.
pub const STRAFE: [WheelSign; 2] = [(ActuatorId::FrontLeft, 1), (ActuatorId::FrontRight, -1)];

/// Spin on the front-right/rear-left diagonal, signs as in the rotation column.
pub const SPIN: [WheelSign; 2] = [(ActuatorId::FrontRight, -1), (ActuatorId::RearLeft, 1)];

/// Encoder target shared by every wheel of a move, before per-wheel signs.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionRequest {
    pub target_counts: i32,
    pub speed: f64,
    pub wheels: heapless::Vec<WheelSign, 4>,
}

impl MotionRequest {
    pub fn new(
        target_counts: i32,
        speed: f64,
        wheels: &[WheelSign],
    ) -> Self {
        Self {
            target_counts,
            speed,
            wheels: wheels.iter().copied().take(4).collect(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderState {
    NotStarted,
    Running { started_at: Instant },
    Done,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EncoderMove {
    request: MotionRequest,
    timeout: Duration,
    state: EncoderState,
}

impl EncoderMove {
    pub fn new(
        request: MotionRequest,
        timeout: Duration,
    ) -> Self {
        Self {
            request,
            timeout,
            state: EncoderState::NotStarted,
        }
    }

    pub fn request(&self) -> &MotionRequest {
        &self.request
    }

    pub fn state(&self) -> EncoderState {
        self.state
    }

    pub fn lease(&self) -> Lease {
        self.request.wheels.iter().map(|(id, _)| *id).collect()
    }

    pub fn tick(
        &mut self,
        ctx: &mut TickContext<'_>,
    ) -> TickResult {
        match self.state {
            EncoderState::NotStarted => {
                let speed = self.request.speed.abs();
                for &(id, sign) in self.request.wheels.iter() {
                    let motor = ctx.hw.motor(id);
                    let target = motor
                        .current_position()
                        .saturating_add(self.request.target_counts.saturating_mul(sign));
                    motor.set_target_position(target);
                    motor.set_run_mode(RunMode::RunToPosition);
                    motor.set_power(speed);
                }
                tracing::debug!(
                    counts = self.request.target_counts,
                    speed,
                    wheels = self.request.wheels.len(),
                    "encoder move started"
                );
                self.state = EncoderState::Running {
                    started_at: ctx.now,
                };
                TickResult::Pending
            }
            EncoderState::Running { started_at } => {
                let elapsed = ctx.now.saturating_duration_since(started_at);
                ctx.telemetry.put(
                    "encoder move elapsed ms",
                    TelemetryValue::Int(elapsed.as_millis().min(i32::MAX as u64) as i32),
                );
                let busy = self
                    .request
                    .wheels
                    .iter()
                    .any(|&(id, _)| ctx.hw.motor(id).is_busy());
                if busy && elapsed <= self.timeout {
                    return TickResult::Pending;
                }
                if busy {
                    tracing::warn!(
                        elapsed_ms = elapsed.as_millis(),
                        timeout_ms = self.timeout.as_millis(),
                        "encoder move timed out, stopping"
                    );
                }
                self.stop(ctx.hw);
                TickResult::Complete
            }
            EncoderState::Done => TickResult::Complete,
        }
    }

    pub fn cancel(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        if self.state != EncoderState::Done {
            self.stop(hw);
        }
    }

    fn stop(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        for &(id, _) in self.request.wheels.iter() {
            let motor = hw.motor(id);
            motor.set_power(0.0);
            motor.set_run_mode(RunMode::RunUsingEncoder);
        }
        self.state = EncoderState::Done;
    }
}

/// Unit conversion and move construction for the drivetrain.
#[derive(Debug, Clone, Copy)]
pub struct EncoderDrive {
    params: EncoderParams,
}

impl EncoderDrive {
    pub fn new(params: EncoderParams) -> Self {
        Self { params }
    }

    pub fn counts_per_mm(&self) -> f64 {
        (self.params.counts_per_motor_rev * self.params.gear_reduction)
            / (self.params.wheel_diameter_mm * PI)
    }

    pub fn counts_for_mm(
        &self,
        distance_mm: f64,
    ) -> i32 {
        libm::round(distance_mm * self.counts_per_mm()) as i32
    }

    /// Arc length each wheel travels for the robot to turn `degrees` in place.
    pub fn arc_mm(
        &self,
        degrees: f64,
    ) -> f64 {
        (degrees / 360.0) * self.params.wheelbase_width_mm * PI
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.params.timeout_ms)
    }

    fn build(
        &self,
        speed: f64,
        distance_mm: f64,
        wheels: &[WheelSign],
    ) -> EncoderMove {
        EncoderMove::new(
            MotionRequest::new(self.counts_for_mm(distance_mm), speed, wheels),
            self.timeout(),
        )
    }

    /// Drive straight; negative distances drive backward.
    pub fn drive(
        &self,
        speed: f64,
        distance_mm: f64,
    ) -> EncoderMove {
        self.build(speed, distance_mm, &TRANSLATE)
    }

    pub fn strafe(
        &self,
        speed: f64,
        distance_mm: f64,
    ) -> EncoderMove {
        self.build(speed, distance_mm, &STRAFE)
    }

    /// Turn in place; positive angles turn clockwise.
    pub fn spin(
        &self,
        speed: f64,
        degrees: f64,
    ) -> EncoderMove {
        self.build(speed, self.arc_mm(degrees), &SPIN)
    }
}
