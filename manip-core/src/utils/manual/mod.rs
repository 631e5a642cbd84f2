//! Manual (driver-controlled) mode.
//!
//! `ManualLoop::tick` is called once per iteration of the fixed-rate control
//! loop. Within a tick it:
//!
//! 1. diffs the new gamepad snapshots against the last tick,
//! 2. handles the halt control, if one is bound,
//! 3. selects the speed mode and drives the wheels from the sticks (skipping
//!    any wheel an in-flight action holds),
//! 4. evaluates every interaction in registration order, submitting a new
//!    action for each one that fires (interactions yielding to a leased
//!    actuator are skipped),
//! 5. ticks every in-flight action once, in submission order,
//! 6. reports telemetry.
//!
//! Nothing in a tick blocks, and no action outcome can stop the loop.

pub mod bindings;

use alloc::vec::Vec;

use crate::utils::actions::{Scheduler, TickContext, TickSummary};
use crate::utils::config::{RobotConfig, SpeedModes};
use crate::utils::hardware::{ActuatorId, Hardware};
use crate::utils::input::{Button, Control, GamepadSnapshot, InputState, Interaction, Pad};
use crate::utils::math::kinematics::{mecanum_powers, WheelPowers};
use crate::utils::telemetry::TelemetryValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeedMode {
    Turbo,
    #[default]
    Normal,
    Precise,
}

impl SpeedMode {
    pub fn label(self) -> &'static str {
        match self {
            SpeedMode::Turbo => "TURBO",
            SpeedMode::Normal => "NORMAL",
            SpeedMode::Precise => "PRECISE",
        }
    }

    pub fn scale(
        self,
        modes: &SpeedModes,
    ) -> f64 {
        match self {
            SpeedMode::Turbo => modes.turbo,
            SpeedMode::Normal => modes.normal,
            SpeedMode::Precise => modes.precise,
        }
    }
}

pub struct ManualLoop {
    config: RobotConfig,
    input: InputState,
    interactions: Vec<Interaction>,
    scheduler: Scheduler,
    speed_mode: SpeedMode,
    halt_control: Option<Control>,
    drive_powers: WheelPowers,
}

impl ManualLoop {
    /// A loop with no interactions and no halt control.
    pub fn new(config: RobotConfig) -> Self {
        Self {
            config,
            input: InputState::new(),
            interactions: Vec::new(),
            scheduler: Scheduler::new(config.contention),
            speed_mode: SpeedMode::default(),
            halt_control: None,
            drive_powers: WheelPowers::default(),
        }
    }

    /// The competition control scheme; driver X halts everything.
    pub fn with_default_bindings(config: RobotConfig) -> Self {
        let mut manual = Self::new(config);
        for interaction in bindings::default_interactions(&config) {
            manual.register(interaction);
        }
        manual.set_halt_control(Some(Control::driver(Button::X)));
        manual
    }

    /// Append an interaction; it is evaluated after every earlier one.
    pub fn register(
        &mut self,
        interaction: Interaction,
    ) {
        tracing::debug!(name = interaction.name(), "interaction registered");
        self.interactions.push(interaction);
    }

    pub fn set_halt_control(
        &mut self,
        control: Option<Control>,
    ) {
        self.halt_control = control;
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn speed_mode(&self) -> SpeedMode {
        self.speed_mode
    }

    /// Wheel powers computed from the sticks on the last tick.
    pub fn drive_powers(&self) -> WheelPowers {
        self.drive_powers
    }

    /// Run one loop iteration.
    pub fn tick(
        &mut self,
        driver: &GamepadSnapshot,
        operator: &GamepadSnapshot,
        ctx: &mut TickContext<'_>,
    ) -> TickSummary {
        self.input.update(driver, operator);

        if self.halt_control.is_some_and(|c| self.input.tapped(c)) {
            self.halt(ctx.hw);
        } else {
            self.update_speed_mode();
            self.drive(ctx.hw);
            self.dispatch(ctx.hw);
        }

        let summary = self.scheduler.tick(ctx);
        self.report(ctx);
        summary
    }

    /// Cancel every in-flight action and stop the drivetrain.
    pub fn halt(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        tracing::info!(in_flight = self.scheduler.len(), "halting");
        self.scheduler.cancel_all(hw);
        for id in ActuatorId::DRIVE {
            hw.motor(id).set_power(0.0);
        }
        self.drive_powers = WheelPowers::default();
    }

    fn update_speed_mode(&mut self) {
        let mode = if self.input.pressed(Control::driver(Button::Y)) {
            SpeedMode::Turbo
        } else if self.input.pressed(Control::driver(Button::B)) {
            SpeedMode::Normal
        } else if self.input.pressed(Control::driver(Button::A)) {
            SpeedMode::Precise
        } else {
            return;
        };
        if mode != self.speed_mode {
            tracing::info!(mode = mode.label(), "speed mode changed");
            self.speed_mode = mode;
        }
    }

    fn drive(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        let pad = self.input.snapshot(Pad::Driver);
        let powers = mecanum_powers(
            pad.left_stick_x,
            -pad.left_stick_y,
            pad.right_stick_x,
            &self.config.drive,
            self.speed_mode.scale(&self.config.speed_modes),
        );
        for id in ActuatorId::DRIVE {
            if self.scheduler.is_leased(id) {
                continue;
            }
            if let Some(power) = powers.get(id) {
                hw.motor(id).set_power(power);
            }
        }
        self.drive_powers = powers;
    }

    fn dispatch(
        &mut self,
        hw: &mut dyn Hardware,
    ) {
        for interaction in self.interactions.iter() {
            if !interaction.triggered(&self.input) {
                continue;
            }
            if interaction
                .yields_to()
                .iter()
                .any(|&id| self.scheduler.is_leased(id))
            {
                continue;
            }
            let action = interaction.instantiate(&self.input, hw);
            if let Err(error) = self.scheduler.submit(action) {
                tracing::debug!(interaction = interaction.name(), %error, "interaction skipped");
            }
        }
    }

    fn report(
        &self,
        ctx: &mut TickContext<'_>,
    ) {
        let positioned = [
            (ActuatorId::LiftRight, "lift right position", "lift right busy"),
            (ActuatorId::LiftLeft, "lift left position", "lift left busy"),
            (ActuatorId::Arm, "arm position", "arm busy"),
        ];
        for (id, position_key, busy_key) in positioned {
            let motor = ctx.hw.motor(id);
            let (position, busy) = (motor.current_position(), motor.is_busy());
            ctx.telemetry.put(position_key, TelemetryValue::Int(position));
            ctx.telemetry.put(busy_key, TelemetryValue::Bool(busy));
        }

        let p = self.drive_powers;
        ctx.telemetry
            .put("drive front right", TelemetryValue::Float(p.front_right));
        ctx.telemetry
            .put("drive front left", TelemetryValue::Float(p.front_left));
        ctx.telemetry
            .put("drive rear right", TelemetryValue::Float(p.rear_right));
        ctx.telemetry
            .put("drive rear left", TelemetryValue::Float(p.rear_left));

        if let Some(distance) = ctx.hw.distance_mm() {
            ctx.telemetry
                .put("distance mm", TelemetryValue::Float(distance));
        }
        let objects = ctx.hw.detected_objects().len();
        ctx.telemetry
            .put("object count", TelemetryValue::Count(objects));

        ctx.telemetry.put(
            "actions in flight",
            TelemetryValue::Count(self.scheduler.len()),
        );
        ctx.telemetry
            .put("speed mode", TelemetryValue::Text(self.speed_mode.label()));
        ctx.telemetry.put(
            "actions rejected",
            TelemetryValue::Count(self.scheduler.rejected() as usize),
        );
    }
}

impl core::fmt::Debug for ManualLoop {
    fn fmt(
        &self,
        f: &mut core::fmt::Formatter<'_>,
    ) -> core::fmt::Result {
        f.debug_struct("ManualLoop")
            .field("interactions", &self.interactions)
            .field("scheduler", &self.scheduler)
            .field("speed_mode", &self.speed_mode)
            .finish_non_exhaustive()
    }
}
