//! The competition control scheme.
//!
//! Operator (gamepad 2): bumpers raise/drop the lift, D-pad up/down nudge it,
//! the left stick drives it directly, X/Y extend/retract the arm and A/B run
//! the claw.
//! Driver (gamepad 1): D-pad runs encoder quick moves, left bumper strafes.
//! Sticks, speed modes and halt are handled by `ManualLoop` itself.
//!
//! The lift stick and the claw are bound with `always()` and emit an
//! `InstantEffect` every tick. The lift stick yields to the lift motors: while
//! a lift move holds them it is not evaluated at all.

use alloc::{vec, vec::Vec};

use crate::utils::actions::InstantEffect;
use crate::utils::config::RobotConfig;
use crate::utils::controllers::{Arm, EncoderDrive, Lift};
use crate::utils::hardware::ActuatorId;
use crate::utils::input::{always, tapped, Axis, Button, Control, Interaction, Pad};

/// Distance of the D-pad forward/backward quick moves.
pub const QUICK_DRIVE_MM: f64 = 600.0;
/// Distance of the bumper strafe.
pub const QUICK_STRAFE_MM: f64 = 300.0;
/// Encoder counts per lift nudge.
pub const LIFT_NUDGE: i32 = 150;

pub fn default_interactions(config: &RobotConfig) -> Vec<Interaction> {
    let lift = Lift::new(config.lift);
    let arm = Arm::new(config.arm);
    let drive = EncoderDrive::new(config.encoder);
    let speed = config.encoder.move_speed;
    let lift_power = config.lift.max_power;
    let claw_power = config.claw_power;

    vec![
        Interaction::new(
            "raise lift",
            tapped(Control::operator(Button::RightBumper)),
            move |_, _| lift.raise().into(),
        ),
        Interaction::new(
            "drop lift",
            tapped(Control::operator(Button::LeftBumper)),
            move |_, _| lift.drop().into(),
        ),
        Interaction::new(
            "nudge lift up",
            tapped(Control::operator(Button::DpadUp)),
            move |_, hw| {
                let position = hw.motor(ActuatorId::LiftRight).current_position();
                lift.lift(position.saturating_add(LIFT_NUDGE)).into()
            },
        ),
        Interaction::new(
            "nudge lift down",
            tapped(Control::operator(Button::DpadDown)),
            move |_, hw| {
                let position = hw.motor(ActuatorId::LiftRight).current_position();
                lift.lift(position.saturating_sub(LIFT_NUDGE)).into()
            },
        ),
        Interaction::new("lift stick", always(), move |input, _| {
            let power = -input.axis(Pad::Operator, Axis::LeftStickY) * lift_power;
            InstantEffect::new()
                .set(ActuatorId::LiftRight, power)
                .set(ActuatorId::LiftLeft, power)
                .into()
        })
        .yielding(&ActuatorId::LIFT),
        Interaction::new(
            "extend arm",
            tapped(Control::operator(Button::X)),
            move |_, _| arm.extend().into(),
        ),
        Interaction::new(
            "retract arm",
            tapped(Control::operator(Button::Y)),
            move |_, _| arm.retract().into(),
        ),
        Interaction::new("claw", always(), move |input, _| {
            let power = if input.pressed(Control::operator(Button::A)) {
                claw_power
            } else if input.pressed(Control::operator(Button::B)) {
                -claw_power
            } else {
                0.0
            };
            InstantEffect::new().set(ActuatorId::Claw, power).into()
        }),
        Interaction::new(
            "drive forward",
            tapped(Control::driver(Button::DpadUp)),
            move |_, _| drive.drive(speed, QUICK_DRIVE_MM).into(),
        ),
        Interaction::new(
            "drive backward",
            tapped(Control::driver(Button::DpadDown)),
            move |_, _| drive.drive(speed, -QUICK_DRIVE_MM).into(),
        ),
        Interaction::new(
            "turn left",
            tapped(Control::driver(Button::DpadLeft)),
            move |_, _| drive.spin(speed, -45.0).into(),
        ),
        Interaction::new(
            "turn right",
            tapped(Control::driver(Button::DpadRight)),
            move |_, _| drive.spin(speed, 90.0).into(),
        ),
        Interaction::new(
            "strafe",
            tapped(Control::driver(Button::LeftBumper)),
            move |_, _| drive.strafe(speed, QUICK_STRAFE_MM).into(),
        ),
    ]
}
