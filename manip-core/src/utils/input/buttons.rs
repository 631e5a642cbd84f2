//! Gamepad snapshots and per-control edge tracking.
//!
//! The input collaborator hands over one `GamepadSnapshot` per pad per tick.
//! `InputState::update` diffs it against the previous tick exactly once, so
//! `tapped` and `pressed` are plain reads with no hidden state of their own.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

/// The two input sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Pad {
    /// Gamepad 1: driving.
    Driver,
    /// Gamepad 2: lift and claw.
    Operator,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Button {
    A,
    B,
    X,
    Y,
    DpadUp,
    DpadDown,
    DpadLeft,
    DpadRight,
    LeftBumper,
    RightBumper,
    LeftStickButton,
    RightStickButton,
    Back,
    Start,
    Guide,
}

impl Button {
    pub const ALL: [Button; 15] = [
        Button::A,
        Button::B,
        Button::X,
        Button::Y,
        Button::DpadUp,
        Button::DpadDown,
        Button::DpadLeft,
        Button::DpadRight,
        Button::LeftBumper,
        Button::RightBumper,
        Button::LeftStickButton,
        Button::RightStickButton,
        Button::Back,
        Button::Start,
        Button::Guide,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Axis {
    LeftStickX,
    LeftStickY,
    RightStickX,
    RightStickY,
    LeftTrigger,
    RightTrigger,
}

/// A button on a particular pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Control {
    pub pad: Pad,
    pub button: Button,
}

impl Control {
    pub const fn new(
        pad: Pad,
        button: Button,
    ) -> Self {
        Self { pad, button }
    }

    pub const fn driver(button: Button) -> Self {
        Self::new(Pad::Driver, button)
    }

    pub const fn operator(button: Button) -> Self {
        Self::new(Pad::Operator, button)
    }
}

/// Previous and current reading of one button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    pub previous: bool,
    pub current: bool,
}

impl ButtonState {
    /// Went down this tick.
    pub fn tapped(&self) -> bool {
        !self.previous && self.current
    }

    /// Held this tick.
    pub fn pressed(&self) -> bool {
        self.current
    }

    /// Came up this tick.
    pub fn released(&self) -> bool {
        self.previous && !self.current
    }

    pub fn advance(
        &mut self,
        now: bool,
    ) {
        self.previous = self.current;
        self.current = now;
    }
}

/// Raw state of one gamepad for one tick.
///
/// Deserializes from e.g. `{"buttons":["a","dpad_up"],"left_stick_y":-1.0}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GamepadSnapshot {
    pub buttons: heapless::Vec<Button, 16>,
    pub left_stick_x: f64,
    pub left_stick_y: f64,
    pub right_stick_x: f64,
    pub right_stick_y: f64,
    pub left_trigger: f64,
    pub right_trigger: f64,
}

impl GamepadSnapshot {
    pub fn held(
        &self,
        button: Button,
    ) -> bool {
        self.buttons.contains(&button)
    }

    pub fn axis(
        &self,
        axis: Axis,
    ) -> f64 {
        match axis {
            Axis::LeftStickX => self.left_stick_x,
            Axis::LeftStickY => self.left_stick_y,
            Axis::RightStickX => self.right_stick_x,
            Axis::RightStickY => self.right_stick_y,
            Axis::LeftTrigger => self.left_trigger,
            Axis::RightTrigger => self.right_trigger,
        }
    }

    pub fn with_button(
        mut self,
        button: Button,
    ) -> Self {
        if !self.held(button) {
            let _ = self.buttons.push(button);
        }
        self
    }

    pub fn with_axis(
        mut self,
        axis: Axis,
        value: f64,
    ) -> Self {
        let slot = match axis {
            Axis::LeftStickX => &mut self.left_stick_x,
            Axis::LeftStickY => &mut self.left_stick_y,
            Axis::RightStickX => &mut self.right_stick_x,
            Axis::RightStickY => &mut self.right_stick_y,
            Axis::LeftTrigger => &mut self.left_trigger,
            Axis::RightTrigger => &mut self.right_trigger,
        };
        *slot = value;
        self
    }
}

/// Edge-tracked state of both pads.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    buttons: HashMap<Control, ButtonState>,
    driver: GamepadSnapshot,
    operator: GamepadSnapshot,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Shift current readings to previous and take the new snapshots.
    pub fn update(
        &mut self,
        driver: &GamepadSnapshot,
        operator: &GamepadSnapshot,
    ) {
        for (pad, snapshot) in [(Pad::Driver, driver), (Pad::Operator, operator)] {
            for button in Button::ALL {
                self.buttons
                    .entry(Control::new(pad, button))
                    .or_default()
                    .advance(snapshot.held(button));
            }
        }
        self.driver = driver.clone();
        self.operator = operator.clone();
    }

    pub fn state(
        &self,
        control: Control,
    ) -> ButtonState {
        self.buttons.get(&control).copied().unwrap_or_default()
    }

    pub fn tapped(
        &self,
        control: Control,
    ) -> bool {
        self.state(control).tapped()
    }

    pub fn pressed(
        &self,
        control: Control,
    ) -> bool {
        self.state(control).pressed()
    }

    pub fn released(
        &self,
        control: Control,
    ) -> bool {
        self.state(control).released()
    }

    pub fn axis(
        &self,
        pad: Pad,
        axis: Axis,
    ) -> f64 {
        self.snapshot(pad).axis(axis)
    }

    pub fn snapshot(
        &self,
        pad: Pad,
    ) -> &GamepadSnapshot {
        match pad {
            Pad::Driver => &self.driver,
            Pad::Operator => &self.operator,
        }
    }
}
