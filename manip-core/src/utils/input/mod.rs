//! Operator input: edge-tracked gamepad state and the interactions bound to it.
//!
//! - `buttons`: snapshots, `tapped`/`pressed` edge tracking
//! - `interaction`: trigger/factory pairs evaluated by the manual loop

pub mod buttons;
pub mod interaction;

pub use buttons::{Axis, Button, ButtonState, Control, GamepadSnapshot, InputState, Pad};
pub use interaction::{always, pressed, tapped, Interaction};
