//! Utility re-exports and helper macros for the manipulator core.
//!
//! This module groups the control core and the pieces it talks to:
//!
//! - `actions`: resumable actions and the in-flight scheduler
//! - `controllers`: lift position moves and encoder drive moves
//! - `input`: edge-tracked gamepad state and interactions
//! - `manual`: the per-tick manual control loop and default bindings
//! - `math`: mecanum kinematics
//! - `hardware`, `sim`: the hardware interface and an in-memory robot
//! - `telemetry`, `config`: diagnostics sink and tunable parameters
//!
//! The `mk_static!` macro simplifies static initialization in no-std contexts.

pub mod actions;
pub mod config;
pub mod controllers;
pub mod hardware;
pub mod input;
pub mod manual;
pub mod math;
pub mod sim;
pub mod telemetry;

pub use actions::{Action, TickContext, TickResult};
pub use config::RobotConfig;
pub use embassy_time::{Duration, Instant};
pub use manual::ManualLoop;
pub use math::kinematics::mecanum_powers;

#[macro_export]
/// Initialize a no-std static cell and write the given value into it.
///
/// This macro creates a `static_cell::StaticCell` for type `$t` and initializes
/// it with `$val`, returning a mutable reference to the stored value.
macro_rules! mk_static {
    ($t:ty, $val:expr) => {{
        static STATIC_CELL: static_cell::StaticCell<$t> = static_cell::StaticCell::new();
        STATIC_CELL.uninit().write($val)
    }};
}
