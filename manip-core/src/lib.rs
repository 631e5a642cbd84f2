//! Control core for a mecanum-drive mobile manipulator on no-std platforms.
//!
//! Multi-step operations (lift moves, encoder drives, turns) are cooperative
//! actions polled once per tick by `utils::ManualLoop`; see `utils::actions`.
//!
//! For a runnable host simulation, see the `mock-bot` binary.
#![no_std]

extern crate alloc;

pub mod utils;
