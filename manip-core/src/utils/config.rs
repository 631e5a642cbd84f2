//! Tunable robot parameters.
//!
//! Every field has a default matching the competition robot, so a config file
//! only needs to name what it overrides.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RobotConfig {
    pub lift: LiftParams,
    pub arm: ArmParams,
    pub drive: DriveTuning,
    pub encoder: EncoderParams,
    pub speed_modes: SpeedModes,
    pub contention: ContentionPolicy,
    /// Power magnitude for opening/closing the claw.
    pub claw_power: f64,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            lift: LiftParams::default(),
            arm: ArmParams::default(),
            drive: DriveTuning::default(),
            encoder: EncoderParams::default(),
            speed_modes: SpeedModes::default(),
            contention: ContentionPolicy::default(),
            claw_power: 1.0,
        }
    }
}

/// Bounds and power for the dual-motor lift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LiftParams {
    pub min_position: i32,
    pub max_position: i32,
    pub max_power: f64,
    /// Target used by the "drop" binding.
    pub drop_position: i32,
}

impl Default for LiftParams {
    fn default() -> Self {
        Self {
            min_position: 0,
            max_position: 2000,
            max_power: 0.8,
            drop_position: 100,
        }
    }
}

/// Travel and powers for the single-motor arm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArmParams {
    pub min_position: i32,
    pub max_position: i32,
    pub extend_power: f64,
    pub retract_power: f64,
}

impl Default for ArmParams {
    fn default() -> Self {
        Self {
            min_position: 20,
            max_position: 100,
            extend_power: 0.25,
            retract_power: 0.45,
        }
    }
}

/// Stick shaping for manual driving.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DriveTuning {
    /// Stick deflection below which an axis reads as zero.
    pub deadzone: f64,
    /// Wheel power below which the wheel is switched off.
    pub min_power: f64,
    /// Extra scale applied to the rotation axis.
    pub turn_scale: f64,
    /// Exponent of the response curve.
    pub exponent: f64,
}

impl Default for DriveTuning {
    fn default() -> Self {
        Self {
            deadzone: 0.05,
            min_power: 0.05,
            turn_scale: 0.8,
            exponent: 2.0,
        }
    }
}

/// Drivetrain geometry for encoder-driven moves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncoderParams {
    pub counts_per_motor_rev: f64,
    pub gear_reduction: f64,
    pub wheel_diameter_mm: f64,
    pub wheelbase_width_mm: f64,
    /// Budget for one encoder move before it is force-stopped.
    pub timeout_ms: u64,
    /// Wheel power used by the quick-move bindings.
    pub move_speed: f64,
}

impl Default for EncoderParams {
    fn default() -> Self {
        Self {
            counts_per_motor_rev: 560.0,
            gear_reduction: 1.0,
            wheel_diameter_mm: 96.0,
            wheelbase_width_mm: 460.0,
            timeout_ms: 6000,
            move_speed: 0.6,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpeedModes {
    pub turbo: f64,
    pub normal: f64,
    pub precise: f64,
}

impl Default for SpeedModes {
    fn default() -> Self {
        Self {
            turbo: 1.0,
            normal: 0.8,
            precise: 0.4,
        }
    }
}

/// What the scheduler does with an action whose actuators are already leased.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentionPolicy {
    /// Refuse the new action.
    #[default]
    Reject,
    /// Admit it with a warning; the later write in a tick wins.
    Flag,
}
