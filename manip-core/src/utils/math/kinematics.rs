//! Kinematics for a four-wheeled mecanum drivetrain.
//!
//! `mecanum_powers` maps a stick command `(x, y, rotation)` to four signed
//! wheel powers. Each axis is shaped (deadzone, rescale, exponential curve),
//! mixed, uniformly normalized so no wheel exceeds 1.0, scaled by the active
//! speed mode and finally floored so tiny powers switch the wheel off.
//!
//! # Example
//! ```rust
//! use manip_core::utils::config::DriveTuning;
//! use manip_core::utils::math::kinematics::mecanum_powers;
//! let powers = mecanum_powers(0.0, 1.0, 0.0, &DriveTuning::default(), 1.0);
//! assert_eq!(powers.front_left, 1.0);
//! ```

use serde::Serialize;

use crate::utils::config::DriveTuning;
use crate::utils::hardware::ActuatorId;

/// Signed power for each mecanum wheel.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct WheelPowers {
    pub front_right: f64,
    pub front_left: f64,
    pub rear_right: f64,
    pub rear_left: f64,
}

impl WheelPowers {
    /// `[front_right, front_left, rear_right, rear_left]`
    pub fn to_array(self) -> [f64; 4] {
        [
            self.front_right,
            self.front_left,
            self.rear_right,
            self.rear_left,
        ]
    }

    pub fn from_array(p: [f64; 4]) -> Self {
        Self {
            front_right: p[0],
            front_left: p[1],
            rear_right: p[2],
            rear_left: p[3],
        }
    }

    pub fn get(
        &self,
        wheel: ActuatorId,
    ) -> Option<f64> {
        match wheel {
            ActuatorId::FrontRight => Some(self.front_right),
            ActuatorId::FrontLeft => Some(self.front_left),
            ActuatorId::RearRight => Some(self.rear_right),
            ActuatorId::RearLeft => Some(self.rear_left),
            _ => None,
        }
    }

    fn map(
        self,
        f: impl Fn(f64) -> f64,
    ) -> Self {
        let [a, b, c, d] = self.to_array();
        Self::from_array([f(a), f(b), f(c), f(d)])
    }
}

/// Deadzone, rescale and exponential response for one axis, sign preserved.
pub fn shape_axis(
    value: f64,
    deadzone: f64,
    exponent: f64,
) -> f64 {
    let magnitude = value.abs();
    if magnitude < deadzone {
        return 0.0;
    }
    let rescaled = ((magnitude - deadzone) / (1.0 - deadzone)).min(1.0);
    let curved = libm::pow(rescaled, exponent);
    if value < 0.0 {
        -curved
    } else {
        curved
    }
}

/// Mix shaped axes into raw wheel powers without any normalization.
pub fn mix(
    x: f64,
    y: f64,
    r: f64,
) -> WheelPowers {
    WheelPowers {
        front_right: y - x - r,
        front_left: y + x + r,
        rear_right: y + x - r,
        rear_left: y - x + r,
    }
}

/// Divide all four powers by the largest magnitude when it exceeds 1.0.
pub fn normalize(raw: WheelPowers) -> WheelPowers {
    let max = raw
        .to_array()
        .iter()
        .fold(0.0_f64, |acc, p| acc.max(p.abs()));
    if max > 1.0 {
        raw.map(|p| p / max)
    } else {
        raw
    }
}

/// Compute wheel powers for a stick command.
///
/// `x` strafes right, `y` drives forward and `rotation` turns clockwise, all in
/// `[-1, 1]`. `speed_scale` is the active speed mode; pass 1.0 for full range.
pub fn mecanum_powers(
    x: f64,
    y: f64,
    rotation: f64,
    tuning: &DriveTuning,
    speed_scale: f64,
) -> WheelPowers {
    let x = shape_axis(x, tuning.deadzone, tuning.exponent);
    let y = shape_axis(y, tuning.deadzone, tuning.exponent);
    let r = shape_axis(rotation, tuning.deadzone, tuning.exponent) * tuning.turn_scale;

    let min_power = tuning.min_power;
    normalize(mix(x, y, r)).map(|p| {
        let p = p * speed_scale;
        if p.abs() < min_power {
            0.0
        } else {
            p
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> DriveTuning {
        DriveTuning::default()
    }

    #[test]
    fn inside_deadzone_is_stationary() {
        for d in [0.0, 0.01, -0.03, 0.049, -0.049] {
            let p = mecanum_powers(d, 0.0, 0.0, &tuning(), 1.0);
            assert_eq!(p, WheelPowers::default());
            let p = mecanum_powers(0.0, d, d, &tuning(), 1.0);
            assert_eq!(p, WheelPowers::default());
        }
    }

    #[test]
    fn shaping_is_odd_and_reaches_full_scale() {
        let t = tuning();
        assert_eq!(shape_axis(1.0, t.deadzone, t.exponent), 1.0);
        assert_eq!(shape_axis(-1.0, t.deadzone, t.exponent), -1.0);
        let a = shape_axis(0.5, t.deadzone, t.exponent);
        let b = shape_axis(-0.5, t.deadzone, t.exponent);
        assert!(a > 0.0 && a < 0.5);
        assert_eq!(a, -b);
    }

    #[test]
    fn diagonal_is_normalized_uniformly() {
        let p = mecanum_powers(1.0, 1.0, 0.0, &tuning(), 1.0);
        // raw: fr = 0, fl = 2, rr = 2, rl = 0
        assert_eq!(p.front_left, 1.0);
        assert_eq!(p.rear_right, 1.0);
        assert_eq!(p.front_right, 0.0);
        assert_eq!(p.rear_left, 0.0);
    }

    #[test]
    fn normalization_preserves_ratios() {
        let raw = mix(0.3, 0.9, 0.4);
        let norm = normalize(raw);
        let max = raw.to_array().iter().fold(0.0_f64, |a, p| a.max(p.abs()));
        assert!(max > 1.0);
        for (r, n) in raw.to_array().iter().zip(norm.to_array()) {
            assert!((r / max - n).abs() < 1e-12);
        }
    }

    #[test]
    fn small_outputs_are_floored_to_zero() {
        // y shaped to ~0.0028, well under the 0.05 floor
        let p = mecanum_powers(0.0, 0.1, 0.0, &tuning(), 1.0);
        assert_eq!(p, WheelPowers::default());
        // full forward in precise mode survives the floor
        let p = mecanum_powers(0.0, 1.0, 0.0, &tuning(), 0.4);
        assert_eq!(p.front_left, 0.4);
    }

    #[test]
    fn outputs_are_bounded_over_the_input_cube() {
        let steps = [-1.0, -0.7, -0.3, -0.04, 0.0, 0.2, 0.55, 0.9, 1.0];
        for x in steps {
            for y in steps {
                for r in steps {
                    let a = mecanum_powers(x, y, r, &tuning(), 1.0);
                    let b = mecanum_powers(x, y, r, &tuning(), 1.0);
                    assert_eq!(a, b);
                    for p in a.to_array() {
                        assert!(p.abs() <= 1.0, "{p} out of range for ({x}, {y}, {r})");
                        assert!(p == 0.0 || p.abs() >= tuning().min_power);
                    }
                }
            }
        }
    }

    #[test]
    fn rotation_is_scaled_by_turn_sensitivity() {
        let p = mecanum_powers(0.0, 0.0, 1.0, &tuning(), 1.0);
        assert!((p.front_left - 0.8).abs() < 1e-12);
        assert!((p.front_right + 0.8).abs() < 1e-12);
    }
}
