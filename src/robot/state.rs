use std::f64::consts::{FRAC_PI_2, TAU};

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Model constants
// ---------------------------------------------------------------------------

/// Target lateral distance from the wall, display units.
pub const SETPOINT: f64 = 250.0;
/// Wheel speed commanded when the controller output is zero.
pub const BASE_SPEED: f64 = 50.0;
/// Wheel speed difference divided by this gives the yaw rate (rad/s).
pub const TURN_DIVISOR: f64 = 20.0;

// ---------------------------------------------------------------------------
// Pose
// ---------------------------------------------------------------------------

/// Planar pose. `angle` is in radians, measured from +x towards +y.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
}

impl Pose {
    pub const fn new(x: f64, y: f64, angle: f64) -> Self {
        Self { x, y, angle }
    }

    /// Unit vector along the heading.
    pub fn heading(&self) -> Vector2<f64> {
        Vector2::new(self.angle.cos(), self.angle.sin())
    }
}

impl Default for Pose {
    /// Centre of a 500x500 field, facing +y.
    fn default() -> Self {
        Self::new(250.0, 250.0, FRAC_PI_2)
    }
}

/// Wrap an angle into `[0, 2π)`.
///
/// Same result as `(a + 2π) % 2π` whenever `a > -2π`, which covers every
/// angle a single tick can produce from a normalized heading.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = (angle + TAU).rem_euclid(TAU);
    // rem_euclid may round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

// ---------------------------------------------------------------------------
// Read-only snapshot for display and logging
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RobotState {
    pub x: f64,
    pub y: f64,
    pub angle: f64,
    pub left_speed: f64,
    pub right_speed: f64,
    pub target_left_speed: f64,
    pub target_right_speed: f64,
    pub distance_run: f64,
}

impl RobotState {
    pub fn pose(&self) -> Pose {
        Pose::new(self.x, self.y, self.angle)
    }

    /// Heading in degrees, for display.
    pub fn angle_deg(&self) -> f64 {
        self.angle.to_degrees()
    }
}
