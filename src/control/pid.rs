use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// PID gains
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
}

impl Gains {
    pub const fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }
}

/// Gains the robot starts with.
pub const DEFAULT_GAINS: Gains = Gains::new(0.5, 0.1, 0.1);

impl Default for Gains {
    fn default() -> Self {
        DEFAULT_GAINS
    }
}

// ---------------------------------------------------------------------------
// PID Controller (single axis, setpoint/measurement form)
// ---------------------------------------------------------------------------

/// Classic PID with a plain running integral and backward-difference
/// derivative.
///
/// The integral is not clamped, so a sustained one-sided error winds it up
/// without bound.
#[derive(Debug, Clone)]
pub struct PidController {
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    integral: f64,
    previous_error: f64,
}

impl PidController {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd, integral: 0.0, previous_error: 0.0 }
    }

    pub fn from_gains(gains: Gains) -> Self {
        Self::new(gains.kp, gains.ki, gains.kd)
    }

    /// One control step. Returns `kp*e + ki*∫e + kd*de/dt`.
    ///
    /// `dt` must be strictly positive. With `dt == 0` the derivative term is
    /// `±inf` or `NaN` per IEEE-754 and is returned as such; rejecting that
    /// input is up to the caller.
    pub fn compute(&mut self, setpoint: f64, measurement: f64, dt: f64) -> f64 {
        let error = setpoint - measurement;
        self.integral += error * dt;
        let derivative = (error - self.previous_error) / dt;
        self.previous_error = error;
        self.kp * error + self.ki * self.integral + self.kd * derivative
    }

    /// Replace all three gains. Accumulated state is left untouched.
    pub fn set_params(&mut self, kp: f64, ki: f64, kd: f64) {
        self.kp = kp;
        self.ki = ki;
        self.kd = kd;
    }

    pub fn gains(&self) -> Gains {
        Gains::new(self.kp, self.ki, self.kd)
    }

    pub fn integral(&self) -> f64 {
        self.integral
    }

    pub fn previous_error(&self) -> f64 {
        self.previous_error
    }
}

impl Default for PidController {
    fn default() -> Self {
        Self::from_gains(DEFAULT_GAINS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pid_step_response() {
        let mut pid = PidController::new(1.0, 0.0, 0.0);
        let out = pid.compute(10.0, 0.0, 1.0);
        assert_eq!(out, 10.0, "Pure P should output Kp * error");
    }

    #[test]
    fn pid_integral_accumulates() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        assert_eq!(pid.compute(5.0, 0.0, 1.0), 5.0);
        assert_eq!(pid.compute(5.0, 0.0, 1.0), 10.0);
    }

    #[test]
    fn integral_is_not_clamped() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        for _ in 0..1000 {
            pid.compute(100.0, 0.0, 1.0);
        }
        assert_eq!(pid.integral(), 100_000.0);
    }

    #[test]
    fn derivative_uses_previous_error() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        // First call: previous error starts at zero.
        assert_eq!(pid.compute(4.0, 0.0, 0.5), 8.0);
        // Same error again: derivative collapses.
        assert_eq!(pid.compute(4.0, 0.0, 0.5), 0.0);
        assert_eq!(pid.previous_error(), 4.0);
    }

    #[test]
    fn set_params_keeps_accumulated_state() {
        let mut pid = PidController::new(0.0, 1.0, 0.0);
        pid.compute(5.0, 0.0, 1.0);
        let integral = pid.integral();
        let prev = pid.previous_error();

        pid.set_params(2.0, 0.0, 0.0);
        assert_eq!(pid.integral(), integral);
        assert_eq!(pid.previous_error(), prev);
        assert_eq!(pid.gains(), Gains::new(2.0, 0.0, 0.0));

        // New gains apply on the very next call.
        assert_eq!(pid.compute(5.0, 0.0, 1.0), 10.0);
    }

    #[test]
    fn zero_dt_is_not_guarded() {
        let mut pid = PidController::new(0.0, 0.0, 1.0);
        let out = pid.compute(1.0, 0.0, 0.0);
        assert!(out.is_infinite() && out > 0.0, "Expected +inf, got {}", out);

        let mut pid = PidController::new(0.0, 0.0, 1.0);
        let out = pid.compute(0.0, 0.0, 0.0);
        assert!(out.is_nan(), "0/0 derivative should be NaN");
    }

    #[test]
    fn reference_tick_output() {
        let mut pid = PidController::default();
        let out = pid.compute(250.0, 200.0, 0.1);
        assert!((out - 75.5).abs() < 1e-9, "Got {}", out);
    }
}
