use nalgebra::Vector2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::control::{Gains, PidController, DEFAULT_GAINS};
use super::perturbation;
use super::state::{normalize_angle, Pose, RobotState, BASE_SPEED, SETPOINT, TURN_DIVISOR};

// ---------------------------------------------------------------------------
// Differential-drive robot following a wall under PID control
// ---------------------------------------------------------------------------

/// Two-wheeled robot with first-order motor lag and noisy sensing.
///
/// The robot owns its controller and its random source. Use
/// [`Robot::with_rng`] with a seeded generator for reproducible runs.
#[derive(Debug, Clone)]
pub struct Robot<R: Rng = StdRng> {
    pos: Vector2<f64>,
    angle: f64,
    left_speed: f64,
    right_speed: f64,
    target_left_speed: f64,
    target_right_speed: f64,
    distance_run: f64,
    setpoint: f64,
    pid: PidController,
    rng: R,
}

impl Robot<StdRng> {
    /// Robot at the given pose, default gains, entropy-seeded noise.
    pub fn new(x: f64, y: f64, angle: f64) -> Self {
        Self::with_rng(x, y, angle, StdRng::from_entropy())
    }

    /// Robot whose noise sequence is fixed by `seed`.
    pub fn seeded(x: f64, y: f64, angle: f64, seed: u64) -> Self {
        Self::with_rng(x, y, angle, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> Robot<R> {
    pub fn with_rng(x: f64, y: f64, angle: f64, rng: R) -> Self {
        Self {
            pos: Vector2::new(x, y),
            angle,
            left_speed: 0.0,
            right_speed: 0.0,
            target_left_speed: 0.0,
            target_right_speed: 0.0,
            distance_run: 0.0,
            setpoint: SETPOINT,
            pid: PidController::from_gains(DEFAULT_GAINS),
            rng,
        }
    }

    pub fn from_pose(pose: Pose, rng: R) -> Self {
        Self::with_rng(pose.x, pose.y, pose.angle, rng)
    }

    /// Override the target wall distance.
    pub fn with_setpoint(mut self, setpoint: f64) -> Self {
        self.setpoint = setpoint;
        self
    }

    /// Advance the robot by one tick of length `dt`.
    ///
    /// `wall_distance` is the true distance the harness measured. The
    /// perturbation arguments are percentages; `motor_responsiveness * dt`
    /// is the fraction of the speed gap closed this tick and is not clamped,
    /// so values above 1 overshoot the target.
    ///
    /// Returns the perturbed distance fed to the controller. `dt` must be
    /// strictly positive (see [`PidController::compute`]).
    pub fn update(
        &mut self,
        dt: f64,
        wall_distance: f64,
        motor_perturbation: f64,
        sensor_perturbation: f64,
        motor_responsiveness: f64,
    ) -> f64 {
        // Draw order is fixed: sensor, left motor, right motor
        let perturbed_wall_distance =
            perturbation::perturb(&mut self.rng, wall_distance, sensor_perturbation);

        let output = self.pid.compute(self.setpoint, perturbed_wall_distance, dt);

        let left_factor = perturbation::factor(&mut self.rng, motor_perturbation);
        let right_factor = perturbation::factor(&mut self.rng, motor_perturbation);
        self.target_left_speed = (BASE_SPEED - output) * left_factor;
        self.target_right_speed = (BASE_SPEED + output) * right_factor;

        // First-order lag towards the targets
        self.left_speed += (self.target_left_speed - self.left_speed) * motor_responsiveness * dt;
        self.right_speed +=
            (self.target_right_speed - self.right_speed) * motor_responsiveness * dt;

        let avg_speed = (self.left_speed + self.right_speed) / 2.0;
        let angular_velocity = (self.right_speed - self.left_speed) / TURN_DIVISOR;

        let dx = avg_speed * self.angle.cos() * dt;
        let dy = avg_speed * self.angle.sin() * dt;
        let step = Vector2::new(dx, dy);
        self.pos += step;
        self.angle = normalize_angle(self.angle + angular_velocity * dt);
        self.distance_run += step.norm();

        perturbed_wall_distance
    }

    /// Forward new gains to the controller; they apply from the next tick.
    pub fn set_pid_params(&mut self, kp: f64, ki: f64, kd: f64) {
        self.pid.set_params(kp, ki, kd);
    }

    pub fn set_gains(&mut self, gains: Gains) {
        self.set_pid_params(gains.kp, gains.ki, gains.kd);
    }

    pub fn state(&self) -> RobotState {
        RobotState {
            x: self.pos.x,
            y: self.pos.y,
            angle: self.angle,
            left_speed: self.left_speed,
            right_speed: self.right_speed,
            target_left_speed: self.target_left_speed,
            target_right_speed: self.target_right_speed,
            distance_run: self.distance_run,
        }
    }

    pub fn x(&self) -> f64 {
        self.pos.x
    }

    pub fn y(&self) -> f64 {
        self.pos.y
    }

    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn left_speed(&self) -> f64 {
        self.left_speed
    }

    pub fn right_speed(&self) -> f64 {
        self.right_speed
    }

    pub fn target_left_speed(&self) -> f64 {
        self.target_left_speed
    }

    pub fn target_right_speed(&self) -> f64 {
        self.target_right_speed
    }

    pub fn distance_run(&self) -> f64 {
        self.distance_run
    }

    pub fn setpoint(&self) -> f64 {
        self.setpoint
    }

    pub fn pid(&self) -> &PidController {
        &self.pid
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
