use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::Result;
use crate::robot::{Robot, RobotState};
use super::config::SimConfig;

// ---------------------------------------------------------------------------
// Per-tick record
// ---------------------------------------------------------------------------

/// What one tick saw and where it left the robot.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TickRecord {
    pub tick: usize,
    pub time: f64,                      // s, at the end of the tick
    pub wall_distance: f64,             // true distance before the tick
    pub perturbed_wall_distance: f64,   // what the controller was fed
    pub setpoint: f64,                  // target distance the robot steered to
    pub state: RobotState,              // after the tick
}

impl TickRecord {
    /// Signed tracking error against the robot's setpoint, using the true
    /// distance.
    pub fn tracking_error(&self) -> f64 {
        self.setpoint - self.wall_distance
    }
}

/// Distance from the robot to a horizontal wall at `wall_y`.
pub fn wall_distance(y: f64, wall_y: f64) -> f64 {
    (y - wall_y).abs()
}

// ---------------------------------------------------------------------------
// Tick loop
// ---------------------------------------------------------------------------

/// Run exactly one tick: apply any scheduled gains, measure, update.
pub fn step<R: Rng>(robot: &mut Robot<R>, config: &SimConfig, tick: usize) -> TickRecord {
    if let Some(g) = config.gains_at(tick) {
        debug!(tick, kp = g.kp, ki = g.ki, kd = g.kd, "gain change");
        robot.set_gains(g);
    }

    let distance = wall_distance(robot.y(), config.wall_y);
    let perturbed = robot.update(
        config.dt,
        distance,
        config.motor_perturbation,
        config.sensor_perturbation,
        config.motor_responsiveness,
    );
    let state = robot.state();

    debug!(
        tick,
        distance,
        perturbed,
        left = state.left_speed,
        right = state.right_speed,
        "tick"
    );

    TickRecord {
        tick,
        time: (tick + 1) as f64 * config.dt,
        wall_distance: distance,
        perturbed_wall_distance: perturbed,
        setpoint: robot.setpoint(),
        state,
    }
}

/// Run `config.ticks` ticks on a caller-supplied robot, starting at tick 0.
///
/// The robot's current pose and gains are used as-is; `config.initial_pose`,
/// `config.gains` and `config.seed` are ignored here.
pub fn simulate_with<R: Rng>(config: &SimConfig, robot: &mut Robot<R>) -> Result<Vec<TickRecord>> {
    simulate_from(config, robot, 0)
}

/// Run `config.ticks` ticks numbered from `start_tick`.
///
/// Record times and `gain_changes` are indexed by the absolute tick, so
/// continuing a run passes the number of ticks already taken.
pub fn simulate_from<R: Rng>(
    config: &SimConfig,
    robot: &mut Robot<R>,
    start_tick: usize,
) -> Result<Vec<TickRecord>> {
    config.validate()?;
    if config.ramp_overshoots() {
        warn!(
            responsiveness = config.motor_responsiveness,
            dt = config.dt,
            "motor_responsiveness * dt > 1, wheel speeds will overshoot their targets"
        );
    }

    info!(
        start_tick,
        ticks = config.ticks,
        dt = config.dt,
        wall_y = config.wall_y,
        "simulation start"
    );
    let mut records = Vec::with_capacity(config.ticks.min(1_000_000));
    for tick in start_tick..start_tick + config.ticks {
        records.push(step(robot, config, tick));
    }

    if let Some(last) = records.last() {
        info!(
            time = last.time,
            y = last.state.y,
            distance_run = last.state.distance_run,
            "simulation finished"
        );
    }
    Ok(records)
}

/// Build the robot described by `config` (pose, gains, seed).
pub fn build_robot(config: &SimConfig) -> Robot {
    let rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };
    let mut robot = Robot::from_pose(config.initial_pose, rng);
    robot.set_gains(config.gains);
    robot
}

/// Build the robot from `config` and run it.
pub fn simulate(config: &SimConfig) -> Result<Vec<TickRecord>> {
    let mut robot = build_robot(config);
    simulate_with(config, &mut robot)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::control::Gains;
    use crate::error::SimError;
    use crate::robot::SETPOINT;
    use crate::sim::config::GainChange;

    fn quiet(seed: u64) -> SimConfig {
        SimConfig {
            motor_perturbation: 0.0,
            sensor_perturbation: 0.0,
            seed: Some(seed),
            ..Default::default()
        }
    }

    #[test]
    fn one_record_per_tick() {
        let config = SimConfig { ticks: 25, seed: Some(1), ..Default::default() };
        let records = simulate(&config).unwrap();
        assert_eq!(records.len(), 25);
        assert_eq!(records[0].tick, 0);
        assert!((records[24].time - 2.5).abs() < 1e-9);
    }

    #[test]
    fn first_tick_matches_reference() {
        let records = simulate(&SimConfig { ticks: 1, ..quiet(0) }).unwrap();
        let r = &records[0];
        assert_eq!(r.wall_distance, 200.0);
        assert_eq!(r.perturbed_wall_distance, 200.0);
        assert!((r.state.target_left_speed - -25.5).abs() < 1e-9);
        assert!((r.state.target_right_speed - 125.5).abs() < 1e-9);
    }

    #[test]
    fn quiet_runs_ignore_seed() {
        let a = simulate(&quiet(1)).unwrap();
        let b = simulate(&quiet(2)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn seeded_noisy_runs_repeat() {
        let config = SimConfig { seed: Some(42), ..Default::default() };
        assert_eq!(simulate(&config).unwrap(), simulate(&config).unwrap());
    }

    #[test]
    fn invalid_config_is_rejected_before_running() {
        let config = SimConfig { dt: -0.1, ..Default::default() };
        assert!(matches!(simulate(&config), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn gain_schedule_applies_between_ticks() {
        let config = SimConfig {
            ticks: 3,
            gain_changes: vec![GainChange { tick: 2, gains: Gains::new(0.0, 0.0, 0.0) }],
            ..quiet(0)
        };
        let records = simulate(&config).unwrap();
        // Tick 1 still uses the default gains
        assert_ne!(records[1].state.target_left_speed, 50.0);
        // Tick 2 runs with zero gains: zero output
        assert_eq!(records[2].state.target_left_speed, 50.0);
        assert_eq!(records[2].state.target_right_speed, 50.0);
    }

    #[test]
    fn simulate_with_keeps_caller_robot_state() {
        let config = SimConfig { ticks: 10, ..quiet(0) };
        let mut robot = build_robot(&config);
        simulate_with(&config, &mut robot).unwrap();
        let after_first = robot.state();
        let more = simulate_from(&config, &mut robot, 10).unwrap();
        assert_eq!(more.len(), 10);
        assert_eq!(more[0].tick, 10);
        assert!((more[0].time - 1.1).abs() < 1e-9);
        assert!(robot.state().distance_run > after_first.distance_run);
    }

    #[test]
    fn tracking_error_sign() {
        let records = simulate(&SimConfig { ticks: 1, ..quiet(0) }).unwrap();
        assert_eq!(records[0].setpoint, SETPOINT);
        assert_eq!(records[0].tracking_error(), 50.0);
    }

    #[test]
    fn records_carry_the_robot_setpoint() {
        let config = SimConfig { ticks: 1, ..quiet(0) };
        let mut robot = build_robot(&config).with_setpoint(200.0);
        let records = simulate_with(&config, &mut robot).unwrap();
        assert_eq!(records[0].setpoint, 200.0);
        assert_eq!(records[0].tracking_error(), 0.0);
    }

    #[test]
    fn continued_run_skips_past_gain_changes() {
        let config = SimConfig {
            ticks: 5,
            gain_changes: vec![GainChange { tick: 2, gains: Gains::new(0.0, 0.0, 0.0) }],
            ..quiet(0)
        };
        let mut robot = build_robot(&config);
        simulate_with(&config, &mut robot).unwrap();
        assert_eq!(robot.pid().gains(), Gains::new(0.0, 0.0, 0.0));

        robot.set_pid_params(1.0, 0.0, 0.0);
        simulate_from(&config, &mut robot, 5).unwrap();
        assert_eq!(robot.pid().gains(), Gains::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn wall_distance_is_absolute() {
        assert_eq!(wall_distance(40.0, 50.0), 10.0);
        assert_eq!(wall_distance(60.0, 50.0), 10.0);
    }
}
