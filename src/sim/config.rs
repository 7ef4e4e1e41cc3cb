use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::control::{Gains, DEFAULT_GAINS};
use crate::error::{Result, SimError};
use crate::robot::Pose;

// ---------------------------------------------------------------------------
// Gain schedule entry
// ---------------------------------------------------------------------------

/// New gains applied just before tick `tick` runs.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GainChange {
    pub tick: usize,
    pub gains: Gains,
}

// ---------------------------------------------------------------------------
// Simulation config
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub dt: f64,                    // s per tick, fixed
    pub ticks: usize,
    pub wall_y: f64,                // horizontal wall line
    pub initial_pose: Pose,
    pub motor_perturbation: f64,    // %
    pub sensor_perturbation: f64,   // %
    pub motor_responsiveness: f64,  // 1/s
    pub gains: Gains,
    pub gain_changes: Vec<GainChange>,
    pub seed: Option<u64>,          // None = entropy
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            dt: 0.1,            // one tick per 100 ms
            ticks: 600,         // 1 min of sim time
            wall_y: 50.0,
            initial_pose: Pose::default(),
            motor_perturbation: 10.0,
            sensor_perturbation: 5.0,
            motor_responsiveness: 5.0,
            gains: DEFAULT_GAINS,
            gain_changes: Vec::new(),
            seed: None,
        }
    }
}

impl SimConfig {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: SimConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Reject inputs the control core does not handle.
    pub fn validate(&self) -> Result<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::InvalidConfig(format!(
                "dt must be finite and > 0, got {}",
                self.dt
            )));
        }
        let finite = [
            ("wall_y", self.wall_y),
            ("initial_pose.x", self.initial_pose.x),
            ("initial_pose.y", self.initial_pose.y),
            ("initial_pose.angle", self.initial_pose.angle),
            ("motor_responsiveness", self.motor_responsiveness),
        ];
        for (name, value) in finite {
            if !value.is_finite() {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be finite, got {}",
                    name, value
                )));
            }
        }
        for (name, pct) in [
            ("motor_perturbation", self.motor_perturbation),
            ("sensor_perturbation", self.sensor_perturbation),
        ] {
            if !(pct.is_finite() && pct >= 0.0) {
                return Err(SimError::InvalidConfig(format!(
                    "{} must be >= 0 %, got {}",
                    name, pct
                )));
            }
        }
        let all_gains =
            std::iter::once(self.gains).chain(self.gain_changes.iter().map(|c| c.gains));
        for g in all_gains {
            if !(g.kp.is_finite() && g.ki.is_finite() && g.kd.is_finite()) {
                return Err(SimError::InvalidConfig(format!("non-finite gains {:?}", g)));
            }
        }
        Ok(())
    }

    /// True when the speed ramp closes more than the full gap per tick.
    pub fn ramp_overshoots(&self) -> bool {
        self.motor_responsiveness * self.dt > 1.0
    }

    /// Gains scheduled for `tick`, if any. The last entry wins on duplicates.
    pub fn gains_at(&self, tick: usize) -> Option<Gains> {
        self.gain_changes.iter().rev().find(|c| c.tick == tick).map(|c| c.gains)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn zero_dt_rejected() {
        let config = SimConfig { dt: 0.0, ..Default::default() };
        assert!(matches!(config.validate(), Err(SimError::InvalidConfig(_))));
    }

    #[test]
    fn negative_perturbation_rejected() {
        let config = SimConfig { sensor_perturbation: -1.0, ..Default::default() };
        assert!(config.validate().is_err());
    }

    #[test]
    fn partial_toml_fills_defaults() {
        let config = SimConfig::from_toml_str(
            r#"
            ticks = 50
            seed = 7
            motor_perturbation = 0.0

            [gains]
            kp = 1.0
            ki = 0.0
            kd = 0.2

            [[gain_changes]]
            tick = 10
            gains = { kp = 0.5, ki = 0.1, kd = 0.1 }
            "#,
        )
        .unwrap();
        assert_eq!(config.ticks, 50);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.dt, 0.1);
        assert_eq!(config.wall_y, 50.0);
        assert_eq!(config.gains, Gains::new(1.0, 0.0, 0.2));
        assert_eq!(config.gains_at(10), Some(DEFAULT_GAINS));
        assert_eq!(config.gains_at(11), None);
    }

    #[test]
    fn bad_toml_is_a_toml_error() {
        let err = SimConfig::from_toml_str("dt = \"fast\"").unwrap_err();
        assert!(matches!(err, SimError::Toml(_)));
    }

    #[test]
    fn overshoot_regime_flagged() {
        let config = SimConfig { motor_responsiveness: 20.0, dt: 0.1, ..Default::default() };
        assert!(config.ramp_overshoots());
        assert!(!SimConfig::default().ramp_overshoots());
    }
}
