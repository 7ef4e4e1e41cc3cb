use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::error::Result;
use crate::robot::Pose;
use crate::sim::event::SimEvent;
use crate::sim::{SimConfig, TickRecord};

/// Absolute tracking error below which the tail of a run counts as settled.
pub const SETTLE_TOLERANCE: f64 = 10.0;

/// Summary statistics computed from a run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub ticks: usize,
    pub duration: f64,
    pub setpoint: f64,
    pub final_pose: Pose,
    pub distance_run: f64,
    pub mean_abs_error: f64,
    pub max_abs_error: f64,
    pub final_abs_error: f64,
    /// Every tick in the last tenth of the run stayed within `SETTLE_TOLERANCE`.
    pub settled: bool,
}

impl RunSummary {
    /// `None` for an empty run. Errors are taken against each record's own
    /// setpoint.
    pub fn from_records(records: &[TickRecord]) -> Option<Self> {
        let last = records.last()?;
        let errors: Vec<f64> = records.iter().map(|r| r.tracking_error().abs()).collect();

        let mean_abs_error = errors.iter().sum::<f64>() / errors.len() as f64;
        let max_abs_error = errors.iter().copied().fold(0.0_f64, f64::max);
        let tail = (errors.len() / 10).max(1);
        let settled = errors[errors.len() - tail..].iter().all(|e| *e < SETTLE_TOLERANCE);

        Some(RunSummary {
            ticks: records.len(),
            duration: last.time,
            setpoint: last.setpoint,
            final_pose: last.state.pose(),
            distance_run: last.state.distance_run,
            mean_abs_error,
            max_abs_error,
            final_abs_error: errors[errors.len() - 1],
            settled,
        })
    }
}

#[derive(Serialize)]
struct Report<'a> {
    config: &'a SimConfig,
    summary: &'a RunSummary,
    events: &'a [SimEvent],
}

/// Write config, summary and detected events together as pretty JSON.
pub fn write_summary<W: Write>(
    writer: &mut W,
    config: &SimConfig,
    summary: &RunSummary,
    events: &[SimEvent],
) -> Result<()> {
    serde_json::to_writer_pretty(&mut *writer, &Report { config, summary, events })?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_summary_file(
    path: impl AsRef<Path>,
    config: &SimConfig,
    summary: &RunSummary,
    events: &[SimEvent],
) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    write_summary(&mut file, config, summary, events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::robot::RobotState;
    use crate::sim::event::EventKind;

    fn records(distances: &[f64]) -> Vec<TickRecord> {
        distances
            .iter()
            .enumerate()
            .map(|(i, d)| TickRecord {
                tick: i,
                time: (i + 1) as f64 * 0.1,
                wall_distance: *d,
                perturbed_wall_distance: *d,
                setpoint: 250.0,
                state: RobotState { y: 50.0 + d, distance_run: i as f64, ..Default::default() },
            })
            .collect()
    }

    #[test]
    fn summary_error_stats() {
        let s = RunSummary::from_records(&records(&[200.0, 240.0, 255.0, 250.0])).unwrap();
        assert_eq!(s.ticks, 4);
        assert_eq!(s.setpoint, 250.0);
        assert!((s.mean_abs_error - 16.25).abs() < 1e-12);
        assert_eq!(s.max_abs_error, 50.0);
        assert_eq!(s.final_abs_error, 0.0);
        assert!(s.settled);
        assert!((s.duration - 0.4).abs() < 1e-12);
        assert_eq!(s.distance_run, 3.0);
    }

    #[test]
    fn summary_follows_record_setpoint() {
        let mut recs = records(&[200.0, 200.0]);
        for r in &mut recs {
            r.setpoint = 200.0;
        }
        let s = RunSummary::from_records(&recs).unwrap();
        assert_eq!(s.max_abs_error, 0.0);
        assert_eq!(s.setpoint, 200.0);
    }

    #[test]
    fn unsettled_tail() {
        let s = RunSummary::from_records(&records(&[250.0, 250.0, 100.0])).unwrap();
        assert!(!s.settled);
    }

    #[test]
    fn empty_run_has_no_summary() {
        assert!(RunSummary::from_records(&[]).is_none());
    }

    #[test]
    fn json_output_is_valid() {
        let s = RunSummary::from_records(&records(&[200.0, 250.0])).unwrap();
        let events = vec![SimEvent {
            tick: 1,
            time: 0.2,
            kind: EventKind::SetpointCrossing { outward: true },
        }];
        let mut buf = Vec::new();
        write_summary(&mut buf, &SimConfig::default(), &s, &events).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&buf).unwrap();
        assert_eq!(value["summary"]["ticks"], 2);
        assert_eq!(value["summary"]["max_abs_error"], 50.0);
        assert_eq!(value["config"]["wall_y"], 50.0);
        assert_eq!(value["events"][0]["tick"], 1);
        assert_eq!(value["events"][0]["kind"]["SetpointCrossing"]["outward"], true);
    }
}
