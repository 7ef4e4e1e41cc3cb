use std::process::ExitCode;

use tracing::error;
use tracing_subscriber::EnvFilter;

use wallfollow_sim::io::{self, RunSummary};
use wallfollow_sim::sim::event::{
    detect_events, EventDetector, SetpointCrossingDetector, SimEvent, WallCrossingDetector,
};
use wallfollow_sim::sim::{self, SimConfig, TickRecord};

/// Usage: wallfollow-sim [config.toml] [trajectory.csv] [summary.json]
fn main() -> ExitCode {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("wallfollow_sim=info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> wallfollow_sim::error::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.first() {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };

    let records = sim::simulate(&config)?;

    if let Some(path) = args.get(1) {
        io::write_trajectory_file(path, &records)?;
    }

    let Some(summary) = RunSummary::from_records(&records) else {
        println!("No ticks run.");
        return Ok(());
    };

    let mut detectors: Vec<Box<dyn EventDetector>> = vec![
        Box::new(WallCrossingDetector { wall_y: config.wall_y }),
        Box::new(SetpointCrossingDetector { setpoint: summary.setpoint }),
    ];
    let events = detect_events(&records, &mut detectors);

    if let Some(path) = args.get(2) {
        io::write_summary_file(path, &config, &summary, &events)?;
    }

    print_report(&config, &records, &summary, &events);
    Ok(())
}

fn print_report(
    config: &SimConfig,
    records: &[TickRecord],
    summary: &RunSummary,
    events: &[SimEvent],
) {
    println!();
    println!("====================================================================");
    println!("  WALL-FOLLOWING SIMULATION");
    println!("====================================================================");
    println!();
    println!("  Parameters");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Kp / Ki / Kd:  {:>5.2} / {:.2} / {:.2}   Wall y:       {:>8.1}",
        config.gains.kp, config.gains.ki, config.gains.kd, config.wall_y
    );
    println!(
        "  Motor noise:   {:>8.1} %       Sensor noise: {:>8.1} %",
        config.motor_perturbation, config.sensor_perturbation
    );
    println!(
        "  Responsiveness:{:>8.1} 1/s     dt:           {:>8.3} s",
        config.motor_responsiveness, config.dt
    );
    println!();

    println!("  Events: {}", events.len());
    println!("  ──────────────────────────────────────────────────────────────────");
    for e in events.iter().take(10) {
        println!("  t={:>7.1}s  tick {:>5}  {:?}", e.time, e.tick, e.kind);
    }
    if events.len() > 10 {
        println!("  ... {} more", events.len() - 10);
    }
    println!();

    println!("  Trajectory");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  {:>7}  {:>8}  {:>8}  {:>8}  {:>8}  {:>8}  {:>9}",
        "t (s)", "y", "dist", "sensed", "left", "right", "run"
    );
    println!("  {}", "─".repeat(66));

    let sample_interval = (records.len() / 30).max(1);
    for (i, r) in records.iter().enumerate() {
        if i % sample_interval != 0 && i != records.len() - 1 {
            continue;
        }
        println!(
            "  {:>7.1}  {:>8.2}  {:>8.2}  {:>8.2}  {:>8.2}  {:>8.2}  {:>9.1}",
            r.time,
            r.state.y,
            r.wall_distance,
            r.perturbed_wall_distance,
            r.state.left_speed,
            r.state.right_speed,
            r.state.distance_run,
        );
    }
    println!();

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    println!(
        "  Mean |error|:  {:>8.2}        Max |error|:  {:>8.2}",
        summary.mean_abs_error, summary.max_abs_error
    );
    println!(
        "  Final |error|: {:>8.2}        Settled:      {:>8}",
        summary.final_abs_error, summary.settled
    );
    println!(
        "  Distance run:  {:>8.1}        Final angle:  {:>8.1} deg",
        summary.distance_run,
        summary.final_pose.angle.to_degrees()
    );
    println!("  Simulation: {} ticks, {:.1} s", summary.ticks, summary.duration);
    println!("====================================================================");
    println!();
}
