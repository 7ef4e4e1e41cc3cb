use wallfollow_sim::control::Gains;
use wallfollow_sim::io::RunSummary;
use wallfollow_sim::sim::{self, SimConfig};

/// Sweep Kp with Ki, Kd fixed and compare tracking error on the same noise.
fn main() -> Result<(), wallfollow_sim::SimError> {
    println!("{:>6}  {:>10}  {:>10}  {:>8}", "Kp", "mean|e|", "max|e|", "settled");
    for i in 0..=10 {
        let kp = i as f64 * 0.2;
        let config = SimConfig {
            gains: Gains::new(kp, 0.1, 0.1),
            seed: Some(2024),
            ..Default::default()
        };
        let records = sim::simulate(&config)?;
        if let Some(s) = RunSummary::from_records(&records) {
            println!(
                "{:>6.2}  {:>10.2}  {:>10.2}  {:>8}",
                kp, s.mean_abs_error, s.max_abs_error, s.settled
            );
        }
    }
    Ok(())
}
