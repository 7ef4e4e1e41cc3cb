use std::io::{self, Write};
use std::path::Path;

use crate::sim::TickRecord;

/// Write tick records in CSV format.
///
/// Columns: tick, time, x, y, angle_deg, left_speed, right_speed,
///          target_left, target_right, wall_distance, perturbed_distance,
///          distance_run
pub fn write_trajectory<W: Write>(writer: &mut W, records: &[TickRecord]) -> io::Result<()> {
    writeln!(
        writer,
        "tick,time,x,y,angle_deg,left_speed,right_speed,\
         target_left,target_right,wall_distance,perturbed_distance,distance_run"
    )?;

    for r in records {
        let s = &r.state;
        writeln!(
            writer,
            "{},{:.3},{:.4},{:.4},{:.3},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4},{:.4}",
            r.tick,
            r.time,
            s.x, s.y,
            s.angle_deg(),
            s.left_speed, s.right_speed,
            s.target_left_speed, s.target_right_speed,
            r.wall_distance,
            r.perturbed_wall_distance,
            s.distance_run,
        )?;
    }

    Ok(())
}

pub fn write_trajectory_file(path: impl AsRef<Path>, records: &[TickRecord]) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, records)?;
    file.flush()
}
