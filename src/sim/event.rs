use serde::Serialize;

use super::runner::TickRecord;

// ---------------------------------------------------------------------------
// Simulation events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum EventKind {
    /// Robot passed through the wall line.
    WallCrossing,
    /// True wall distance crossed the setpoint, in the given direction.
    SetpointCrossing { outward: bool },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimEvent {
    pub tick: usize,
    pub time: f64,
    pub kind: EventKind,
}

/// Passive detector over consecutive tick records.
pub trait EventDetector {
    fn check(&mut self, prev: &TickRecord, current: &TickRecord) -> Option<EventKind>;
}

/// Fires when `y` moves from one side of the wall to the other.
pub struct WallCrossingDetector {
    pub wall_y: f64,
}

impl EventDetector for WallCrossingDetector {
    fn check(&mut self, prev: &TickRecord, current: &TickRecord) -> Option<EventKind> {
        let before = prev.state.y - self.wall_y;
        let after = current.state.y - self.wall_y;
        if before != 0.0 && before.signum() != after.signum() {
            Some(EventKind::WallCrossing)
        } else {
            None
        }
    }
}

/// Fires each time the tracked distance crosses `setpoint`.
pub struct SetpointCrossingDetector {
    pub setpoint: f64,
}

impl EventDetector for SetpointCrossingDetector {
    fn check(&mut self, prev: &TickRecord, current: &TickRecord) -> Option<EventKind> {
        let a = prev.wall_distance - self.setpoint;
        let b = current.wall_distance - self.setpoint;
        if a < 0.0 && b >= 0.0 {
            Some(EventKind::SetpointCrossing { outward: true })
        } else if a > 0.0 && b <= 0.0 {
            Some(EventKind::SetpointCrossing { outward: false })
        } else {
            None
        }
    }
}

/// Run every detector over each consecutive pair of records.
pub fn detect_events(
    records: &[TickRecord],
    detectors: &mut [Box<dyn EventDetector>],
) -> Vec<SimEvent> {
    let mut events = Vec::new();
    for pair in records.windows(2) {
        for det in detectors.iter_mut() {
            if let Some(kind) = det.check(&pair[0], &pair[1]) {
                events.push(SimEvent { tick: pair[1].tick, time: pair[1].time, kind });
            }
        }
    }
    events
}
