use std::collections::VecDeque;
use std::f64::consts::TAU;
use std::time::{Duration, Instant};

use eframe::egui;
use egui_plot::{Line, Plot, PlotPoints};
use tracing_subscriber::EnvFilter;

use wallfollow_sim::control::Gains;
use wallfollow_sim::robot::Robot;
use wallfollow_sim::sim::{self, SimConfig, TickRecord};

const TICK: Duration = Duration::from_millis(100);
/// Falling further behind than this drops the missed ticks.
const MAX_LAG: Duration = Duration::from_millis(300);
const FIELD: f64 = 500.0;
const HISTORY: usize = 3000;

fn main() -> eframe::Result {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = SimConfig::default();
    let app = LiveViz {
        robot: sim::build_robot(&config),
        gains: config.gains,
        config,
        tick: 0,
        history: History::new(HISTORY),
        pacer: Pacer::new(Instant::now()),
        running: true,
    };
    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native(
        "Robot Wall Following Simulator",
        options,
        Box::new(|_| Ok(Box::new(app))),
    )
}

// ---------------------------------------------------------------------------
// Tick pacing and rolling history
// ---------------------------------------------------------------------------

/// Fixed-rate clock for the live tick loop.
struct Pacer {
    next: Instant,
}

impl Pacer {
    fn new(now: Instant) -> Self {
        Self { next: now + TICK }
    }

    /// Number of ticks to run at `now`. Short delays are caught up; after a
    /// stall past `MAX_LAG` a single tick runs and the schedule restarts.
    fn due(&mut self, now: Instant) -> usize {
        if now < self.next {
            return 0;
        }
        let behind = now - self.next;
        if behind >= MAX_LAG {
            self.next = now + TICK;
            return 1;
        }
        let n = (behind.as_nanos() / TICK.as_nanos()) as u32 + 1;
        self.next += TICK * n;
        n as usize
    }
}

/// Last `cap` tick records.
struct History {
    records: VecDeque<TickRecord>,
    cap: usize,
}

impl History {
    fn new(cap: usize) -> Self {
        Self { records: VecDeque::with_capacity(cap), cap }
    }

    fn push(&mut self, record: TickRecord) {
        if self.records.len() == self.cap {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    fn clear(&mut self) {
        self.records.clear();
    }

    fn iter(&self) -> impl Iterator<Item = &TickRecord> {
        self.records.iter()
    }

    fn time_span(&self) -> (f64, f64) {
        match (self.records.front(), self.records.back()) {
            (Some(a), Some(b)) => (a.time, b.time),
            _ => (0.0, 1.0),
        }
    }

    fn last(&self) -> Option<&TickRecord> {
        self.records.back()
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

struct LiveViz {
    robot: Robot,
    config: SimConfig,
    gains: Gains,
    tick: usize,
    history: History,
    pacer: Pacer,
    running: bool,
}

impl LiveViz {
    fn advance(&mut self) {
        let due = self.pacer.due(Instant::now());
        if !self.running {
            return;
        }
        for _ in 0..due {
            let record = sim::step(&mut self.robot, &self.config, self.tick);
            self.tick += 1;
            self.history.push(record);
        }
    }

    fn reset(&mut self) {
        self.robot = sim::build_robot(&self.config);
        self.robot.set_gains(self.gains);
        self.tick = 0;
        self.history.clear();
    }

    fn controls(&mut self, ui: &mut egui::Ui) {
        ui.heading("Parameters");
        ui.add(egui::Slider::new(&mut self.config.wall_y, 0.0..=FIELD).text("Wall y"));
        ui.add(
            egui::Slider::new(&mut self.config.motor_perturbation, 0.0..=50.0)
                .text("Motor perturbation (%)"),
        );
        ui.add(
            egui::Slider::new(&mut self.config.sensor_perturbation, 0.0..=50.0)
                .text("Sensor perturbation (%)"),
        );
        ui.add(
            egui::Slider::new(&mut self.config.motor_responsiveness, 1.0..=20.0)
                .text("Motor responsiveness"),
        );

        ui.separator();
        ui.heading("PID");
        let mut changed = false;
        changed |= ui.add(egui::Slider::new(&mut self.gains.kp, 0.0..=2.0).text("Kp")).changed();
        changed |= ui.add(egui::Slider::new(&mut self.gains.ki, 0.0..=2.0).text("Ki")).changed();
        changed |= ui.add(egui::Slider::new(&mut self.gains.kd, 0.0..=2.0).text("Kd")).changed();
        if changed {
            self.robot.set_gains(self.gains);
        }

        ui.separator();
        ui.horizontal(|ui| {
            let label = if self.running { "Pause" } else { "Run" };
            if ui.button(label).clicked() {
                self.running = !self.running;
            }
            if ui.button("Reset").clicked() {
                self.reset();
            }
        });

        ui.separator();
        ui.heading("Debug");
        let s = self.robot.state();
        let distance = sim::wall_distance(s.y, self.config.wall_y);
        let sensed = self.history.last().map_or(distance, |r| r.perturbed_wall_distance);
        ui.label(format!("Actual wall distance: {:.2}", distance));
        ui.label(format!("Perturbed wall distance: {:.2}", sensed));
        ui.label(format!("Robot y: {:.2}", s.y));
        ui.label(format!("Robot angle: {:.2}°", s.angle_deg()));
        ui.label(format!("Left motor speed: {:.2}", s.left_speed));
        ui.label(format!("Right motor speed: {:.2}", s.right_speed));
        ui.label(format!("Target left speed: {:.2}", s.target_left_speed));
        ui.label(format!("Target right speed: {:.2}", s.target_right_speed));
        ui.label(format!("Distance run: {:.2}", s.distance_run));
    }
}

impl eframe::App for LiveViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.advance();
        ctx.request_repaint_after(TICK);

        egui::SidePanel::right("controls").min_width(320.0).show(ctx, |ui| self.controls(ui));

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let half_w = available.x / 2.0 - 8.0;
            let h = available.y - 24.0;

            ui.horizontal(|ui| {
                // Field view, robot drawn at the horizontal centre
                ui.vertical(|ui| {
                    ui.label("Field");
                    let s = self.robot.state();
                    let nose = s.pose().heading() * 20.0;
                    let cx = FIELD / 2.0;
                    let body: PlotPoints = (0..=24)
                        .map(|i| {
                            let a = TAU * i as f64 / 24.0;
                            [cx + 10.0 * a.cos(), s.y + 10.0 * a.sin()]
                        })
                        .collect();
                    let heading: PlotPoints = vec![[cx, s.y], [cx + nose.x, s.y + nose.y]].into();
                    let wall_y = self.config.wall_y;
                    let wall: PlotPoints = vec![[0.0, wall_y], [FIELD, wall_y]].into();
                    Plot::new("field")
                        .width(half_w)
                        .height(h)
                        .data_aspect(1.0)
                        .include_x(0.0)
                        .include_x(FIELD)
                        .include_y(0.0)
                        .include_y(FIELD)
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Wall", wall));
                            plot_ui.line(Line::new("Robot", body));
                            plot_ui.line(Line::new("Heading", heading));
                        });
                });

                // Wall distance vs time
                ui.vertical(|ui| {
                    ui.label("Wall distance");
                    let actual: PlotPoints =
                        self.history.iter().map(|r| [r.time, r.wall_distance]).collect();
                    let sensed: PlotPoints =
                        self.history.iter().map(|r| [r.time, r.perturbed_wall_distance]).collect();
                    let (t0, t1) = self.history.time_span();
                    let setpoint = self.robot.setpoint();
                    let target: PlotPoints = vec![[t0, setpoint], [t1, setpoint]].into();
                    Plot::new("distance")
                        .width(half_w)
                        .height(h)
                        .x_axis_label("Time (s)")
                        .show(ui, |plot_ui| {
                            plot_ui.line(Line::new("Sensed", sensed));
                            plot_ui.line(Line::new("Actual", actual));
                            plot_ui.line(Line::new("Setpoint", target));
                        });
                });
            });
        });
    }
}
