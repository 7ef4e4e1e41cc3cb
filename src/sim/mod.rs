pub mod config;
pub mod event;
pub mod runner;

pub use config::{GainChange, SimConfig};
pub use runner::{
    build_robot, simulate, simulate_from, simulate_with, step, wall_distance, TickRecord,
};
