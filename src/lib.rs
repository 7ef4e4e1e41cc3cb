pub mod control;
pub mod error;
pub mod io;
pub mod robot;
pub mod sim;

pub use control::{Gains, PidController};
pub use error::SimError;
pub use robot::{Robot, RobotState};
pub use sim::{simulate, simulate_from, simulate_with, SimConfig, TickRecord};
