pub mod model;
pub mod perturbation;
pub mod state;

pub use model::Robot;
pub use state::{normalize_angle, Pose, RobotState, BASE_SPEED, SETPOINT, TURN_DIVISOR};
