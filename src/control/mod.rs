pub mod pid;

pub use pid::{Gains, PidController, DEFAULT_GAINS};
