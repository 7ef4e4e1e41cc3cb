use thiserror::Error;

/// Errors raised by the harness layer (config, runner, output).
///
/// The control core never returns these; it takes finite inputs with
/// `dt > 0` as a precondition.
#[derive(Error, Debug)]
pub enum SimError {
    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
