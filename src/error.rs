use thiserror::Error;

#[derive(Error, Debug)]
pub enum FreshetError {
    #[error("Transient network error: {0}")]
    TransientNetwork(String),

    #[error("Unrecognized page shape: {0}")]
    ParseShape(String),

    #[error("Refresh cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, FreshetError>;
