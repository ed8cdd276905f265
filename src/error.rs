//! Error types shared by the state library.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// A completed game must have taken at least one guess.
    #[error("a completed game needs at least one guess, got {count}")]
    InvalidGuessCount { count: u32 },

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T> = std::result::Result<T, Error>;
