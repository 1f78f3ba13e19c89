//! Error type shared by the generator, the simulation and config loading.

use thiserror::Error;

/// Errors raised by the dungeon core
#[derive(Debug, Error)]
pub enum CoreError {
    /// Collision pair with no implemented test (circle vs circle)
    #[error("collision between {0} and {1} is not implemented")]
    UnsupportedCollision(&'static str, &'static str),

    /// Generation spent its whole restart budget
    #[error(
        "dungeon generation failed after {attempts} attempts (target {target_rooms} rooms on a {dim}x{dim} grid)"
    )]
    GenerationFailed {
        attempts: u32,
        target_rooms: usize,
        dim: i32,
    },

    /// Routine called outside its domain (e.g. non-cardinal facing)
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("RON error: {0}")]
    Ron(#[from] ron::error::SpannedError),

    #[error("RON serialization error: {0}")]
    RonWrite(#[from] ron::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type CoreResult<T> = Result<T, CoreError>;
