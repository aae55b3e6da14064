use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("Invalid configuration, dimensions must be positive and 0 < mines < rows*cols")]
    InvalidConfig,
    #[error("Position outside the grid")]
    OutOfBounds,
    #[error("Storage backend failed: {0}")]
    Storage(String),
}

pub type Result<T> = std::result::Result<T, GameError>;
