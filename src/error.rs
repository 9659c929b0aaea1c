use thiserror::Error;

#[derive(Debug, Error)]
pub enum MazeError {
    #[error("Maze size must be positive, got {width}x{height}")]
    InvalidSize { width: usize, height: usize },

    #[error("Invalid size format: {0}")]
    InvalidSizeFormat(String),

    #[error("Unknown placement policy: {0}")]
    InvalidPolicy(String),

    #[error("Budgeted placement needs a non-zero time budget per tick")]
    InvalidBudget,

    #[error("Delay must be a non-negative number of seconds, got {0}")]
    InvalidDelay(f64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "image")]
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[cfg(feature = "json")]
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
