//! Error types for the lidarvox crate

use thiserror::Error;

/// Main error type for the crate
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("format error: {0}")]
    Format(String),

    #[error("cache error: {0}")]
    Cache(String),

    #[error("point cloud already loaded")]
    AlreadyLoaded,

    #[error("grid error: {0}")]
    Grid(String),
}
