use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ShrinkError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern {pattern}: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },

    #[error("Invalid compression level: {0}. Must be between 1 and 100")]
    InvalidLevel(u8),

    #[error("Invalid concurrency level: {0}. Must be at least 1")]
    InvalidConcurrency(usize),

    #[error("Failed to process image {path}: {reason}")]
    TransformFailed { path: PathBuf, reason: String },

    #[error("Image tool not found: {0}")]
    ToolNotFound(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(#[from] image::ImageError),

    #[error("PNG optimization error: {0}")]
    PngOptimization(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),

    #[error("Failed to write report: {0}")]
    Report(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ShrinkError>;
