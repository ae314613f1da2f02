// src/domain/errors.rs
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Pattern error: {0}")]
    Pattern(#[from] regex::Error),

    #[error("Render error: {0}")]
    Render(#[from] RenderError),
}

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Template error: {0}")]
    Template(String),

    #[error("Failed to write chart to {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// Result type alias for convenience
pub type AppResult<T> = Result<T, AppError>;
pub type RenderResult<T> = Result<T, RenderError>;
