mod settings;

pub use settings::{Settings, DEFAULT_BASE_URL, DEFAULT_MODEL};

/// Common error types
#[derive(thiserror::Error, Debug)]
pub enum InsightError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, InsightError>;
