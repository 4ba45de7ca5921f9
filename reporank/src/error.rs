use gitfetcher::error::GitFetcherError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RankError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("GitHub fetch failed: {0}")]
    Fetch(#[from] GitFetcherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, RankError>;
