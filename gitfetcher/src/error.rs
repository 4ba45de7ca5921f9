use thiserror::Error;

#[derive(Debug, Error)]
pub enum GitFetcherError {
    #[error("repository {owner}/{repo} has no commits")]
    EmptyRepository { owner: String, repo: String },

    #[error("GitHub API error: {0}")]
    GitHub(#[from] octocrab::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GitFetcherError {
    pub fn is_empty_repository(&self) -> bool {
        matches!(self, GitFetcherError::EmptyRepository { .. })
    }
}

pub type Result<T> = std::result::Result<T, GitFetcherError>;
