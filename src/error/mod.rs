//! Error types and handlers for cleanup operations

pub mod handlers;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, CleanerError>;

#[derive(Error, Debug)]
pub enum CleanerError {
    /// Invalid or unsafe run configuration, raised before any network call
    #[error("Configuration error: {0}")]
    Config(String),

    /// Login exchange failed
    #[error("Authentication error: {0}")]
    Auth(String),

    /// A tag listing page could not be retrieved
    #[error("Failed to fetch tags for {repository}: {message}")]
    Fetch { repository: String, message: String },

    /// A single tag deletion failed
    #[error("Failed to delete tag {tag} from {repository}: {message}")]
    Delete {
        repository: String,
        tag: String,
        message: String,
    },

    #[error("Network error: {0}")]
    Network(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Some deletions in one repository failed; the rest stay deleted
    #[error("Cleanup of {repository} failed: {failed} of {attempted} deletions failed ({details})")]
    RepositoryFailed {
        repository: String,
        attempted: usize,
        failed: usize,
        details: String,
    },

    /// One or more repositories failed during a batch run
    #[error("{failed} of {total} repositories failed: {details}")]
    BatchFailed {
        total: usize,
        failed: usize,
        details: String,
    },
}

impl From<url::ParseError> for CleanerError {
    fn from(err: url::ParseError) -> Self {
        CleanerError::Config(format!("Invalid URL: {}", err))
    }
}
