//! Error types shared by the storage and search layers.
//!
//! "Not found" is never an error here: repositories return `Option` for it.

use thiserror::Error;

/// Failure reported by the persistence backend, passed through unchanged.
#[derive(Error, Debug)]
pub enum RepoError {
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Errors produced by the search operations.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Birthday windows only look forward.
    #[error("shift must not be negative, got {0}")]
    NegativeShift(i64),

    #[error(transparent)]
    Repo(#[from] RepoError),
}

pub type RepoResult<T> = Result<T, RepoError>;

pub type SearchResult<T> = Result<T, SearchError>;
