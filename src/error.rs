//! Error types for the article reader.

use thiserror::Error;

use crate::handle::HandleError;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// The path segment is not a handle this service could have issued.
    #[error("invalid article handle: {0}")]
    InvalidHandle(#[from] HandleError),

    #[error("article {handle} not found")]
    NotFound { handle: u64 },

    /// Storage fault. `operation` names the store call that failed.
    #[error("{operation} failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: sqlx::Error,
    },
}

impl Error {
    pub fn store(operation: &'static str, source: sqlx::Error) -> Self {
        Error::Store { operation, source }
    }

    /// Client-side absence: a bad handle or a missing article.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::InvalidHandle(_) | Error::NotFound { .. })
    }
}
