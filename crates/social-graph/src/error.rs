//! Error types for the social-graph crate.
//!
//! The core itself only ever raises `InvalidArgument`. `NotFound` is produced by the
//! catalog collaborator when a caller asks it to vouch for an id, and the remaining
//! variants come from dataset loading.

use thiserror::Error;

/// Errors raised by the relation model, the feed, the catalog, and the dataset loader.
#[derive(Error, Debug)]
pub enum GraphError {
    /// A referenced user, film, or director does not exist in the catalog
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: u32 },

    /// Caller passed a value the operation cannot accept (e.g. a non-positive limit)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// I/O error occurred while reading a dataset file
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Line in a dataset file couldn't be parsed
    #[error("Parse error at line {line} in {file}: {reason}")]
    ParseError {
        file: String,
        line: usize,
        reason: String,
    },

    /// A dataset field had an invalid value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },
}

impl GraphError {
    pub fn user_not_found(id: u32) -> Self {
        GraphError::NotFound { entity: "User", id }
    }

    pub fn film_not_found(id: u32) -> Self {
        GraphError::NotFound { entity: "Film", id }
    }

    pub fn invalid(reason: impl Into<String>) -> Self {
        GraphError::InvalidArgument(reason.into())
    }

    /// True for errors that map to a "not found" answer at the service edge
    pub fn is_not_found(&self) -> bool {
        matches!(self, GraphError::NotFound { .. })
    }
}

/// Convenience type alias for Results in this crate
pub type Result<T> = std::result::Result<T, GraphError>;
