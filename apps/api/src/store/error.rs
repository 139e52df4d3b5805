//! Error types for the store client.

use thiserror::Error;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store client errors.
///
/// Operation wraps (`ContainerCreation`, `Insert`, `Query`, `Delete`) box the
/// underlying cause and repeat its message, so nothing is lost when the error
/// is rendered with `Display`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Missing or invalid client setup. Raised only at construction.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Malformed call arguments. No request was sent.
    #[error("validation error: {0}")]
    Validation(String),

    /// The store answered with a non-success status.
    #[error("HTTP error! status: {status} - {message}")]
    Transport { status: u16, message: String },

    /// The request never produced a status (connect, timeout, body read).
    #[error("network error: {0}")]
    Network(String),

    /// The caller's cancellation token fired while the request was in flight.
    #[error("request cancelled")]
    Cancelled,

    #[error("Failed to create container: {0}")]
    ContainerCreation(#[source] Box<StoreError>),

    #[error("Failed to insert data: {0}")]
    Insert(#[source] Box<StoreError>),

    #[error("Failed to run query: {0}")]
    Query(#[source] Box<StoreError>),

    #[error("Failed to delete data: {0}")]
    Delete(#[source] Box<StoreError>),
}

impl StoreError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Innermost cause, looking through operation wraps.
    pub fn root(&self) -> &StoreError {
        match self {
            Self::ContainerCreation(inner)
            | Self::Insert(inner)
            | Self::Query(inner)
            | Self::Delete(inner) => inner.root(),
            other => other,
        }
    }

    /// HTTP status of the underlying transport failure, if there was one.
    pub fn status(&self) -> Option<u16> {
        match self.root() {
            Self::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), Self::Validation(_))
    }
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        Self::Network(e.to_string())
    }
}
