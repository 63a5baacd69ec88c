//! Errors that can occur when selecting or managing endpoints.
use thiserror::Error;

/// An error returned by a [`ConnectionPool`](super::ConnectionPool).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// The active endpoint set is empty, so no endpoint can be selected.
    #[error("The connection pool has no endpoints")]
    EmptyPool,

    /// An endpoint URI could not be turned into an [`Endpoint`](super::endpoint::Endpoint).
    #[error(r#"Invalid endpoint "{url}": {reason}"#)]
    InvalidEndpoint {
        /// The rejected URI.
        url: String,
        /// Why it was rejected.
        reason: String,
    },

    /// The pool has a fixed endpoint set and cannot be updated.
    #[error("The connection pool does not accept endpoint updates")]
    UpdatesNotSupported,
}
