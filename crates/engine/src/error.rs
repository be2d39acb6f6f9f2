//! Error types for the service layer
//!
//! Business operations return [`Error`], which wraps transaction errors
//! losslessly so callers can still match on `UnexpectedRollback` and friends.

use txnest_core::TxError;

/// Result type alias for service operations
pub type Result<T> = std::result::Result<T, Error>;

/// Service layer errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// Error raised by the transaction manager or a record store
    #[error(transparent)]
    Transaction(#[from] TxError),

    /// Simulated failure while persisting a log record
    #[error("failed to persist log for '{username}'")]
    LogPersistFailed {
        /// Username the log record was written for
        username: String,
    },

    /// Configuration could not be read, parsed or written
    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Whether a commit request turned into a rollback
    pub fn is_unexpected_rollback(&self) -> bool {
        matches!(self, Error::Transaction(e) if e.is_unexpected_rollback())
    }

    /// Underlying transaction error, if any
    pub fn as_transaction_error(&self) -> Option<&TxError> {
        match self {
            Error::Transaction(e) => Some(e),
            _ => None,
        }
    }
}
