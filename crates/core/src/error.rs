//! Error types for transaction propagation
//!
//! This module defines the error taxonomy shared by the storage,
//! concurrency and engine layers.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use crate::types::TxnId;
use thiserror::Error;

/// Result type alias for transaction operations
pub type TxResult<T> = std::result::Result<T, TxError>;

/// Transaction errors
///
/// | Variant | Raised by | Meaning |
/// |---------|-----------|---------|
/// | `IllegalTransactionState` | manager | request incompatible with the current transaction |
/// | `TransactionReadOnly` | storage | write against a read-only physical transaction |
/// | `UnexpectedRollback` | manager `commit` | commit request turned into a rollback |
/// | `TransactionCompleted` | manager | handle already committed or rolled back |
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TxError {
    /// Request is incompatible with the current transactional state
    ///
    /// Raised when a read-write definition tries to join a read-only
    /// transaction, when a handle is completed out of LIFO order, or when
    /// rollback-only is requested with nothing current.
    #[error("illegal transaction state: {reason}")]
    IllegalTransactionState {
        /// Human-readable description
        reason: String,
    },

    /// Write attempted inside a read-only physical transaction
    #[error("transaction {txn} is read-only")]
    TransactionReadOnly {
        /// The read-only physical transaction
        txn: TxnId,
    },

    /// Commit was requested but the transaction had been marked rollback-only
    #[error("transaction {txn} silently rolled back because it has been marked as rollback-only")]
    UnexpectedRollback {
        /// The physical transaction that was rolled back
        txn: TxnId,
    },

    /// The handle was already committed or rolled back
    #[error("transaction {txn} is already completed - do not call commit or rollback more than once per handle")]
    TransactionCompleted {
        /// The physical transaction the handle belonged to
        txn: TxnId,
    },
}

impl TxError {
    /// Create an `IllegalTransactionState` error
    pub fn illegal_state(reason: impl Into<String>) -> Self {
        TxError::IllegalTransactionState {
            reason: reason.into(),
        }
    }

    /// Whether this error reports a commit that became a rollback
    pub fn is_unexpected_rollback(&self) -> bool {
        matches!(self, TxError::UnexpectedRollback { .. })
    }
}
