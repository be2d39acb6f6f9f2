//! Core traits for transactional resources and scopes
//!
//! These traits let the storage layer take part in transactions without
//! depending on the concurrency layer:
//! - `TransactionalResource`: something holding pending effects per transaction
//! - `TransactionScope`: the view of the current transaction a resource needs

use std::sync::Arc;

use crate::error::TxResult;
use crate::types::{ResourceId, TxnId};

/// A resource that buffers effects per physical transaction
///
/// Resources are enlisted with a physical transaction on their first write.
/// When the owner finalizes the transaction, every enlisted resource is
/// committed or rolled back with the transaction id.
///
/// Thread safety: resources are shared between call chains (requires Send + Sync).
pub trait TransactionalResource: Send + Sync {
    /// Stable identity used to enlist the resource at most once
    fn resource_id(&self) -> ResourceId;

    /// Short name for log output
    fn resource_name(&self) -> &str;

    /// Make the pending effects of `txn` durable
    ///
    /// # Errors
    ///
    /// Returns an error if the effects cannot be applied.
    fn commit(&self, txn: TxnId) -> TxResult<()>;

    /// Discard the pending effects of `txn`
    fn rollback(&self, txn: TxnId);
}

/// Call-scoped view of the current physical transaction
///
/// Implemented by the transactional context. Resources consult it to decide
/// whether a write is buffered, rejected or applied immediately.
pub trait TransactionScope {
    /// Id of the current physical transaction, if any
    fn current_txn(&self) -> Option<TxnId>;

    /// Whether the current physical transaction is read-only
    ///
    /// Returns false when no transaction is current.
    fn is_read_only(&self) -> bool;

    /// Register a resource with the current physical transaction
    ///
    /// Enlisting the same resource twice is a no-op.
    ///
    /// # Errors
    ///
    /// Returns `IllegalTransactionState` if no transaction is current.
    fn enlist(&mut self, resource: Arc<dyn TransactionalResource>) -> TxResult<()>;
}

/// Scope with no transaction: every write is applied immediately
///
/// Useful for seeding stores outside any transaction.
#[derive(Debug, Default, Clone, Copy)]
pub struct AutoCommit;

impl TransactionScope for AutoCommit {
    fn current_txn(&self) -> Option<TxnId> {
        None
    }

    fn is_read_only(&self) -> bool {
        false
    }

    fn enlist(&mut self, resource: Arc<dyn TransactionalResource>) -> TxResult<()> {
        Err(crate::TxError::illegal_state(format!(
            "cannot enlist {} without an active transaction",
            resource.resource_name()
        )))
    }
}
