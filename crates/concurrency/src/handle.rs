//! Logical transaction handles
//!
//! A handle is one call's view of its participation in a physical
//! transaction. `is_new` decides who finalizes: only the handle that created
//! the physical transaction commits or rolls it back; joiners only vote.

use txnest_core::{ContextId, TransactionDefinition, TxnId};

/// One call's participation in a physical transaction
///
/// Returned by `TransactionManager::begin`; pass it back to exactly one of
/// `commit` or `rollback`.
#[derive(Debug, Clone)]
pub struct TransactionHandle {
    context: ContextId,
    txn: TxnId,
    definition: TransactionDefinition,
    is_new: bool,
    completed: bool,
}

impl TransactionHandle {
    pub(crate) fn new(
        context: ContextId,
        txn: TxnId,
        definition: TransactionDefinition,
        is_new: bool,
    ) -> Self {
        Self {
            context,
            txn,
            definition,
            is_new,
            completed: false,
        }
    }

    /// The physical transaction this handle participates in
    pub fn txn_id(&self) -> TxnId {
        self.txn
    }

    /// Context the handle was issued on
    pub fn context_id(&self) -> ContextId {
        self.context
    }

    /// Whether this handle created the physical transaction
    pub fn is_new(&self) -> bool {
        self.is_new
    }

    /// Definition the handle was begun with
    pub fn definition(&self) -> &TransactionDefinition {
        &self.definition
    }

    /// Whether commit or rollback was already called
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub(crate) fn set_completed(&mut self) {
        self.completed = true;
    }
}
