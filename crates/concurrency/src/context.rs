//! Transactional context
//!
//! The context is the call-scoped pointer to the current physical
//! transaction. It replaces thread-local binding: every operation that
//! takes part in transactions receives `&mut TxContext` explicitly.
//!
//! Suspended transactions hang off the current one (`suspended` link), so
//! the context always holds one chain and resumption is strictly LIFO.

use std::sync::Arc;

use tracing::warn;
use txnest_core::{
    ContextId, Isolation, TransactionScope, TransactionalResource, TxError, TxResult, TxnId,
};

use crate::transaction::PhysicalTransaction;

/// Call-scoped transactional state
///
/// One context per call chain. Contexts are not shared between threads;
/// independent call chains create their own.
///
/// Dropping a context that still holds transactions rolls them back. The
/// manager is not told: abandoned transactions stay counted in
/// `TransactionMetrics::active`.
#[derive(Debug, Default)]
pub struct TxContext {
    id: ContextId,
    current: Option<Box<PhysicalTransaction>>,
}

impl TxContext {
    /// Create a context with no current transaction
    pub fn new() -> Self {
        Self::default()
    }

    /// Context id used in log output
    pub fn id(&self) -> ContextId {
        self.id
    }

    /// Whether a physical transaction is current
    pub fn is_active(&self) -> bool {
        self.current.is_some()
    }

    /// Whether the current physical transaction is read-only
    ///
    /// Returns false when nothing is current.
    pub fn is_read_only(&self) -> bool {
        self.current.as_ref().is_some_and(|t| t.is_read_only())
    }

    /// Id of the current physical transaction
    pub fn current_txn_id(&self) -> Option<TxnId> {
        self.current.as_ref().map(|t| t.id())
    }

    /// Isolation of the current physical transaction
    pub fn isolation(&self) -> Option<Isolation> {
        self.current.as_ref().map(|t| t.isolation())
    }

    /// Whether the current physical transaction is marked rollback-only
    pub fn is_rollback_only(&self) -> bool {
        self.current.as_ref().is_some_and(|t| t.is_rollback_only())
    }

    /// Name of the definition that created the current transaction
    pub fn current_name(&self) -> Option<&str> {
        self.current.as_ref().and_then(|t| t.name())
    }

    /// Current transaction plus every transaction it (transitively) suspended
    pub fn depth(&self) -> usize {
        let mut depth = 0;
        let mut next = self.current.as_deref();
        while let Some(txn) = next {
            depth += 1;
            next = txn.suspended.as_deref();
        }
        depth
    }

    pub(crate) fn current(&self) -> Option<&PhysicalTransaction> {
        self.current.as_deref()
    }

    pub(crate) fn current_mut(&mut self) -> Option<&mut PhysicalTransaction> {
        self.current.as_deref_mut()
    }

    /// Make `txn` current, handing it ownership of the previous current one
    pub(crate) fn push(&mut self, mut txn: Box<PhysicalTransaction>) {
        txn.suspended = self.current.take();
        self.current = Some(txn);
    }

    /// Detach the current transaction and resume the one it suspended
    pub(crate) fn pop(&mut self) -> Option<Box<PhysicalTransaction>> {
        let mut txn = self.current.take()?;
        self.current = txn.suspended.take();
        Some(txn)
    }
}

impl TransactionScope for TxContext {
    fn current_txn(&self) -> Option<TxnId> {
        self.current_txn_id()
    }

    fn is_read_only(&self) -> bool {
        TxContext::is_read_only(self)
    }

    fn enlist(&mut self, resource: Arc<dyn TransactionalResource>) -> TxResult<()> {
        match self.current.as_deref_mut() {
            Some(txn) => {
                txn.enlist(resource);
                Ok(())
            }
            None => Err(TxError::illegal_state(format!(
                "cannot enlist {} without an active transaction",
                resource.resource_name()
            ))),
        }
    }
}

impl Drop for TxContext {
    fn drop(&mut self) {
        while let Some(mut txn) = self.pop() {
            warn!(
                target: "txnest::txn",
                context = %self.id,
                txn_id = %txn.id(),
                "Context dropped with unfinished transaction - rolling back"
            );
            if let Err(e) = txn.rollback_resources() {
                warn!(
                    target: "txnest::txn",
                    context = %self.id,
                    txn_id = %txn.id(),
                    error = %e,
                    "Rollback of abandoned transaction did not complete"
                );
            }
        }
    }
}
