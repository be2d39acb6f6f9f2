//! Physical transactions
//!
//! A physical transaction is the unit that is committed or rolled back
//! exactly once. It owns:
//! - the resources that buffered effects on its behalf
//! - the transaction it suspended (if it was created by `RequiresNew`)
//!
//! Logical participation (joining) never creates a physical transaction;
//! see `TransactionHandle` for the per-call view.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use txnest_core::{Isolation, TransactionDefinition, TransactionalResource, TxError, TxResult, TxnId};

/// Status of a physical transaction in its lifecycle
///
/// State transitions:
/// - `Active` → `MarkedRollbackOnly` (a participant voted to roll back)
/// - `Active` → `Committed` (owner committed)
/// - `Active` | `MarkedRollbackOnly` → `RolledBack` (owner rolled back, or
///   committed a rollback-only transaction)
///
/// Terminal states (no transitions allowed):
/// - `Committed`
/// - `RolledBack`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    /// Transaction is executing
    Active,
    /// Transaction is doomed; only the owner may act on it
    MarkedRollbackOnly,
    /// Effects were made durable
    Committed,
    /// Effects were discarded
    RolledBack,
}

impl TransactionStatus {
    /// Whether no further transitions are allowed
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransactionStatus::Committed | TransactionStatus::RolledBack)
    }
}

/// The actual unit of atomicity
pub struct PhysicalTransaction {
    id: TxnId,
    status: TransactionStatus,
    read_only: bool,
    isolation: Isolation,
    name: Option<String>,
    /// Resources holding pending effects for this transaction
    resources: Vec<Arc<dyn TransactionalResource>>,
    /// Transaction detached from the context while this one runs
    pub(crate) suspended: Option<Box<PhysicalTransaction>>,
    start_time: Instant,
}

impl PhysicalTransaction {
    /// Create an active transaction from the definition that requested it
    pub fn new(id: TxnId, definition: &TransactionDefinition) -> Self {
        Self {
            id,
            status: TransactionStatus::Active,
            read_only: definition.read_only,
            isolation: definition.isolation,
            name: definition.name.clone(),
            resources: Vec::new(),
            suspended: None,
            start_time: Instant::now(),
        }
    }

    /// Transaction id
    pub fn id(&self) -> TxnId {
        self.id
    }

    /// Current status
    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// Read-only flag fixed at creation
    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Isolation fixed at creation
    pub fn isolation(&self) -> Isolation {
        self.isolation
    }

    /// Name of the definition that created this transaction
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Whether a participant marked this transaction rollback-only
    pub fn is_rollback_only(&self) -> bool {
        self.status == TransactionStatus::MarkedRollbackOnly
    }

    /// Id of the transaction this one suspended
    pub fn suspended_id(&self) -> Option<TxnId> {
        self.suspended.as_ref().map(|s| s.id)
    }

    /// Number of enlisted resources
    pub fn resource_count(&self) -> usize {
        self.resources.len()
    }

    /// Time since creation
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Mark this transaction rollback-only
    ///
    /// Marking twice is a no-op.
    ///
    /// # Errors
    /// Returns `TransactionCompleted` if the transaction already finished.
    pub fn mark_rollback_only(&mut self) -> TxResult<()> {
        if self.status.is_terminal() {
            return Err(TxError::TransactionCompleted { txn: self.id });
        }
        self.status = TransactionStatus::MarkedRollbackOnly;
        Ok(())
    }

    /// Register a resource; enlisting the same resource twice is a no-op
    pub fn enlist(&mut self, resource: Arc<dyn TransactionalResource>) {
        let id = resource.resource_id();
        if !self.resources.iter().any(|r| r.resource_id() == id) {
            self.resources.push(resource);
        }
    }

    /// Apply the effects of every enlisted resource, in enlistment order
    ///
    /// Not atomic across resources: when one fails, resources already
    /// committed keep their effects, while the failing resource and every
    /// later one are rolled back. The transaction then ends `RolledBack`.
    ///
    /// # Errors
    /// Returns `TransactionCompleted` if already finished, or the resource error.
    pub(crate) fn commit_resources(&mut self) -> TxResult<()> {
        if self.status.is_terminal() {
            return Err(TxError::TransactionCompleted { txn: self.id });
        }
        for (i, resource) in self.resources.iter().enumerate() {
            if let Err(e) = resource.commit(self.id) {
                for rest in &self.resources[i..] {
                    rest.rollback(self.id);
                }
                self.status = TransactionStatus::RolledBack;
                return Err(e);
            }
        }
        self.status = TransactionStatus::Committed;
        Ok(())
    }

    /// Discard the effects of every enlisted resource
    ///
    /// # Errors
    /// Returns `TransactionCompleted` if already finished.
    pub(crate) fn rollback_resources(&mut self) -> TxResult<()> {
        if self.status.is_terminal() {
            return Err(TxError::TransactionCompleted { txn: self.id });
        }
        for resource in &self.resources {
            resource.rollback(self.id);
        }
        self.status = TransactionStatus::RolledBack;
        Ok(())
    }
}

impl fmt::Debug for PhysicalTransaction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysicalTransaction")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("read_only", &self.read_only)
            .field("isolation", &self.isolation)
            .field("name", &self.name)
            .field("resources", &self.resources.len())
            .field("suspended", &self.suspended_id())
            .finish()
    }
}
