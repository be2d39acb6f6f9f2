//! RecordStore: minimal keyed store with per-transaction pending effects
//!
//! This module implements the record store used by repositories to make
//! commit and rollback observable:
//! - `FxHashMap<String, V>` behind `parking_lot::RwLock` for durable records
//! - `DashMap<TxnId, Vec<(String, V)>>` for pending effect sets
//!
//! # Design Notes
//!
//! - **Read-committed**: `find` only ever reads durable records. Pending
//!   effects of one transaction are invisible to every other reader.
//! - **Last write wins**: inserting an existing key replaces its record.
//! - **Auto-commit**: with no current transaction, `insert` is applied
//!   immediately.
//! - **Enlistment**: the first buffered write of a transaction enlists the
//!   store, so the owner of the physical transaction finalizes it.

use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

use txnest_core::{ResourceId, TransactionScope, TransactionalResource, TxError, TxResult, TxnId};

/// Keyed record store with transactional writes
///
/// Cheap to clone: clones share the same records.
///
/// # Example
///
/// ```
/// use txnest_core::AutoCommit;
/// use txnest_storage::RecordStore;
///
/// let store: RecordStore<u32> = RecordStore::new("scores");
/// store.insert(&mut AutoCommit, "alice", 10).unwrap();
/// assert_eq!(store.find("alice"), Some(10));
/// ```
pub struct RecordStore<V> {
    inner: Arc<StoreInner<V>>,
}

struct StoreInner<V> {
    id: ResourceId,
    name: String,
    /// Durable records
    committed: RwLock<FxHashMap<String, V>>,
    /// Buffered writes per physical transaction, in insertion order
    pending: DashMap<TxnId, Vec<(String, V)>>,
}

impl<V> Clone for RecordStore<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V> fmt::Debug for RecordStore<V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecordStore")
            .field("name", &self.inner.name)
            .field("records", &self.inner.committed.read().len())
            .field("pending_txns", &self.inner.pending.len())
            .finish()
    }
}

impl<V> RecordStore<V>
where
    V: Clone + Send + Sync + 'static,
{
    /// Create an empty store
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                id: ResourceId::new(),
                name: name.into(),
                committed: RwLock::new(FxHashMap::default()),
                pending: DashMap::new(),
            }),
        }
    }

    /// Store name
    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Write a record under the scope's current transaction
    ///
    /// # Errors
    ///
    /// Returns `TransactionReadOnly` if the current transaction is read-only.
    pub fn insert<S>(&self, scope: &mut S, key: impl Into<String>, value: V) -> TxResult<()>
    where
        S: TransactionScope + ?Sized,
    {
        let key = key.into();
        let Some(txn) = scope.current_txn() else {
            trace!(target: "txnest::storage", store = %self.inner.name, %key, "Auto-commit insert");
            self.inner.committed.write().insert(key, value);
            return Ok(());
        };

        if scope.is_read_only() {
            return Err(TxError::TransactionReadOnly { txn });
        }

        scope.enlist(Arc::clone(&self.inner) as Arc<dyn TransactionalResource>)?;
        debug!(target: "txnest::storage", store = %self.inner.name, txn_id = %txn, %key, "Buffered insert");
        self.inner.pending.entry(txn).or_default().push((key, value));
        Ok(())
    }

    /// Read the durable record for `key`
    pub fn find(&self, key: &str) -> Option<V> {
        self.inner.committed.read().get(key).cloned()
    }

    /// Whether a durable record exists for `key`
    pub fn contains(&self, key: &str) -> bool {
        self.inner.committed.read().contains_key(key)
    }

    /// Number of durable records
    pub fn len(&self) -> usize {
        self.inner.committed.read().len()
    }

    /// Whether the store holds no durable records
    pub fn is_empty(&self) -> bool {
        self.inner.committed.read().is_empty()
    }

    /// Number of writes buffered for `txn`
    pub fn pending_count(&self, txn: TxnId) -> usize {
        self.inner.pending.get(&txn).map_or(0, |w| w.len())
    }
}

impl<V> TransactionalResource for StoreInner<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn resource_id(&self) -> ResourceId {
        self.id
    }

    fn resource_name(&self) -> &str {
        &self.name
    }

    fn commit(&self, txn: TxnId) -> TxResult<()> {
        let Some((_, writes)) = self.pending.remove(&txn) else {
            return Ok(());
        };
        let applied = writes.len();
        let mut committed = self.committed.write();
        for (key, value) in writes {
            committed.insert(key, value);
        }
        debug!(target: "txnest::storage", store = %self.name, txn_id = %txn, applied, "Applied pending writes");
        Ok(())
    }

    fn rollback(&self, txn: TxnId) {
        if let Some((_, writes)) = self.pending.remove(&txn) {
            debug!(target: "txnest::storage", store = %self.name, txn_id = %txn, discarded = writes.len(), "Discarded pending writes");
        }
    }
}
