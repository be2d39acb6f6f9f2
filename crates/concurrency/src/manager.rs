//! Transaction manager implementing propagation rules
//!
//! The manager maps logical transaction requests onto physical transactions:
//!
//! ```text
//! begin(def):
//!   nothing current            -> create, is_new = true
//!   current + Required         -> join,   is_new = false
//!                                 (read-write into read-only: IllegalTransactionState)
//!   current + RequiresNew      -> suspend current, create, is_new = true
//!
//! commit(handle):
//!   joined                     -> no-op, owner decides
//!   new + rollback-only        -> roll back, resume parent, UnexpectedRollback
//!   new                        -> apply effects, resume parent
//!
//! rollback(handle):
//!   joined                     -> mark physical transaction rollback-only
//!   new                        -> discard effects, resume parent
//! ```
//!
//! Only the handle that created a physical transaction may finalize it.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};
use txnest_core::{Propagation, TransactionDefinition, TxError, TxResult, TxnId};

use crate::context::TxContext;
use crate::handle::TransactionHandle;
use crate::transaction::PhysicalTransaction;

/// Manager behaviour switches
///
/// Persisted under the `[manager]` section of `txnest.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Whether a participant's rollback marks the whole physical transaction
    /// rollback-only (default: true). When false, the owner alone decides.
    #[serde(default = "default_true")]
    pub global_rollback_on_participation_failure: bool,
}

fn default_true() -> bool {
    true
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            global_rollback_on_participation_failure: true,
        }
    }
}

/// Snapshot of manager counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransactionMetrics {
    /// Physical transactions currently open on any context
    ///
    /// Includes transactions abandoned by dropping their `TxContext`: the
    /// context rolls them back without reporting to the manager.
    pub active: u64,
    /// Physical transactions created
    pub started: u64,
    /// Handles that joined an existing transaction
    pub joined: u64,
    /// Suspensions caused by `RequiresNew`
    pub suspended: u64,
    /// Physical transactions committed
    pub committed: u64,
    /// Physical transactions rolled back (including unexpected rollbacks)
    pub rolled_back: u64,
    /// Commit requests that turned into rollbacks
    pub unexpected_rollbacks: u64,
}

/// Process-wide transaction id allocator
///
/// Shared by every manager so that resources keyed by `TxnId` never see two
/// live transactions with the same id, even when several managers write to
/// one store.
static NEXT_TXN_ID: AtomicU64 = AtomicU64::new(1);

/// Transaction manager shared by every call chain
///
/// Holds no per-call state: the current transaction lives in the
/// `TxContext` passed to each method, so one manager (behind an `Arc`) can
/// serve any number of threads.
///
/// # Memory Ordering
///
/// Transaction ids come from a process-wide counter (SeqCst). The metric
/// counters use Relaxed ordering: they are observational only and
/// synchronize nothing else.
pub struct TransactionManager {
    config: ManagerConfig,
    active_count: AtomicU64,
    total_started: AtomicU64,
    total_joined: AtomicU64,
    total_suspended: AtomicU64,
    total_committed: AtomicU64,
    total_rolled_back: AtomicU64,
    total_unexpected: AtomicU64,
}

impl TransactionManager {
    /// Create a manager with default settings
    pub fn new() -> Self {
        Self::with_config(ManagerConfig::default())
    }

    /// Create a manager with explicit settings
    pub fn with_config(config: ManagerConfig) -> Self {
        Self {
            config,
            active_count: AtomicU64::new(0),
            total_started: AtomicU64::new(0),
            total_joined: AtomicU64::new(0),
            total_suspended: AtomicU64::new(0),
            total_committed: AtomicU64::new(0),
            total_rolled_back: AtomicU64::new(0),
            total_unexpected: AtomicU64::new(0),
        }
    }

    /// Active settings
    pub fn config(&self) -> &ManagerConfig {
        &self.config
    }

    /// Enter a transactional region
    ///
    /// # Errors
    /// Returns `IllegalTransactionState` when a read-write definition tries to
    /// join a read-only transaction. Nothing is started or marked.
    pub fn begin(
        &self,
        ctx: &mut TxContext,
        definition: &TransactionDefinition,
    ) -> TxResult<TransactionHandle> {
        let Some((current, current_read_only)) =
            ctx.current().map(|t| (t.id(), t.is_read_only()))
        else {
            return Ok(self.start_new(ctx, definition));
        };

        match definition.propagation {
            Propagation::Required => {
                if current_read_only && !definition.read_only {
                    return Err(TxError::illegal_state(format!(
                        "read-write definition '{}' cannot participate in read-only transaction {}",
                        definition.display_name(),
                        current
                    )));
                }
                self.total_joined.fetch_add(1, Ordering::Relaxed);
                debug!(
                    target: "txnest::txn",
                    context = %ctx.id(),
                    txn_id = %current,
                    name = definition.display_name(),
                    "Participating in existing transaction"
                );
                Ok(TransactionHandle::new(ctx.id(), current, definition.clone(), false))
            }
            Propagation::RequiresNew => {
                self.total_suspended.fetch_add(1, Ordering::Relaxed);
                debug!(
                    target: "txnest::txn",
                    context = %ctx.id(),
                    suspended = %current,
                    name = definition.display_name(),
                    "Suspending current transaction, creating new transaction"
                );
                Ok(self.start_new(ctx, definition))
            }
        }
    }

    /// Finish a transactional region successfully
    ///
    /// # Errors
    /// - `UnexpectedRollback` if the physical transaction was marked
    ///   rollback-only; it has been rolled back.
    /// - `TransactionCompleted` if the handle was already completed.
    /// - `IllegalTransactionState` if the handle is not current on `ctx`.
    pub fn commit(&self, ctx: &mut TxContext, handle: &mut TransactionHandle) -> TxResult<()> {
        self.check_current(ctx, handle)?;
        handle.set_completed();

        if !handle.is_new() {
            trace!(
                target: "txnest::txn",
                txn_id = %handle.txn_id(),
                "Participant commit deferred to transaction owner"
            );
            return Ok(());
        }

        let mut txn = self.detach(ctx, handle.txn_id())?;
        let result = if txn.is_rollback_only() {
            warn!(
                target: "txnest::txn",
                context = %ctx.id(),
                txn_id = %txn.id(),
                "Transaction is marked rollback-only - rolling back instead of committing"
            );
            txn.rollback_resources()?;
            self.total_rolled_back.fetch_add(1, Ordering::Relaxed);
            self.total_unexpected.fetch_add(1, Ordering::Relaxed);
            Err(TxError::UnexpectedRollback { txn: txn.id() })
        } else {
            match txn.commit_resources() {
                Ok(()) => {
                    self.total_committed.fetch_add(1, Ordering::Relaxed);
                    debug!(
                        target: "txnest::txn",
                        context = %ctx.id(),
                        txn_id = %txn.id(),
                        resources = txn.resource_count(),
                        elapsed_us = txn.elapsed().as_micros() as u64,
                        "Committed transaction"
                    );
                    Ok(())
                }
                Err(e) => {
                    self.total_rolled_back.fetch_add(1, Ordering::Relaxed);
                    Err(e)
                }
            }
        };

        self.log_resumed(ctx);
        result
    }

    /// Finish a transactional region unsuccessfully
    ///
    /// A joined handle only marks the physical transaction rollback-only;
    /// the owner performs the rollback.
    ///
    /// # Errors
    /// - `TransactionCompleted` if the handle was already completed.
    /// - `IllegalTransactionState` if the handle is not current on `ctx`.
    pub fn rollback(&self, ctx: &mut TxContext, handle: &mut TransactionHandle) -> TxResult<()> {
        self.check_current(ctx, handle)?;
        handle.set_completed();

        if !handle.is_new() {
            if self.config.global_rollback_on_participation_failure {
                if let Some(txn) = ctx.current_mut() {
                    txn.mark_rollback_only()?;
                }
                debug!(
                    target: "txnest::txn",
                    context = %ctx.id(),
                    txn_id = %handle.txn_id(),
                    "Participating transaction failed - marking existing transaction as rollback-only"
                );
            } else {
                debug!(
                    target: "txnest::txn",
                    context = %ctx.id(),
                    txn_id = %handle.txn_id(),
                    "Participating transaction failed - letting transaction owner decide on rollback"
                );
            }
            return Ok(());
        }

        let mut txn = self.detach(ctx, handle.txn_id())?;
        txn.rollback_resources()?;
        self.total_rolled_back.fetch_add(1, Ordering::Relaxed);
        debug!(
            target: "txnest::txn",
            context = %ctx.id(),
            txn_id = %txn.id(),
            "Rolled back transaction"
        );
        self.log_resumed(ctx);
        Ok(())
    }

    /// Mark the physical transaction behind `handle` rollback-only
    ///
    /// # Errors
    /// - `TransactionCompleted` if the handle was already completed.
    /// - `IllegalTransactionState` if the handle is not current on `ctx`.
    pub fn mark_rollback_only(&self, ctx: &mut TxContext, handle: &TransactionHandle) -> TxResult<()> {
        self.check_current(ctx, handle)?;
        let txn = ctx
            .current_mut()
            .ok_or_else(|| TxError::illegal_state("no transaction is current"))?;
        txn.mark_rollback_only()?;
        debug!(
            target: "txnest::txn",
            txn_id = %handle.txn_id(),
            "Transaction marked rollback-only"
        );
        Ok(())
    }

    /// Mark whatever physical transaction is current on `ctx` rollback-only
    ///
    /// For code running inside a region it did not open (and so holds no
    /// handle for) that swallows a failure.
    ///
    /// # Errors
    /// Returns `IllegalTransactionState` if nothing is current.
    pub fn mark_current_rollback_only(&self, ctx: &mut TxContext) -> TxResult<()> {
        let context = ctx.id();
        let txn = ctx
            .current_mut()
            .ok_or_else(|| TxError::illegal_state("no transaction is current"))?;
        txn.mark_rollback_only()?;
        debug!(
            target: "txnest::txn",
            %context,
            txn_id = %txn.id(),
            "Current transaction marked rollback-only"
        );
        Ok(())
    }

    /// Run `f` inside a transactional region
    ///
    /// Commits when `f` returns `Ok`, rolls back (by the same `is_new` rule)
    /// when it returns `Err`. On the error path the original error is
    /// returned even if the rollback itself fails.
    ///
    /// # Example
    ///
    /// ```
    /// use txnest_concurrency::{TransactionManager, TxContext};
    /// use txnest_core::{TransactionDefinition, TxError};
    ///
    /// let manager = TransactionManager::new();
    /// let mut ctx = TxContext::new();
    /// let active = manager
    ///     .execute(&mut ctx, &TransactionDefinition::required(), |ctx| {
    ///         Ok::<_, TxError>(ctx.is_active())
    ///     })
    ///     .unwrap();
    /// assert!(active);
    /// assert!(!ctx.is_active());
    /// ```
    pub fn execute<T, E, F>(
        &self,
        ctx: &mut TxContext,
        definition: &TransactionDefinition,
        f: F,
    ) -> Result<T, E>
    where
        F: FnOnce(&mut TxContext) -> Result<T, E>,
        E: From<TxError>,
    {
        let mut handle = self.begin(ctx, definition)?;
        match f(ctx) {
            Ok(value) => {
                self.commit(ctx, &mut handle)?;
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = self.rollback(ctx, &mut handle) {
                    warn!(
                        target: "txnest::txn",
                        txn_id = %handle.txn_id(),
                        error = %rollback_err,
                        "Rollback after failure did not complete"
                    );
                }
                Err(err)
            }
        }
    }

    /// Snapshot of the counters
    pub fn metrics(&self) -> TransactionMetrics {
        TransactionMetrics {
            active: self.active_count.load(Ordering::Relaxed),
            started: self.total_started.load(Ordering::Relaxed),
            joined: self.total_joined.load(Ordering::Relaxed),
            suspended: self.total_suspended.load(Ordering::Relaxed),
            committed: self.total_committed.load(Ordering::Relaxed),
            rolled_back: self.total_rolled_back.load(Ordering::Relaxed),
            unexpected_rollbacks: self.total_unexpected.load(Ordering::Relaxed),
        }
    }

    fn start_new(&self, ctx: &mut TxContext, definition: &TransactionDefinition) -> TransactionHandle {
        let id = TxnId::new(NEXT_TXN_ID.fetch_add(1, Ordering::SeqCst));
        ctx.push(Box::new(PhysicalTransaction::new(id, definition)));

        self.active_count.fetch_add(1, Ordering::Relaxed);
        self.total_started.fetch_add(1, Ordering::Relaxed);
        debug!(
            target: "txnest::txn",
            context = %ctx.id(),
            txn_id = %id,
            name = definition.display_name(),
            propagation = %definition.propagation,
            read_only = definition.read_only,
            "Creating new transaction"
        );

        TransactionHandle::new(ctx.id(), id, definition.clone(), true)
    }

    /// Validate that `handle` may act on `ctx` right now
    fn check_current(&self, ctx: &TxContext, handle: &TransactionHandle) -> TxResult<()> {
        if handle.is_completed() {
            return Err(TxError::TransactionCompleted {
                txn: handle.txn_id(),
            });
        }
        if handle.context_id() != ctx.id() {
            return Err(TxError::illegal_state(format!(
                "handle for {} belongs to another context",
                handle.txn_id()
            )));
        }
        match ctx.current_txn_id() {
            Some(current) if current == handle.txn_id() => Ok(()),
            Some(current) => Err(TxError::illegal_state(format!(
                "{} is not the current transaction ({} is) - complete inner transactions first",
                handle.txn_id(),
                current
            ))),
            None => Err(TxError::illegal_state(format!(
                "{} is not active on this context",
                handle.txn_id()
            ))),
        }
    }

    fn detach(&self, ctx: &mut TxContext, txn: TxnId) -> TxResult<Box<PhysicalTransaction>> {
        let detached = ctx
            .pop()
            .ok_or_else(|| TxError::illegal_state(format!("{} is not active on this context", txn)))?;
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        Ok(detached)
    }

    fn log_resumed(&self, ctx: &TxContext) {
        if let Some(resumed) = ctx.current_txn_id() {
            debug!(
                target: "txnest::txn",
                context = %ctx.id(),
                txn_id = %resumed,
                "Resuming suspended transaction after completion of inner transaction"
            );
        }
    }
}

impl Default for TransactionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for TransactionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionManager")
            .field("config", &self.config)
            .field("metrics", &self.metrics())
            .finish()
    }
}
