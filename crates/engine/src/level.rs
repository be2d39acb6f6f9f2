//! Read-only level demo
//!
//! A component whose default definition is read-only, with one operation
//! that overrides it as read-write. Each call reports what it observed
//! inside its own transaction.

use std::sync::Arc;

use tracing::info;
use txnest_concurrency::{TransactionManager, TxContext};
use txnest_core::TransactionDefinition;

use crate::error::Result;

/// Transaction state observed inside a call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TxInfo {
    /// A transaction was current
    pub active: bool,
    /// The current transaction was read-only
    pub read_only: bool,
}

impl TxInfo {
    /// Snapshot of `ctx`
    pub fn capture(ctx: &TxContext) -> Self {
        Self {
            active: ctx.is_active(),
            read_only: ctx.is_read_only(),
        }
    }
}

/// Service with a read-only default and a read-write override
#[derive(Debug, Clone)]
pub struct LevelService {
    manager: Arc<TransactionManager>,
    default_definition: TransactionDefinition,
}

impl LevelService {
    /// Create the service over a shared manager
    pub fn new(manager: Arc<TransactionManager>) -> Self {
        Self {
            manager,
            default_definition: TransactionDefinition::required()
                .with_read_only(true)
                .named("LevelService"),
        }
    }

    /// Definition used by operations that do not override it
    pub fn default_definition(&self) -> &TransactionDefinition {
        &self.default_definition
    }

    /// Read-write operation
    pub fn write(&self, ctx: &mut TxContext) -> Result<TxInfo> {
        let definition = self
            .default_definition
            .clone()
            .with_read_only(false)
            .named("LevelService.write");
        self.observe(ctx, &definition, "write")
    }

    /// Operation using the read-only default
    pub fn read(&self, ctx: &mut TxContext) -> Result<TxInfo> {
        let definition = self.default_definition.clone().named("LevelService.read");
        self.observe(ctx, &definition, "read")
    }

    fn observe(
        &self,
        ctx: &mut TxContext,
        definition: &TransactionDefinition,
        operation: &str,
    ) -> Result<TxInfo> {
        self.manager.execute(ctx, definition, |ctx| {
            let tx = TxInfo::capture(ctx);
            info!(
                target: "txnest::service",
                operation,
                active = tx.active,
                read_only = tx.read_only,
                "Transaction state"
            );
            Ok(tx)
        })
    }
}
