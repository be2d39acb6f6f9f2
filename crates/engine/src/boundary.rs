//! Transactional boundaries
//!
//! A boundary is the explicit replacement for a transactional annotation:
//! a component owns one, configured with a definition (transactional) or
//! none (plain call that participates in whatever is current).

use std::sync::Arc;

use txnest_concurrency::{TransactionManager, TxContext};
use txnest_core::TransactionDefinition;

use crate::error::Result;

/// Transaction demarcation for one component
#[derive(Clone)]
pub struct TxBoundary {
    manager: Arc<TransactionManager>,
    definition: Option<TransactionDefinition>,
}

impl TxBoundary {
    /// Boundary that runs calls under `definition`
    pub fn transactional(manager: Arc<TransactionManager>, definition: TransactionDefinition) -> Self {
        Self {
            manager,
            definition: Some(definition),
        }
    }

    /// Boundary that adds no transaction of its own
    pub fn none(manager: Arc<TransactionManager>) -> Self {
        Self {
            manager,
            definition: None,
        }
    }

    /// Boundary from an optional definition
    pub fn from_definition(
        manager: Arc<TransactionManager>,
        definition: Option<TransactionDefinition>,
    ) -> Self {
        Self { manager, definition }
    }

    /// Configured definition, `None` when not transactional
    pub fn definition(&self) -> Option<&TransactionDefinition> {
        self.definition.as_ref()
    }

    /// Shared manager
    pub fn manager(&self) -> &Arc<TransactionManager> {
        &self.manager
    }

    /// Run `f` inside this boundary
    ///
    /// With a definition, `f` runs through `TransactionManager::execute`;
    /// without one, it runs directly on the caller's context.
    pub fn run<T, F>(&self, ctx: &mut TxContext, f: F) -> Result<T>
    where
        F: FnOnce(&mut TxContext) -> Result<T>,
    {
        match &self.definition {
            Some(definition) => self.manager.execute(ctx, definition, f),
            None => f(ctx),
        }
    }
}

impl std::fmt::Debug for TxBoundary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TxBoundary")
            .field("definition", &self.definition)
            .finish()
    }
}
