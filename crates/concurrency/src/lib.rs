//! Concurrency layer for txnest
//!
//! This crate implements transaction propagation:
//! - TransactionManager: begin / commit / rollback / mark_rollback_only
//! - TxContext: call-scoped current transaction with LIFO suspension
//! - TransactionHandle: a call's logical participation (`is_new`)
//! - PhysicalTransaction: the unit committed or rolled back exactly once

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod handle;
pub mod manager;
pub mod transaction;

pub use context::TxContext;
pub use handle::TransactionHandle;
pub use manager::{ManagerConfig, TransactionManager, TransactionMetrics};
pub use transaction::{PhysicalTransaction, TransactionStatus};
