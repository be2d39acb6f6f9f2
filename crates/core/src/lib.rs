//! Core types and traits for txnest
//!
//! This crate defines the foundational types used throughout the system:
//! - TxnId / ContextId / ResourceId: Identifiers
//! - Propagation / Isolation: Declared transactional requirements
//! - TransactionDefinition: Per call site attribute set
//! - TxError: Error taxonomy
//! - Traits: TransactionalResource, TransactionScope

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod traits;
pub mod types;

pub use error::{TxError, TxResult};
pub use traits::{AutoCommit, TransactionScope, TransactionalResource};
pub use types::{ContextId, Isolation, Propagation, ResourceId, TransactionDefinition, TxnId};
