//! Core identifiers and transaction attribute types
//!
//! This module defines the fundamental types for transaction propagation:
//! - TxnId: Identifier of one physical transaction
//! - ContextId: Identifier of one call chain (transactional context)
//! - ResourceId: Identifier of a transactional resource (record store)
//! - Propagation / Isolation: Declared transactional requirements
//! - TransactionDefinition: The attribute set a call site declares

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identifier of a physical transaction
///
/// Allocated by the transaction manager from a monotonically increasing
/// counter. Joiners share the id of the physical transaction they joined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TxnId(u64);

impl TxnId {
    /// Wrap a raw transaction number
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw transaction number
    pub const fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for TxnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "txn-{}", self.0)
    }
}

/// Unique identifier for a transactional context (one call chain)
///
/// A ContextId is a wrapper around a UUID v4. It is attached to every log
/// line the manager emits so interleaved call chains can be told apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    /// Create a new random ContextId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the raw bytes of this ContextId
    pub fn as_bytes(&self) -> &[u8; 16] {
        self.0.as_bytes()
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a transactional resource
///
/// Used to enlist a resource with a physical transaction at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId(Uuid);

impl ResourceId {
    /// Create a new random ResourceId using UUID v4
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ResourceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Propagation policy of a transactional call
///
/// Decides whether a nested call joins the caller's physical transaction
/// or runs in an independent one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Propagation {
    /// Join the current transaction if one exists, otherwise create one
    #[default]
    Required,
    /// Always create a new physical transaction, suspending the current one
    RequiresNew,
}

impl fmt::Display for Propagation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Propagation::Required => write!(f, "REQUIRED"),
            Propagation::RequiresNew => write!(f, "REQUIRES_NEW"),
        }
    }
}

/// Isolation level requested for a new physical transaction
///
/// Advisory: recorded on the physical transaction and reported by the
/// context. The record store always reads committed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Isolation {
    /// Use the store's default level
    #[default]
    Default,
    /// Only committed data is visible
    ReadCommitted,
    /// Repeated reads observe the same data
    RepeatableRead,
    /// Full serializability
    Serializable,
}

/// Transactional attributes declared at one call site
///
/// Replaces annotation metadata: every operation that needs a transaction
/// builds one of these explicitly.
///
/// # Example
///
/// ```
/// use txnest_core::{Propagation, TransactionDefinition};
///
/// let def = TransactionDefinition::requires_new().with_read_only(true);
/// assert_eq!(def.propagation, Propagation::RequiresNew);
/// assert!(def.read_only);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransactionDefinition {
    /// Join or create policy
    #[serde(default)]
    pub propagation: Propagation,
    /// Whether the region only reads
    #[serde(default)]
    pub read_only: bool,
    /// Requested isolation for a newly created transaction
    #[serde(default)]
    pub isolation: Isolation,
    /// Label used in log output
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl TransactionDefinition {
    /// Read-write definition with `Required` propagation
    pub fn required() -> Self {
        Self::default()
    }

    /// Read-write definition with `RequiresNew` propagation
    pub fn requires_new() -> Self {
        Self {
            propagation: Propagation::RequiresNew,
            ..Self::default()
        }
    }

    /// Set the read-only flag
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = read_only;
        self
    }

    /// Set the isolation level
    pub fn with_isolation(mut self, isolation: Isolation) -> Self {
        self.isolation = isolation;
        self
    }

    /// Attach a name for log output
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Name for log output, `"<unnamed>"` when none was given
    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or("<unnamed>")
    }
}
