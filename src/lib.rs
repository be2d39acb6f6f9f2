//! txnest - transaction propagation with nested join/suspend semantics
//!
//! Nested calls either join the current physical transaction (`Required`)
//! or suspend it and run in their own (`RequiresNew`). A joined participant
//! that fails only votes: it marks the shared transaction rollback-only, and
//! the owner's commit then surfaces `UnexpectedRollback`.
//!
//! # Quick Start
//!
//! ```
//! use txnest::{MemberService, TxContext, TxnestConfig};
//!
//! let service = MemberService::from_config(&TxnestConfig::default());
//! let mut ctx = TxContext::new();
//!
//! service.join_v1(&mut ctx, "alice").unwrap();
//! assert!(service.members().find("alice").is_some());
//!
//! // Log save fails inside the shared transaction; join_v2 swallows the
//! // error, but the owner's commit still rolls everything back.
//! let err = service.join_v2(&mut ctx, "logException_bob").unwrap_err();
//! assert!(err.is_unexpected_rollback());
//! assert!(service.members().find("logException_bob").is_none());
//! ```
//!
//! # Architecture
//!
//! - `txnest-core`: identifiers, definitions, errors, resource traits
//! - `txnest-storage`: record stores with per-transaction pending writes
//! - `txnest-concurrency`: manager, context, handles, physical transactions
//! - `txnest-engine`: boundaries, repositories, services, configuration

pub use txnest_concurrency::{
    ManagerConfig, PhysicalTransaction, TransactionHandle, TransactionManager, TransactionMetrics,
    TransactionStatus, TxContext,
};
pub use txnest_core::{
    AutoCommit, ContextId, Isolation, Propagation, ResourceId, TransactionDefinition,
    TransactionScope, TransactionalResource, TxError, TxResult, TxnId,
};
pub use txnest_engine::{
    ComponentPolicy, Error, LevelService, Log, LogRepository, Member, MemberRepository,
    MemberService, Result, TxBoundary, TxInfo, TxnestConfig, CONFIG_FILE_NAME,
    DEFAULT_FAILURE_MARKERS,
};
pub use txnest_storage::RecordStore;
