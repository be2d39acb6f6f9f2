//! Member and log repositories
//!
//! Two independent repositories over their own record stores. Each carries
//! a boundary, so a test can switch any repository between "not
//! transactional", `Required` and `RequiresNew`.

use std::sync::Arc;

use tracing::{debug, info};
use txnest_concurrency::{TransactionManager, TxContext};
use txnest_core::{Propagation, TransactionDefinition};
use txnest_storage::RecordStore;

use crate::boundary::TxBoundary;
use crate::error::{Error, Result};

/// Member record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// Primary key
    pub username: String,
}

impl Member {
    /// Create a member record
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Log record, keyed by its message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Log {
    /// Primary key
    pub message: String,
}

impl Log {
    /// Create a log record
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Repository of member records
#[derive(Debug, Clone)]
pub struct MemberRepository {
    store: RecordStore<Member>,
    boundary: TxBoundary,
}

impl MemberRepository {
    /// Create a repository with its own empty store
    pub fn new(manager: Arc<TransactionManager>, definition: Option<TransactionDefinition>) -> Self {
        Self {
            store: RecordStore::new("member"),
            boundary: TxBoundary::from_definition(manager, definition),
        }
    }

    /// Persist a member
    pub fn save(&self, ctx: &mut TxContext, member: Member) -> Result<()> {
        self.boundary.run(ctx, |ctx| {
            info!(target: "txnest::service", username = %member.username, "Saving member");
            self.store.insert(ctx, member.username.clone(), member)?;
            Ok(())
        })
    }

    /// Committed member for `username`
    pub fn find(&self, username: &str) -> Option<Member> {
        self.store.find(username)
    }

    /// Underlying store
    pub fn store(&self) -> &RecordStore<Member> {
        &self.store
    }
}

/// Repository of log records
///
/// Saving a log whose message contains one of the failure markers buffers
/// the write and then fails with [`Error::LogPersistFailed`], so the caller's
/// transaction handling decides whether the buffered write survives.
#[derive(Debug, Clone)]
pub struct LogRepository {
    store: RecordStore<Log>,
    boundary: TxBoundary,
    failure_markers: Vec<String>,
}

impl LogRepository {
    /// Create a repository with its own empty store
    pub fn new(
        manager: Arc<TransactionManager>,
        definition: Option<TransactionDefinition>,
        failure_markers: Vec<String>,
    ) -> Self {
        Self {
            store: RecordStore::new("log"),
            boundary: TxBoundary::from_definition(manager, definition),
            failure_markers,
        }
    }

    /// Persist a log record
    pub fn save(&self, ctx: &mut TxContext, log: Log) -> Result<()> {
        self.boundary.run(ctx, |ctx| {
            info!(target: "txnest::service", message = %log.message, "Saving log");
            let message = log.message.clone();
            self.store.insert(ctx, message.clone(), log)?;

            if self.should_fail(&message) {
                debug!(target: "txnest::service", %message, "Log failure marker matched");
                return Err(Error::LogPersistFailed { username: message });
            }
            Ok(())
        })
    }

    /// Whether a failed save has already been settled by its own transaction
    ///
    /// True for `RequiresNew`: the failure rolled back a transaction of its
    /// own and left the caller's untouched.
    pub fn runs_independently(&self) -> bool {
        self.boundary
            .definition()
            .is_some_and(|d| d.propagation == Propagation::RequiresNew)
    }

    /// Committed log for `message`
    pub fn find(&self, message: &str) -> Option<Log> {
        self.store.find(message)
    }

    /// Underlying store
    pub fn store(&self) -> &RecordStore<Log> {
        &self.store
    }

    fn should_fail(&self, message: &str) -> bool {
        self.failure_markers.iter().any(|m| message.contains(m.as_str()))
    }
}
