//! Orchestrating member service
//!
//! `join_v1` lets a log failure propagate; `join_v2` catches and swallows
//! it. Which writes survive is decided entirely by the three boundaries
//! (service, member repository, log repository) and their propagation.

use std::sync::Arc;

use tracing::{info, warn};
use txnest_concurrency::{TransactionManager, TxContext};

use crate::boundary::TxBoundary;
use crate::config::TxnestConfig;
use crate::error::Result;
use crate::repository::{Log, LogRepository, Member, MemberRepository};

/// Member sign-up service
#[derive(Debug, Clone)]
pub struct MemberService {
    boundary: TxBoundary,
    members: MemberRepository,
    logs: LogRepository,
}

impl MemberService {
    /// Assemble a service from already-built parts
    pub fn new(boundary: TxBoundary, members: MemberRepository, logs: LogRepository) -> Self {
        Self {
            boundary,
            members,
            logs,
        }
    }

    /// Build the service, its repositories and a fresh manager from config
    pub fn from_config(config: &TxnestConfig) -> Self {
        let manager = Arc::new(TransactionManager::with_config(config.manager.clone()));
        Self::with_manager(manager, config)
    }

    /// Build the service and its repositories around an existing manager
    pub fn with_manager(manager: Arc<TransactionManager>, config: &TxnestConfig) -> Self {
        let boundary = TxBoundary::from_definition(
            Arc::clone(&manager),
            config.service.definition("MemberService.join"),
        );
        let members = MemberRepository::new(
            Arc::clone(&manager),
            config.member_repository.definition("MemberRepository.save"),
        );
        let logs = LogRepository::new(
            manager,
            config.log_repository.definition("LogRepository.save"),
            config.failure_markers.clone(),
        );
        Self::new(boundary, members, logs)
    }

    /// Member repository
    pub fn members(&self) -> &MemberRepository {
        &self.members
    }

    /// Log repository
    pub fn logs(&self) -> &LogRepository {
        &self.logs
    }

    /// Shared manager
    pub fn manager(&self) -> &Arc<TransactionManager> {
        self.boundary.manager()
    }

    /// Save member and log; any failure propagates
    pub fn join_v1(&self, ctx: &mut TxContext, username: &str) -> Result<()> {
        self.boundary.run(ctx, |ctx| {
            info!(target: "txnest::service", %username, "join_v1: saving member");
            self.members.save(ctx, Member::new(username))?;

            info!(target: "txnest::service", %username, "join_v1: saving log");
            self.logs.save(ctx, Log::new(username))?;
            Ok(())
        })
    }

    /// Save member and log; a log failure is swallowed
    ///
    /// A swallowed failure still dooms the current transaction unless the
    /// log repository settled it in a `RequiresNew` transaction of its own,
    /// so the commit below fails with `UnexpectedRollback` and the failed
    /// log write is discarded.
    pub fn join_v2(&self, ctx: &mut TxContext, username: &str) -> Result<()> {
        self.boundary.run(ctx, |ctx| {
            info!(target: "txnest::service", %username, "join_v2: saving member");
            self.members.save(ctx, Member::new(username))?;

            info!(target: "txnest::service", %username, "join_v2: saving log");
            if let Err(e) = self.logs.save(ctx, Log::new(username)) {
                warn!(
                    target: "txnest::service",
                    %username,
                    error = %e,
                    "Log save failed - continuing with normal flow"
                );
                if !self.logs.runs_independently() && ctx.is_active() && !ctx.is_rollback_only() {
                    self.manager().mark_current_rollback_only(ctx)?;
                }
            }
            Ok(())
        })
    }
}
