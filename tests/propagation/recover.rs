//! Scenarios where `join_v2` swallows the log failure.

use std::sync::Arc;

use txnest::ManagerConfig;

use crate::common::*;

/// Log joins the service transaction and dooms it; the member was written
/// in its own `RequiresNew` transaction and survives.
#[test]
fn recover_fails_with_independent_member() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::requires_new(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_recoverException_fail";

    let err = svc.join_v2(&mut ctx, username).unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert!(matches!(
        err,
        Error::Transaction(TxError::UnexpectedRollback { .. })
    ));
    assert_eq!(presence(&svc, username), (true, false));
    let m = svc.manager().metrics();
    assert_eq!((m.suspended, m.committed, m.unexpected_rollbacks), (1, 1, 1));
}

/// Everything `Required`: the unexpected rollback removes the member too.
#[test]
fn recover_fails_with_shared_member() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_recoverException_shared";

    let err = svc.join_v2(&mut ctx, username).unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert_eq!(presence(&svc, username), (false, false));
    assert!(!ctx.is_active());
}

/// Log runs `RequiresNew`: its own transaction absorbs the failure and the
/// service transaction commits the member.
#[test]
fn recover_succeeds_with_independent_log() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::requires_new(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_recoverException_success";

    svc.join_v2(&mut ctx, username).unwrap();

    assert_eq!(presence(&svc, username), (true, false));
    let m = svc.manager().metrics();
    assert_eq!((m.started, m.suspended, m.committed, m.rolled_back), (2, 1, 1, 1));
    assert_eq!(m.unexpected_rollbacks, 0);
}

/// With participant failures left to the owner, the joined log rollback
/// casts no vote, so `join_v2` marks the service transaction itself and the
/// failed log write is still discarded.
#[test]
fn recover_without_global_rollback_still_dooms_owner() {
    init_tracing();
    let config = TxnestConfig {
        manager: ManagerConfig {
            global_rollback_on_participation_failure: false,
        },
        ..TxnestConfig::default()
    };
    let manager = Arc::new(TransactionManager::with_config(config.manager.clone()));
    let svc = MemberService::with_manager(Arc::clone(&manager), &config);
    let mut ctx = TxContext::new();
    let username = "logException_owner_decides";

    let err = svc.join_v2(&mut ctx, username).unwrap_err();

    assert!(err.is_unexpected_rollback());
    assert_eq!(presence(&svc, username), (false, false));
    assert_eq!(manager.metrics().unexpected_rollbacks, 1);
}

/// Log repository not transactional: its write lands in the service
/// transaction, so the swallowed failure must doom that transaction.
#[test]
fn recover_with_plain_log_discards_failed_write() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::off(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_plain_log";

    let err = svc.join_v2(&mut ctx, username).unwrap_err();

    assert!(matches!(
        err,
        Error::Transaction(TxError::UnexpectedRollback { .. })
    ));
    assert_eq!(presence(&svc, username), (false, false));
    assert!(!ctx.is_active());
}

/// Log repository `Required` with no service transaction: the log rolled
/// back its own transaction and nothing is left to mark.
#[test]
fn recover_without_outer_transaction_keeps_member() {
    let svc = service(
        ComponentPolicy::off(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();
    let username = "로그예외_no_outer";

    svc.join_v2(&mut ctx, username).unwrap();

    assert_eq!(presence(&svc, username), (true, false));
}

/// `join_v2` without any failure behaves like `join_v1`.
#[test]
fn recover_without_failure_commits() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();

    svc.join_v2(&mut ctx, "plain").unwrap();
    assert_eq!(presence(&svc, "plain"), (true, true));
}
