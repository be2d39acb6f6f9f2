//! Scenarios where every save succeeds.

use crate::common::*;

/// Service not transactional, repositories `Required`: each save runs in
/// its own physical transaction.
#[test]
fn outer_off_repositories_commit_independently() {
    let svc = service(
        ComponentPolicy::off(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();

    svc.join_v1(&mut ctx, "outerTxOff_success").unwrap();

    assert_eq!(presence(&svc, "outerTxOff_success"), (true, true));
    let m = svc.manager().metrics();
    assert_eq!((m.started, m.joined, m.committed), (2, 0, 2));
}

/// Service `Required`, repositories not transactional: one physical
/// transaction covers both writes.
#[test]
fn single_transaction_at_service() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::off(),
        ComponentPolicy::off(),
    );
    let mut ctx = TxContext::new();

    svc.join_v1(&mut ctx, "singleTx").unwrap();

    assert_eq!(presence(&svc, "singleTx"), (true, true));
    let m = svc.manager().metrics();
    assert_eq!((m.started, m.joined, m.committed), (1, 0, 1));
}

/// Everything `Required`: the repositories join the service transaction.
#[test]
fn outer_on_repositories_join() {
    let svc = service(
        ComponentPolicy::required(),
        ComponentPolicy::required(),
        ComponentPolicy::required(),
    );
    let mut ctx = TxContext::new();

    svc.join_v1(&mut ctx, "outerTxOn_success").unwrap();

    assert_eq!(presence(&svc, "outerTxOn_success"), (true, true));
    let m = svc.manager().metrics();
    assert_eq!((m.started, m.joined, m.committed, m.active), (1, 2, 1, 0));
    assert!(!ctx.is_active());
}

/// Nothing transactional: both writes auto-commit.
#[test]
fn nothing_transactional_auto_commits() {
    let svc = service(
        ComponentPolicy::off(),
        ComponentPolicy::off(),
        ComponentPolicy::off(),
    );
    let mut ctx = TxContext::new();

    svc.join_v1(&mut ctx, "autoCommit").unwrap();

    assert_eq!(presence(&svc, "autoCommit"), (true, true));
    assert_eq!(svc.manager().metrics().started, 0);
}
